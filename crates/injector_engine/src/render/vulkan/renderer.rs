//! Swapchain-dependent half of the renderer
//!
//! Owns the swapchain, the triangle pipeline set, the prerecorded command
//! buffers and the frame scheduler, and draws one frame at a time.

use ash::vk;

use super::api::SharedDevice;
use super::commands::CommandRecorder;
use super::device::LogicalDevice;
use super::error::VulkanResult;
use super::frame::{FrameScheduler, FrameTarget, PresentStatus};
use super::pipeline::PipelineResources;
use super::swapchain::{SurfaceConfig, Swapchain};
use crate::core::config::ShaderConfig;

/// Swapchain, pipeline, commands and frame sync for the triangle
pub struct TriangleRenderer {
    // Reverse of construction order
    scheduler: FrameScheduler,
    commands: CommandRecorder,
    pipeline: PipelineResources,
    swapchain: Swapchain,
    device: SharedDevice,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
}

impl TriangleRenderer {
    /// Build everything that hangs off the swapchain
    pub fn new(
        device: &LogicalDevice,
        surface: vk::SurfaceKHR,
        surface_config: SurfaceConfig,
        shaders: &ShaderConfig,
    ) -> VulkanResult<Self> {
        let shared = device.shared();
        let queue_families = device.queue_families();

        let swapchain = Swapchain::new(shared, surface, surface_config, queue_families)?;
        let pipeline = PipelineResources::new(shared, &swapchain, shaders)?;
        let commands = CommandRecorder::new(shared, queue_families.graphics, &pipeline)?;
        let scheduler = FrameScheduler::new(shared)?;

        Ok(Self {
            scheduler,
            commands,
            pipeline,
            swapchain,
            device: SharedDevice::clone(shared),
            graphics_queue: device.graphics_queue(),
            present_queue: device.present_queue(),
        })
    }

    /// Acquire, submit and present one frame
    pub fn draw_frame(&mut self) -> VulkanResult<PresentStatus> {
        let target = FrameTarget {
            swapchain: self.swapchain.handle(),
            command_buffers: self.commands.command_buffers(),
            graphics_queue: self.graphics_queue,
            present_queue: self.present_queue,
        };
        self.scheduler.draw_frame(&self.device, &target)
    }

    /// Current swapchain
    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    /// Pipeline set
    pub fn pipeline(&self) -> &PipelineResources {
        &self.pipeline
    }

    /// Prerecorded command buffers
    pub fn commands(&self) -> &CommandRecorder {
        &self.commands
    }

    /// Frame scheduler
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}
