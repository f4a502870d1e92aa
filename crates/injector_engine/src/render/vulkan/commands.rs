//! Command pool and prerecorded draw buffers
//!
//! Each framebuffer gets one primary command buffer recorded once at setup:
//! begin pass with an opaque black clear, bind the pipeline, draw three
//! vertices, end. The same buffers are resubmitted every frame, which holds
//! only while nothing in the scene changes.

use ash::vk;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};
use super::pipeline::PipelineResources;

/// Clear color for every frame
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Vertices in the procedurally generated triangle
pub const TRIANGLE_VERTEX_COUNT: u32 = 3;

/// Command pool wrapper with RAII cleanup
pub struct CommandPool {
    device: SharedDevice,
    pool: vk::CommandPool,
}

impl CommandPool {
    /// Pool for buffers submitted to `queue_family_index`
    pub fn new(device: &SharedDevice, queue_family_index: u32) -> VulkanResult<Self> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder().queue_family_index(queue_family_index);

        let pool = device
            .create_command_pool(&pool_create_info)
            .map_err(VulkanError::pipeline("command pool"))?;

        Ok(Self {
            device: SharedDevice::clone(device),
            pool,
        })
    }

    /// Allocate `count` primary command buffers, freed with the pool
    pub fn allocate_command_buffers(&self, count: u32) -> VulkanResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        self.device
            .allocate_command_buffers(&alloc_info)
            .map_err(VulkanError::Api)
    }

    /// Get the pool handle
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        self.device.destroy_command_pool(self.pool);
    }
}

/// Command pool plus one prerecorded draw buffer per framebuffer
pub struct CommandRecorder {
    command_buffers: Vec<vk::CommandBuffer>,
    pool: CommandPool,
}

impl CommandRecorder {
    /// Allocate and record one buffer per framebuffer of `pipeline`
    pub fn new(device: &SharedDevice, graphics_family: u32, pipeline: &PipelineResources) -> VulkanResult<Self> {
        let pool = CommandPool::new(device, graphics_family)?;

        let count = u32::try_from(pipeline.framebuffers().len()).map_err(|_| VulkanError::InvalidOperation {
            reason: "framebuffer count exceeds u32".to_string(),
        })?;
        let command_buffers = pool.allocate_command_buffers(count)?;

        for (&command_buffer, framebuffer) in command_buffers.iter().zip(pipeline.framebuffers()) {
            record_triangle(device, command_buffer, framebuffer.handle(), pipeline)?;
        }

        log::debug!("Recorded {} draw command buffer(s)", command_buffers.len());

        Ok(Self { command_buffers, pool })
    }

    /// Prerecorded buffers, indexed like the swapchain images
    pub fn command_buffers(&self) -> &[vk::CommandBuffer] {
        &self.command_buffers
    }

    /// Owning pool
    pub fn pool(&self) -> &CommandPool {
        &self.pool
    }
}

fn record_triangle(
    device: &SharedDevice,
    command_buffer: vk::CommandBuffer,
    framebuffer: vk::Framebuffer,
    pipeline: &PipelineResources,
) -> VulkanResult<()> {
    let begin_info = vk::CommandBufferBeginInfo::builder();
    device
        .begin_command_buffer(command_buffer, &begin_info)
        .map_err(VulkanError::Api)?;

    let clear_values = [vk::ClearValue {
        color: vk::ClearColorValue { float32: CLEAR_COLOR },
    }];
    let render_pass_info = vk::RenderPassBeginInfo::builder()
        .render_pass(pipeline.render_pass())
        .framebuffer(framebuffer)
        .render_area(vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: pipeline.extent(),
        })
        .clear_values(&clear_values);

    device.cmd_begin_render_pass(command_buffer, &render_pass_info);
    device.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline());
    device.cmd_draw(command_buffer, TRIANGLE_VERTEX_COUNT, 1, 0, 0);
    device.cmd_end_render_pass(command_buffer);

    device.end_command_buffer(command_buffer).map_err(VulkanError::Api)
}
