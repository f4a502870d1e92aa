//! Vulkan bring-up and teardown
//!
//! [`DeviceStack`] runs device selection → queue resolution → logical device
//! → swapchain → pipeline → commands → frame sync against any
//! [`PhysicalDeviceSource`]. [`VulkanContext`] wraps it together with the
//! instance and window surface it needs. Every level is an owning wrapper, so
//! a failure at any stage releases the stages before it in reverse order, and
//! a finished context tears down in exact reverse of construction.

use ash::vk;

use super::api::PhysicalDeviceSource;
use super::backend::AshPhysicalDevices;
use super::device::LogicalDevice;
use super::device_selector::{self, SelectedDevice};
use super::error::{VulkanError, VulkanResult};
use super::frame::PresentStatus;
use super::instance::VulkanInstance;
use super::renderer::TriangleRenderer;
use super::surface::Surface;
use crate::core::config::EngineConfig;
use crate::render::window::Window;

/// Logical device plus everything created from it
pub struct DeviceStack {
    renderer: TriangleRenderer,
    device: LogicalDevice,
    selected: SelectedDevice,
}

impl DeviceStack {
    /// Select a GPU and build the triangle renderer on it
    pub fn new(
        source: &dyn PhysicalDeviceSource,
        surface: vk::SurfaceKHR,
        config: &EngineConfig,
        window_extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let selected = device_selector::select_physical_device(source, &config.device_extensions)?;

        let surface_config = selected
            .surface
            .negotiate(window_extent)
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("'{}' reports no usable surface format", selected.name),
            })?;

        let device = LogicalDevice::new(
            source,
            selected.handle,
            selected.queue_families,
            &config.device_extensions,
            config.validation.active_layers(),
        )?;

        let renderer = TriangleRenderer::new(&device, surface, surface_config, &config.shaders)?;

        Ok(Self {
            renderer,
            device,
            selected,
        })
    }

    /// Draw one frame
    pub fn draw_frame(&mut self) -> VulkanResult<PresentStatus> {
        self.renderer.draw_frame()
    }

    /// The device that won selection
    pub fn selected(&self) -> &SelectedDevice {
        &self.selected
    }

    /// Logical device and queues
    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }

    /// Swapchain-dependent resources
    pub fn renderer(&self) -> &TriangleRenderer {
        &self.renderer
    }
}

impl Drop for DeviceStack {
    fn drop(&mut self) {
        // Semaphores and command buffers may still be in use by the last frame
        if let Err(err) = self.device.wait_idle() {
            log::error!("Device wait before teardown failed: {err}");
        }
    }
}

/// Instance, surface and device stack for one window
pub struct VulkanContext {
    // Teardown order: device stack, surface, instance
    stack: DeviceStack,
    surface: Surface,
    instance: VulkanInstance,
}

impl VulkanContext {
    /// Create the whole Vulkan side for `window`
    pub fn new(config: &EngineConfig, window: &Window) -> VulkanResult<Self> {
        let window_extensions = window
            .required_instance_extensions()
            .map_err(|e| VulkanError::Initialization(e.to_string()))?;

        let instance = VulkanInstance::new(config, &window_extensions)?;
        let surface = Surface::new(&instance, window)?;

        let stack = {
            let source = AshPhysicalDevices::new(instance.handle(), &surface);
            DeviceStack::new(&source, surface.handle(), config, window.framebuffer_extent())?
        };

        Ok(Self {
            stack,
            surface,
            instance,
        })
    }

    /// Draw one frame
    pub fn draw_frame(&mut self) -> VulkanResult<PresentStatus> {
        self.stack.draw_frame()
    }

    /// Device-level state
    pub fn stack(&self) -> &DeviceStack {
        &self.stack
    }

    /// Instance wrapper
    pub fn instance(&self) -> &VulkanInstance {
        &self.instance
    }
}
