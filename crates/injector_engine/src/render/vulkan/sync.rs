//! Vulkan synchronization primitives
//!
//! Binary semaphores only. Both frame semaphores are shared by every frame
//! and there is no fence, so the CPU is never throttled against the GPU.

use ash::vk;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};

/// GPU-GPU synchronization primitive with automatic resource management
pub struct Semaphore {
    device: SharedDevice,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Create a new binary semaphore
    pub fn new(device: &SharedDevice) -> VulkanResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = device
            .create_semaphore(&create_info)
            .map_err(VulkanError::Api)?;

        Ok(Self {
            device: SharedDevice::clone(device),
            semaphore,
        })
    }

    /// Get the semaphore handle
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        self.device.destroy_semaphore(self.semaphore);
    }
}

/// Semaphore pair ordering acquire → render → present
pub struct FrameSync {
    // Declared newest first so they drop in reverse creation order
    render_finished: Semaphore,
    image_available: Semaphore,
}

impl FrameSync {
    /// Create frame synchronization objects
    pub fn new(device: &SharedDevice) -> VulkanResult<Self> {
        let image_available = Semaphore::new(device)?;
        let render_finished = Semaphore::new(device)?;

        Ok(Self {
            render_finished,
            image_available,
        })
    }

    /// Signalled when the acquired image may be rendered to
    pub fn image_available(&self) -> vk::Semaphore {
        self.image_available.handle()
    }

    /// Signalled when rendering finished and the image may be presented
    pub fn render_finished(&self) -> vk::Semaphore {
        self.render_finished.handle()
    }
}
