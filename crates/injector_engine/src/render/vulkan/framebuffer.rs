//! Framebuffer management

use ash::vk;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};

/// Framebuffer wrapper with RAII cleanup
pub struct Framebuffer {
    device: SharedDevice,
    framebuffer: vk::Framebuffer,
}

impl Framebuffer {
    /// Single-layer framebuffer over `attachments`
    pub fn new(
        device: &SharedDevice,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let framebuffer_create_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass)
            .attachments(attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = device
            .create_framebuffer(&framebuffer_create_info)
            .map_err(VulkanError::pipeline("framebuffer"))?;

        Ok(Self {
            device: SharedDevice::clone(device),
            framebuffer,
        })
    }

    /// Get the framebuffer handle
    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.device.destroy_framebuffer(self.framebuffer);
    }
}
