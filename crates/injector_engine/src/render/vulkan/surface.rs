//! Presentation surface owned alongside its loader

use ash::extensions::khr::Surface as SurfaceLoader;
use ash::vk;

use super::error::{VulkanError, VulkanResult};
use super::instance::VulkanInstance;
use crate::render::window::Window;

/// Window surface; destroyed after the device and before the instance
pub struct Surface {
    loader: SurfaceLoader,
    handle: vk::SurfaceKHR,
}

impl Surface {
    /// Let GLFW create a surface for `window`
    pub fn new(instance: &VulkanInstance, window: &Window) -> VulkanResult<Self> {
        let loader = SurfaceLoader::new(instance.entry(), instance.handle());
        let handle = window
            .create_vulkan_surface(instance.handle().handle())
            .map_err(|result| VulkanError::Initialization(format!("Failed to create window surface: {result:?}")))?;

        Ok(Self { loader, handle })
    }

    /// Surface extension function table
    pub fn loader(&self) -> &SurfaceLoader {
        &self.loader
    }

    /// Raw surface handle
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}
