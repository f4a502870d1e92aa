//! # Rendering
//!
//! GLFW window plus the Vulkan backend that draws into it.

pub mod vulkan;
pub mod window;

pub use vulkan::{PresentStatus, VulkanContext, VulkanError, VulkanResult};
pub use window::{Window, WindowError};
