//! Vulkan rendering backend
//!
//! Brings up one GPU, one swapchain and one triangle pipeline, then draws it
//! every frame. Each Vulkan handle has exactly one owning wrapper; wrappers
//! are dropped in reverse creation order, including on partial failure.

/// Instance- and device-level API seams
pub mod api;
/// `ash` implementations of the API seams
pub mod backend;
/// Command pool and prerecorded draw buffers
pub mod commands;
/// Full bring-up and teardown
pub mod context;
/// Validation message routing
pub mod debug;
/// Logical device and queues
pub mod device;
/// Physical device scoring and selection
pub mod device_selector;
/// Error taxonomy
pub mod error;
/// Per-frame acquire, submit and present
pub mod frame;
/// Swapchain framebuffers
pub mod framebuffer;
/// Instance creation and extension checks
pub mod instance;
pub mod owned;
/// Triangle pipeline and its layout
pub mod pipeline;
/// Graphics and present queue family resolution
pub mod queue_family;
/// Present render pass
pub mod render_pass;
/// Swapchain-dependent renderer state
pub mod renderer;
/// SPIR-V loading
pub mod shader;
/// Window surface
pub mod surface;
/// Surface negotiation, swapchain and image views
pub mod swapchain;
/// Semaphores
pub mod sync;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{DeviceApi, PhysicalDeviceSource, SharedDevice};
pub use context::{DeviceStack, VulkanContext};
pub use debug::DebugReporter;
pub use device::LogicalDevice;
pub use device_selector::{
    prefer_discrete, select_physical_device, select_physical_device_with, PhysicalDeviceCandidate, SelectedDevice,
};
pub use error::{VulkanError, VulkanResult};
pub use frame::{FrameScheduler, FrameState, PresentStatus};
pub use instance::VulkanInstance;
pub use queue_family::{QueueFamilyAssignment, QueueFamilyIndices};
pub use renderer::TriangleRenderer;
pub use surface::Surface;
pub use swapchain::{SurfaceConfig, SurfaceSupport, Swapchain};
