//! Vulkan error taxonomy
//!
//! Every setup stage reports a distinct variant so the top level can say
//! which link of the device → swapchain → pipeline chain broke.

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// Loader, instance or surface setup failed
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Enumeration produced no device, or every device scored zero
    #[error("Failed to find a suitable GPU ({candidates} candidate(s) inspected)")]
    NoSuitableDevice {
        /// Number of physical devices that were scored
        candidates: usize,
    },

    /// The graphics or present family was never resolved
    #[error("Queue families incomplete: graphics={graphics:?}, present={present:?}")]
    IncompleteQueueFamilies {
        /// Resolved graphics family, if any
        graphics: Option<u32>,
        /// Resolved present family, if any
        present: Option<u32>,
    },

    /// `vkCreateDevice` returned a non-success result
    #[error("Failed to create logical device: {0:?}")]
    DeviceCreation(vk::Result),

    /// `vkCreateSwapchainKHR` or image retrieval failed
    #[error("Failed to create swapchain: {0:?}")]
    SwapchainCreation(vk::Result),

    /// `vkCreateImageView` failed for a swapchain image
    #[error("Failed to create swapchain image view: {0:?}")]
    ImageViewCreation(vk::Result),

    /// One of the pipeline-side objects could not be created
    #[error("Failed to create {stage}: {result:?}")]
    PipelineCreation {
        /// Which object failed (render pass, layout, pipeline, ...)
        stage: &'static str,
        /// Result code returned by the driver
        result: vk::Result,
    },

    /// `vkAcquireNextImageKHR` failed
    #[error("Failed to acquire swapchain image: {0:?}")]
    Acquire(vk::Result),

    /// `vkQueueSubmit` failed
    #[error("Failed to submit draw command buffer: {0:?}")]
    Submit(vk::Result),

    /// A shader binary could not be read or is not SPIR-V
    #[error("Failed to load shader '{path}': {source}")]
    ShaderLoad {
        /// Path that was requested
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A requested validation layer is not installed
    #[error("Validation layer not supported: {0}")]
    ValidationLayerUnsupported(String),

    /// A requested instance or device extension is not available
    #[error("Extension not supported: {0}")]
    ExtensionUnsupported(String),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

impl VulkanError {
    /// Shorthand for [`VulkanError::PipelineCreation`]
    pub(crate) fn pipeline(stage: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::PipelineCreation { stage, result }
    }
}
