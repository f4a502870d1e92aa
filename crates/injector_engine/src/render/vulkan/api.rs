//! GPU API seam
//!
//! The renderer never calls `ash` directly. Instance-level queries go through
//! [`PhysicalDeviceSource`], device-level calls through [`DeviceApi`]. Both
//! traits take the same `vk::*CreateInfo` structs `ash` does, so the callers
//! read like plain `ash` code while tests can swap in a handle-tracking mock.
//!
//! Calls return the raw `VkResult` so each caller picks the error variant
//! that names its stage. Handles passed in must come from the same
//! implementation and must not have been destroyed yet.

use ash::prelude::VkResult;
use ash::vk;
use std::rc::Rc;

/// Shared, single-threaded handle to a logical device implementation
///
/// The device is destroyed when the last clone drops, so every wrapper that
/// holds one keeps its creating device alive.
pub type SharedDevice = Rc<dyn DeviceApi>;

/// Physical-device and surface queries against one presentation surface
pub trait PhysicalDeviceSource {
    /// List every physical device, in driver enumeration order
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;

    /// Device name, type and limits
    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties;

    /// Queue family table, indexed by family index
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Whether `family_index` can present to the target surface
    fn surface_support(&self, device: vk::PhysicalDevice, family_index: u32) -> VkResult<bool>;

    /// Surface capabilities (extent bounds, image counts, transform)
    fn surface_capabilities(&self, device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    /// Supported surface formats
    fn surface_formats(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>>;

    /// Supported present modes
    fn present_modes(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>>;

    /// Names of the device extensions the driver exposes
    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>>;

    /// Open a logical device on `device`
    fn create_device(
        &self,
        device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<SharedDevice>;
}

/// Device-level calls used by the swapchain, pipeline, command and frame code
pub trait DeviceApi {
    /// Fetch queue `queue_index` of `family_index`
    fn get_device_queue(&self, family_index: u32, queue_index: u32) -> vk::Queue;

    /// Block until every queue is idle
    fn device_wait_idle(&self) -> VkResult<()>;

    /// `vkCreateSwapchainKHR`
    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR>;

    /// `vkGetSwapchainImagesKHR`
    fn get_swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;

    /// `vkDestroySwapchainKHR`
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);

    /// `vkCreateImageView`
    fn create_image_view(&self, create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;

    /// `vkDestroyImageView`
    fn destroy_image_view(&self, image_view: vk::ImageView);

    /// `vkCreateShaderModule`
    fn create_shader_module(&self, create_info: &vk::ShaderModuleCreateInfo) -> VkResult<vk::ShaderModule>;

    /// `vkDestroyShaderModule`
    fn destroy_shader_module(&self, module: vk::ShaderModule);

    /// `vkCreateRenderPass`
    fn create_render_pass(&self, create_info: &vk::RenderPassCreateInfo) -> VkResult<vk::RenderPass>;

    /// `vkDestroyRenderPass`
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);

    /// `vkCreatePipelineLayout`
    fn create_pipeline_layout(&self, create_info: &vk::PipelineLayoutCreateInfo) -> VkResult<vk::PipelineLayout>;

    /// `vkDestroyPipelineLayout`
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);

    /// `vkCreateGraphicsPipelines` for a single pipeline, no cache
    fn create_graphics_pipeline(&self, create_info: &vk::GraphicsPipelineCreateInfo) -> VkResult<vk::Pipeline>;

    /// `vkDestroyPipeline`
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    /// `vkCreateFramebuffer`
    fn create_framebuffer(&self, create_info: &vk::FramebufferCreateInfo) -> VkResult<vk::Framebuffer>;

    /// `vkDestroyFramebuffer`
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);

    /// `vkCreateCommandPool`
    fn create_command_pool(&self, create_info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool>;

    /// `vkDestroyCommandPool`, which also frees the pool's buffers
    fn destroy_command_pool(&self, pool: vk::CommandPool);

    /// `vkAllocateCommandBuffers`
    fn allocate_command_buffers(&self, allocate_info: &vk::CommandBufferAllocateInfo) -> VkResult<Vec<vk::CommandBuffer>>;

    /// `vkBeginCommandBuffer`
    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer, begin_info: &vk::CommandBufferBeginInfo) -> VkResult<()>;

    /// `vkEndCommandBuffer`
    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    /// `vkCmdBeginRenderPass` with inline contents
    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin_info: &vk::RenderPassBeginInfo);

    /// `vkCmdBindPipeline`
    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline);

    /// `vkCmdDraw`
    fn cmd_draw(&self, command_buffer: vk::CommandBuffer, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    /// `vkCmdEndRenderPass`
    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer);

    /// `vkCreateSemaphore`
    fn create_semaphore(&self, create_info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore>;

    /// `vkDestroySemaphore`
    fn destroy_semaphore(&self, semaphore: vk::Semaphore);

    /// `vkAcquireNextImageKHR` without a fence; returns `(index, suboptimal)`
    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
    ) -> VkResult<(u32, bool)>;

    /// `vkQueueSubmit` without a fence
    fn queue_submit(&self, queue: vk::Queue, submits: &[vk::SubmitInfo]) -> VkResult<()>;

    /// `vkQueuePresentKHR`; `Ok(true)` means suboptimal
    fn queue_present(&self, queue: vk::Queue, present_info: &vk::PresentInfoKHR) -> VkResult<bool>;
}
