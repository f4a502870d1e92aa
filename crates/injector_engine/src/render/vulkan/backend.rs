//! `ash` implementations of the GPU API seam

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::prelude::VkResult;
use ash::{vk, Device, Instance};
use std::ffi::CStr;
use std::rc::Rc;

use super::api::{DeviceApi, PhysicalDeviceSource, SharedDevice};
use super::surface::Surface;

/// Physical-device queries against one window surface
pub struct AshPhysicalDevices<'a> {
    instance: &'a Instance,
    surface: &'a Surface,
}

impl<'a> AshPhysicalDevices<'a> {
    /// Bind queries to `instance` and the presentation `surface`
    pub fn new(instance: &'a Instance, surface: &'a Surface) -> Self {
        Self { instance, surface }
    }
}

impl PhysicalDeviceSource for AshPhysicalDevices<'_> {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
    }

    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(device) }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.instance.get_physical_device_queue_family_properties(device) }
    }

    fn surface_support(&self, device: vk::PhysicalDevice, family_index: u32) -> VkResult<bool> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_support(device, family_index, self.surface.handle())
        }
    }

    fn surface_capabilities(&self, device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_capabilities(device, self.surface.handle())
        }
    }

    fn surface_formats(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_formats(device, self.surface.handle())
        }
    }

    fn present_modes(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_present_modes(device, self.surface.handle())
        }
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        let properties = unsafe { self.instance.enumerate_device_extension_properties(device)? };

        Ok(properties
            .iter()
            .map(|extension| {
                let name = unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) };
                name.to_string_lossy().into_owned()
            })
            .collect())
    }

    fn create_device(
        &self,
        device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<SharedDevice> {
        let logical = unsafe { self.instance.create_device(device, create_info, None)? };
        Ok(Rc::new(AshDevice::new(self.instance, logical)))
    }
}

/// Logical device plus the swapchain extension loader
pub struct AshDevice {
    device: Device,
    swapchain_loader: SwapchainLoader,
}

impl AshDevice {
    /// Wrap an opened `ash::Device`
    pub fn new(instance: &Instance, device: Device) -> Self {
        let swapchain_loader = SwapchainLoader::new(instance, &device);
        Self {
            device,
            swapchain_loader,
        }
    }
}

impl Drop for AshDevice {
    fn drop(&mut self) {
        unsafe { self.device.destroy_device(None) }
    }
}

impl DeviceApi for AshDevice {
    fn get_device_queue(&self, family_index: u32, queue_index: u32) -> vk::Queue {
        unsafe { self.device.get_device_queue(family_index, queue_index) }
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.device_wait_idle() }
    }

    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        unsafe { self.swapchain_loader.create_swapchain(create_info, None) }
    }

    fn get_swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }

    fn create_image_view(&self, create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        unsafe { self.device.create_image_view(create_info, None) }
    }

    fn destroy_image_view(&self, image_view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(image_view, None) }
    }

    fn create_shader_module(&self, create_info: &vk::ShaderModuleCreateInfo) -> VkResult<vk::ShaderModule> {
        unsafe { self.device.create_shader_module(create_info, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_render_pass(&self, create_info: &vk::RenderPassCreateInfo) -> VkResult<vk::RenderPass> {
        unsafe { self.device.create_render_pass(create_info, None) }
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn create_pipeline_layout(&self, create_info: &vk::PipelineLayoutCreateInfo) -> VkResult<vk::PipelineLayout> {
        unsafe { self.device.create_pipeline_layout(create_info, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn create_graphics_pipeline(&self, create_info: &vk::GraphicsPipelineCreateInfo) -> VkResult<vk::Pipeline> {
        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(
                    vk::PipelineCache::null(),
                    std::slice::from_ref(create_info),
                    None,
                )
                .map_err(|(_, err)| err)?
        };

        pipelines.first().copied().ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }

    fn create_framebuffer(&self, create_info: &vk::FramebufferCreateInfo) -> VkResult<vk::Framebuffer> {
        unsafe { self.device.create_framebuffer(create_info, None) }
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    fn create_command_pool(&self, create_info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool> {
        unsafe { self.device.create_command_pool(create_info, None) }
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe { self.device.destroy_command_pool(pool, None) }
    }

    fn allocate_command_buffers(&self, allocate_info: &vk::CommandBufferAllocateInfo) -> VkResult<Vec<vk::CommandBuffer>> {
        unsafe { self.device.allocate_command_buffers(allocate_info) }
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer, begin_info: &vk::CommandBufferBeginInfo) -> VkResult<()> {
        unsafe { self.device.begin_command_buffer(command_buffer, begin_info) }
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device.end_command_buffer(command_buffer) }
    }

    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin_info: &vk::RenderPassBeginInfo) {
        unsafe {
            self.device
                .cmd_begin_render_pass(command_buffer, begin_info, vk::SubpassContents::INLINE);
        }
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline) {
        unsafe { self.device.cmd_bind_pipeline(command_buffer, bind_point, pipeline) }
    }

    fn cmd_draw(&self, command_buffer: vk::CommandBuffer, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        unsafe {
            self.device
                .cmd_draw(command_buffer, vertex_count, instance_count, first_vertex, first_instance);
        }
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        unsafe { self.device.cmd_end_render_pass(command_buffer) }
    }

    fn create_semaphore(&self, create_info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore> {
        unsafe { self.device.create_semaphore(create_info, None) }
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.device.destroy_semaphore(semaphore, None) }
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        unsafe {
            self.swapchain_loader
                .acquire_next_image(swapchain, timeout, semaphore, vk::Fence::null())
        }
    }

    fn queue_submit(&self, queue: vk::Queue, submits: &[vk::SubmitInfo]) -> VkResult<()> {
        unsafe { self.device.queue_submit(queue, submits, vk::Fence::null()) }
    }

    fn queue_present(&self, queue: vk::Queue, present_info: &vk::PresentInfoKHR) -> VkResult<bool> {
        unsafe { self.swapchain_loader.queue_present(queue, present_info) }
    }
}
