//! Handle-tracking stand-in for the GPU API
//!
//! Hands out unique raw handles, logs every create and destroy in call order,
//! and can be told to fail the n-th creation of a given kind.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::rc::Rc;

use super::api::{DeviceApi, PhysicalDeviceSource, SharedDevice};

/// Object kinds the mock tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Device,
    Swapchain,
    ImageView,
    ShaderModule,
    RenderPass,
    PipelineLayout,
    Pipeline,
    Framebuffer,
    CommandPool,
    Semaphore,
}

/// One entry of the lifetime log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Create(HandleKind, u64),
    Destroy(HandleKind, u64),
}

/// Commands captured from the `cmd_*` entry points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Begin(u64),
    BeginRenderPass {
        command_buffer: u64,
        render_pass: u64,
        framebuffer: u64,
        extent: vk::Extent2D,
        clear: [f32; 4],
    },
    BindPipeline(u64, u64),
    Draw {
        command_buffer: u64,
        vertex_count: u32,
        instance_count: u32,
    },
    EndRenderPass(u64),
    End(u64),
}

/// Captured `vkQueueSubmit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub queue: vk::Queue,
    pub wait_semaphores: Vec<vk::Semaphore>,
    pub wait_stages: Vec<vk::PipelineStageFlags>,
    pub command_buffers: Vec<vk::CommandBuffer>,
    pub signal_semaphores: Vec<vk::Semaphore>,
}

/// Captured `vkQueuePresentKHR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Present {
    pub queue: vk::Queue,
    pub wait_semaphores: Vec<vk::Semaphore>,
    pub swapchains: Vec<vk::SwapchainKHR>,
    pub image_indices: Vec<u32>,
}

/// Captured `vkCreateSwapchainKHR` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainRequest {
    pub min_image_count: u32,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    pub sharing_mode: vk::SharingMode,
    pub queue_family_indices: Vec<u32>,
}

unsafe fn slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    if count == 0 || ptr.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, count as usize)
    }
}

/// Shared record of everything done through [`MockDevice`]s
///
/// Outlives the devices so tests can inspect teardown after the last
/// `SharedDevice` is gone.
pub struct DeviceLog {
    next_handle: Cell<u64>,
    events: RefCell<Vec<Event>>,
    created: RefCell<HashMap<HandleKind, usize>>,
    failure: Cell<Option<(HandleKind, usize)>>,
    swapchain_image_count: Cell<u32>,
    swapchain_requests: RefCell<Vec<SwapchainRequest>>,
    commands: RefCell<Vec<Command>>,
    acquire_result: Cell<VkResult<(u32, bool)>>,
    submit_result: Cell<VkResult<()>>,
    present_result: Cell<VkResult<bool>>,
    submits: RefCell<Vec<Submit>>,
    presents: RefCell<Vec<Present>>,
    wait_idle_calls: Cell<u32>,
}

impl Default for DeviceLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLog {
    pub fn new() -> Self {
        Self {
            next_handle: Cell::new(0x1000),
            events: RefCell::new(Vec::new()),
            created: RefCell::new(HashMap::new()),
            failure: Cell::new(None),
            swapchain_image_count: Cell::new(3),
            swapchain_requests: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
            acquire_result: Cell::new(Ok((0, false))),
            submit_result: Cell::new(Ok(())),
            present_result: Cell::new(Ok(false)),
            submits: RefCell::new(Vec::new()),
            presents: RefCell::new(Vec::new()),
            wait_idle_calls: Cell::new(0),
        }
    }

    /// Fail the `nth` (0-based) creation of `kind` with `ERROR_OUT_OF_DEVICE_MEMORY`
    pub fn fail_on(&self, kind: HandleKind, nth: usize) {
        self.failure.set(Some((kind, nth)));
    }

    pub fn set_swapchain_image_count(&self, count: u32) {
        self.swapchain_image_count.set(count);
    }

    pub fn set_acquire_result(&self, result: VkResult<(u32, bool)>) {
        self.acquire_result.set(result);
    }

    pub fn set_submit_result(&self, result: VkResult<()>) {
        self.submit_result.set(result);
    }

    pub fn set_present_result(&self, result: VkResult<bool>) {
        self.present_result.set(result);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn submits(&self) -> Vec<Submit> {
        self.submits.borrow().clone()
    }

    pub fn presents(&self) -> Vec<Present> {
        self.presents.borrow().clone()
    }

    pub fn swapchain_requests(&self) -> Vec<SwapchainRequest> {
        self.swapchain_requests.borrow().clone()
    }

    pub fn wait_idle_calls(&self) -> u32 {
        self.wait_idle_calls.get()
    }

    /// Raw handles of `kind` in creation order
    pub fn created(&self, kind: HandleKind) -> Vec<u64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Create(k, raw) if *k == kind => Some(*raw),
                _ => None,
            })
            .collect()
    }

    /// Raw handles of `kind` in destruction order
    pub fn destroyed(&self, kind: HandleKind) -> Vec<u64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Destroy(k, raw) if *k == kind => Some(*raw),
                _ => None,
            })
            .collect()
    }

    /// Handles created but not yet destroyed
    pub fn live(&self) -> Vec<(HandleKind, u64)> {
        let mut live = Vec::new();
        for event in self.events.borrow().iter() {
            match *event {
                Event::Create(kind, raw) => live.push((kind, raw)),
                Event::Destroy(kind, raw) => live.retain(|entry| *entry != (kind, raw)),
            }
        }
        live
    }

    /// Check that no handle was destroyed while a handle created after it was
    /// still alive, ignoring the kinds in `exempt`
    pub fn check_reverse_teardown(&self, exempt: &[HandleKind]) -> Result<(), String> {
        let events = self.events.borrow();
        let mut alive: Vec<(HandleKind, u64)> = Vec::new();

        for event in events.iter() {
            match *event {
                Event::Create(kind, raw) => {
                    if !exempt.contains(&kind) {
                        alive.push((kind, raw));
                    }
                }
                Event::Destroy(kind, raw) => {
                    if exempt.contains(&kind) {
                        continue;
                    }
                    match alive.last() {
                        Some(&(last_kind, last_raw)) if (last_kind, last_raw) == (kind, raw) => {
                            alive.pop();
                        }
                        Some(&newest) => {
                            return Err(format!("{kind:?} {raw:#x} destroyed while newer {newest:?} is alive"));
                        }
                        None => return Err(format!("{kind:?} {raw:#x} destroyed but never created")),
                    }
                }
            }
        }

        Ok(())
    }

    fn next_raw(&self) -> u64 {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        raw
    }

    fn create<H: Handle>(&self, kind: HandleKind) -> VkResult<H> {
        let nth = {
            let mut created = self.created.borrow_mut();
            let count = created.entry(kind).or_insert(0);
            let nth = *count;
            *count += 1;
            nth
        };

        if self.failure.get() == Some((kind, nth)) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }

        let raw = self.next_raw();
        self.events.borrow_mut().push(Event::Create(kind, raw));
        Ok(H::from_raw(raw))
    }

    fn destroy<H: Handle>(&self, kind: HandleKind, handle: H) {
        self.events.borrow_mut().push(Event::Destroy(kind, handle.as_raw()));
    }

}

/// Logical-device stand-in writing into a [`DeviceLog`]
///
/// Devices opened through [`MockAdapter`] are tracked as a `Device` handle
/// whose destruction is logged when the last `SharedDevice` clone drops.
pub struct MockDevice {
    log: Rc<DeviceLog>,
    tracked: Option<u64>,
}

impl MockDevice {
    /// Untracked device plus its log, for tests below the device level
    pub fn shared() -> (Rc<DeviceLog>, SharedDevice) {
        let log = Rc::new(DeviceLog::new());
        let device: SharedDevice = Rc::new(Self {
            log: Rc::clone(&log),
            tracked: None,
        });
        (log, device)
    }

    /// Device whose own lifetime is recorded in `log`
    pub fn tracked(log: &Rc<DeviceLog>) -> VkResult<SharedDevice> {
        let raw = log.create::<vk::Device>(HandleKind::Device)?.as_raw();
        Ok(Rc::new(Self {
            log: Rc::clone(log),
            tracked: Some(raw),
        }))
    }
}

impl std::ops::Deref for MockDevice {
    type Target = DeviceLog;

    fn deref(&self) -> &DeviceLog {
        &self.log
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        if let Some(raw) = self.tracked {
            self.log.destroy(HandleKind::Device, vk::Device::from_raw(raw));
        }
    }
}

impl DeviceApi for MockDevice {
    fn get_device_queue(&self, family_index: u32, queue_index: u32) -> vk::Queue {
        vk::Queue::from_raw(0xC000 + u64::from(family_index) * 0x10 + u64::from(queue_index))
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.wait_idle_calls.set(self.wait_idle_calls.get() + 1);
        Ok(())
    }

    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        let queue_family_indices =
            unsafe { slice(create_info.p_queue_family_indices, create_info.queue_family_index_count) }.to_vec();
        self.swapchain_requests.borrow_mut().push(SwapchainRequest {
            min_image_count: create_info.min_image_count,
            format: create_info.image_format,
            color_space: create_info.image_color_space,
            extent: create_info.image_extent,
            present_mode: create_info.present_mode,
            sharing_mode: create_info.image_sharing_mode,
            queue_family_indices,
        });
        self.create(HandleKind::Swapchain)
    }

    fn get_swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        Ok((0..self.swapchain_image_count.get())
            .map(|_| vk::Image::from_raw(self.next_raw()))
            .collect())
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.destroy(HandleKind::Swapchain, swapchain);
    }

    fn create_image_view(&self, _create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        self.create(HandleKind::ImageView)
    }

    fn destroy_image_view(&self, image_view: vk::ImageView) {
        self.destroy(HandleKind::ImageView, image_view);
    }

    fn create_shader_module(&self, _create_info: &vk::ShaderModuleCreateInfo) -> VkResult<vk::ShaderModule> {
        self.create(HandleKind::ShaderModule)
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.destroy(HandleKind::ShaderModule, module);
    }

    fn create_render_pass(&self, _create_info: &vk::RenderPassCreateInfo) -> VkResult<vk::RenderPass> {
        self.create(HandleKind::RenderPass)
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.destroy(HandleKind::RenderPass, render_pass);
    }

    fn create_pipeline_layout(&self, _create_info: &vk::PipelineLayoutCreateInfo) -> VkResult<vk::PipelineLayout> {
        self.create(HandleKind::PipelineLayout)
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.destroy(HandleKind::PipelineLayout, layout);
    }

    fn create_graphics_pipeline(&self, _create_info: &vk::GraphicsPipelineCreateInfo) -> VkResult<vk::Pipeline> {
        self.create(HandleKind::Pipeline)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.destroy(HandleKind::Pipeline, pipeline);
    }

    fn create_framebuffer(&self, _create_info: &vk::FramebufferCreateInfo) -> VkResult<vk::Framebuffer> {
        self.create(HandleKind::Framebuffer)
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.destroy(HandleKind::Framebuffer, framebuffer);
    }

    fn create_command_pool(&self, _create_info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool> {
        self.create(HandleKind::CommandPool)
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        self.destroy(HandleKind::CommandPool, pool);
    }

    fn allocate_command_buffers(&self, allocate_info: &vk::CommandBufferAllocateInfo) -> VkResult<Vec<vk::CommandBuffer>> {
        Ok((0..allocate_info.command_buffer_count)
            .map(|_| vk::CommandBuffer::from_raw(self.next_raw()))
            .collect())
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer, _begin_info: &vk::CommandBufferBeginInfo) -> VkResult<()> {
        self.commands.borrow_mut().push(Command::Begin(command_buffer.as_raw()));
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        self.commands.borrow_mut().push(Command::End(command_buffer.as_raw()));
        Ok(())
    }

    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin_info: &vk::RenderPassBeginInfo) {
        let clear_values = unsafe { slice(begin_info.p_clear_values, begin_info.clear_value_count) };
        let clear = clear_values
            .first()
            .map_or([f32::NAN; 4], |value| unsafe { value.color.float32 });
        self.commands.borrow_mut().push(Command::BeginRenderPass {
            command_buffer: command_buffer.as_raw(),
            render_pass: begin_info.render_pass.as_raw(),
            framebuffer: begin_info.framebuffer.as_raw(),
            extent: begin_info.render_area.extent,
            clear,
        });
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, _bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline) {
        self.commands
            .borrow_mut()
            .push(Command::BindPipeline(command_buffer.as_raw(), pipeline.as_raw()));
    }

    fn cmd_draw(&self, command_buffer: vk::CommandBuffer, vertex_count: u32, instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        self.commands.borrow_mut().push(Command::Draw {
            command_buffer: command_buffer.as_raw(),
            vertex_count,
            instance_count,
        });
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        self.commands.borrow_mut().push(Command::EndRenderPass(command_buffer.as_raw()));
    }

    fn create_semaphore(&self, _create_info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore> {
        self.create(HandleKind::Semaphore)
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.destroy(HandleKind::Semaphore, semaphore);
    }

    fn acquire_next_image(&self, _swapchain: vk::SwapchainKHR, _timeout: u64, _semaphore: vk::Semaphore) -> VkResult<(u32, bool)> {
        self.acquire_result.get()
    }

    fn queue_submit(&self, queue: vk::Queue, submits: &[vk::SubmitInfo]) -> VkResult<()> {
        for info in submits {
            let record = unsafe {
                Submit {
                    queue,
                    wait_semaphores: slice(info.p_wait_semaphores, info.wait_semaphore_count).to_vec(),
                    wait_stages: slice(info.p_wait_dst_stage_mask, info.wait_semaphore_count).to_vec(),
                    command_buffers: slice(info.p_command_buffers, info.command_buffer_count).to_vec(),
                    signal_semaphores: slice(info.p_signal_semaphores, info.signal_semaphore_count).to_vec(),
                }
            };
            self.submits.borrow_mut().push(record);
        }
        self.submit_result.get()
    }

    fn queue_present(&self, queue: vk::Queue, present_info: &vk::PresentInfoKHR) -> VkResult<bool> {
        let record = unsafe {
            Present {
                queue,
                wait_semaphores: slice(present_info.p_wait_semaphores, present_info.wait_semaphore_count).to_vec(),
                swapchains: slice(present_info.p_swapchains, present_info.swapchain_count).to_vec(),
                image_indices: slice(present_info.p_image_indices, present_info.swapchain_count).to_vec(),
            }
        };
        self.presents.borrow_mut().push(record);
        self.present_result.get()
    }
}

/// Fabricated physical device
#[derive(Clone)]
pub struct MockGpu {
    pub handle: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub families: Vec<vk::QueueFamilyProperties>,
    pub present_families: Vec<u32>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub extensions: Vec<String>,
}

impl MockGpu {
    /// One combined graphics+present family, one BGRA format, FIFO only,
    /// undefined current extent with wide bounds, 2..=3 images
    pub fn new(id: u64, device_type: vk::PhysicalDeviceType, name: &str) -> Self {
        let mut properties = vk::PhysicalDeviceProperties {
            device_type,
            ..Default::default()
        };
        for (slot, byte) in properties.device_name.iter_mut().zip(name.bytes()) {
            *slot = byte as c_char;
        }

        Self {
            handle: vk::PhysicalDevice::from_raw(id),
            properties,
            families: vec![vk::QueueFamilyProperties {
                queue_flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                queue_count: 1,
                ..Default::default()
            }],
            present_families: vec![0],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: vk::Extent2D {
                    width: u32::MAX,
                    height: u32::MAX,
                },
                min_image_extent: vk::Extent2D { width: 1, height: 1 },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                max_image_array_layers: 1,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            extensions: vec!["VK_KHR_swapchain".to_string()],
        }
    }

    pub fn discrete(id: u64) -> Self {
        Self::new(id, vk::PhysicalDeviceType::DISCRETE_GPU, "Mock Discrete")
    }

    pub fn integrated(id: u64) -> Self {
        Self::new(id, vk::PhysicalDeviceType::INTEGRATED_GPU, "Mock Integrated")
    }
}

/// What `create_device` was asked for
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: Vec<u32>,
    pub queue_counts: Vec<u32>,
    pub priorities: Vec<f32>,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

/// Instance-level stand-in serving a fixed set of [`MockGpu`]s
pub struct MockAdapter {
    pub gpus: Vec<MockGpu>,
    pub device: Rc<DeviceLog>,
    pub device_result: VkResult<()>,
    requests: RefCell<Vec<DeviceRequest>>,
}

impl MockAdapter {
    pub fn new(gpus: Vec<MockGpu>) -> Self {
        Self {
            gpus,
            device: Rc::new(DeviceLog::new()),
            device_result: Ok(()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DeviceRequest> {
        self.requests.borrow().clone()
    }

    fn gpu(&self, device: vk::PhysicalDevice) -> VkResult<&MockGpu> {
        self.gpus
            .iter()
            .find(|gpu| gpu.handle == device)
            .ok_or(vk::Result::ERROR_DEVICE_LOST)
    }
}

unsafe fn names(ptrs: &[*const c_char]) -> Vec<String> {
    ptrs.iter()
        .map(|&ptr| CStr::from_ptr(ptr).to_string_lossy().into_owned())
        .collect()
}

impl PhysicalDeviceSource for MockAdapter {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok(self.gpus.iter().map(|gpu| gpu.handle).collect())
    }

    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        self.gpu(device).map(|gpu| gpu.properties).unwrap_or_default()
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        self.gpu(device).map(|gpu| gpu.families.clone()).unwrap_or_default()
    }

    fn surface_support(&self, device: vk::PhysicalDevice, family_index: u32) -> VkResult<bool> {
        Ok(self.gpu(device)?.present_families.contains(&family_index))
    }

    fn surface_capabilities(&self, device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.gpu(device)?.capabilities)
    }

    fn surface_formats(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.gpu(device)?.formats.clone())
    }

    fn present_modes(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.gpu(device)?.present_modes.clone())
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        Ok(self.gpu(device)?.extensions.clone())
    }

    fn create_device(&self, device: vk::PhysicalDevice, create_info: &vk::DeviceCreateInfo) -> VkResult<SharedDevice> {
        self.device_result?;

        let request = unsafe {
            let queue_infos = slice(create_info.p_queue_create_infos, create_info.queue_create_info_count);
            DeviceRequest {
                physical_device: device,
                queue_families: queue_infos.iter().map(|info| info.queue_family_index).collect(),
                queue_counts: queue_infos.iter().map(|info| info.queue_count).collect(),
                priorities: queue_infos
                    .iter()
                    .flat_map(|info| slice(info.p_queue_priorities, info.queue_count).to_vec())
                    .collect(),
                extensions: names(slice(create_info.pp_enabled_extension_names, create_info.enabled_extension_count)),
                layers: names(slice(create_info.pp_enabled_layer_names, create_info.enabled_layer_count)),
            }
        };
        self.requests.borrow_mut().push(request);

        MockDevice::tracked(&self.device)
    }
}
