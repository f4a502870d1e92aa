//! Logical device creation and queue retrieval

use ash::vk;
use std::os::raw::c_char;

use super::api::{PhysicalDeviceSource, SharedDevice};
use super::error::{VulkanError, VulkanResult};
use super::instance::to_cstrings;
use super::queue_family::QueueFamilyIndices;

const QUEUE_PRIORITY: [f32; 1] = [1.0];

/// One queue create-info per distinct family, one queue each at priority 1.0
pub fn queue_create_infos(indices: QueueFamilyIndices) -> Vec<vk::DeviceQueueCreateInfo> {
    indices
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(family)
                .queue_priorities(&QUEUE_PRIORITY)
                .build()
        })
        .collect()
}

/// Opened device plus its graphics and present queues
///
/// The `VkDevice` itself is destroyed once this and every wrapper created
/// from [`LogicalDevice::shared`] have been dropped.
pub struct LogicalDevice {
    device: SharedDevice,
    physical_device: vk::PhysicalDevice,
    queue_families: QueueFamilyIndices,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
}

impl LogicalDevice {
    /// Open `physical_device` with the given extensions and layers
    ///
    /// Layers are passed for older loaders that still honour device layers.
    pub fn new(
        source: &dyn PhysicalDeviceSource,
        physical_device: vk::PhysicalDevice,
        queue_families: QueueFamilyIndices,
        extensions: &[String],
        layers: &[String],
    ) -> VulkanResult<Self> {
        let queue_infos = queue_create_infos(queue_families);

        let extension_names = to_cstrings(extensions)?;
        let extension_ptrs: Vec<*const c_char> = extension_names.iter().map(|name| name.as_ptr()).collect();
        let layer_names = to_cstrings(layers)?;
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let features = vk::PhysicalDeviceFeatures::default();
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs)
            .enabled_features(&features);

        let device = source
            .create_device(physical_device, &create_info)
            .map_err(VulkanError::DeviceCreation)?;

        let graphics_queue = device.get_device_queue(queue_families.graphics, 0);
        let present_queue = device.get_device_queue(queue_families.present, 0);

        log::debug!(
            "Created logical device with {} queue family(ies), {} extension(s)",
            queue_infos.len(),
            extensions.len()
        );

        Ok(Self {
            device,
            physical_device,
            queue_families,
            graphics_queue,
            present_queue,
        })
    }

    /// Shared device handle for resource wrappers
    pub fn shared(&self) -> &SharedDevice {
        &self.device
    }

    /// Physical device this device was opened on
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Graphics and present families
    pub fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }

    /// Queue 0 of the graphics family
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Queue 0 of the present family
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Block until the device has no pending work
    pub fn wait_idle(&self) -> VulkanResult<()> {
        self.device.device_wait_idle().map_err(VulkanError::Api)
    }
}
