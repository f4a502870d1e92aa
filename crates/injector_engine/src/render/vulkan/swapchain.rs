//! Vulkan swapchain management
//!
//! Surface negotiation (format, present mode, extent, image count, sharing)
//! is kept in free functions so it can be checked without a GPU. The
//! [`Swapchain`] owns its handle and one image view per image; the images
//! themselves belong to the swapchain and are never destroyed here.

use ash::prelude::VkResult;
use ash::vk;

use super::api::{PhysicalDeviceSource, SharedDevice};
use super::error::{VulkanError, VulkanResult};
use super::owned::OwnedList;
use super::queue_family::QueueFamilyIndices;

/// Format picked whenever the surface offers it
pub const PREFERRED_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// Exact match on [`PREFERRED_SURFACE_FORMAT`], else the first advertised format
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|candidate| {
            candidate.format == PREFERRED_SURFACE_FORMAT.format
                && candidate.color_space == PREFERRED_SURFACE_FORMAT.color_space
        })
        .or_else(|| formats.first().copied())
}

/// Mailbox when available, else FIFO (always supported)
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    present_modes
        .iter()
        .copied()
        .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Surface-reported extent, or `requested` clamped into the surface bounds
/// when the surface leaves the extent to us (`u32::MAX` sentinel)
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, requested: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: requested.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: requested.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped by the maximum when the surface sets one
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let desired = capabilities.min_image_count.saturating_add(1);
    if capabilities.max_image_count > 0 {
        desired.min(capabilities.max_image_count)
    } else {
        desired
    }
}

/// Concurrent sharing across both families when they differ, exclusive otherwise
pub fn choose_sharing_mode(indices: QueueFamilyIndices) -> (vk::SharingMode, Vec<u32>) {
    if indices.is_split() {
        (vk::SharingMode::CONCURRENT, indices.unique())
    } else {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    }
}

/// What a physical device offers for the target surface
#[derive(Debug, Clone)]
pub struct SurfaceSupport {
    /// Extent bounds, image counts and transform
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Advertised formats
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Advertised present modes
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupport {
    /// Query `device` through `source`
    pub fn query(source: &dyn PhysicalDeviceSource, device: vk::PhysicalDevice) -> VkResult<Self> {
        Ok(Self {
            capabilities: source.surface_capabilities(device)?,
            formats: source.surface_formats(device)?,
            present_modes: source.present_modes(device)?,
        })
    }

    /// At least one format and one present mode
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    /// Negotiate the swapchain parameters for a window of `window_extent`
    pub fn negotiate(&self, window_extent: vk::Extent2D) -> Option<SurfaceConfig> {
        let surface_format = choose_surface_format(&self.formats)?;
        if self.present_modes.is_empty() {
            return None;
        }

        Some(SurfaceConfig {
            surface_format,
            present_mode: choose_present_mode(&self.present_modes),
            extent: choose_extent(&self.capabilities, window_extent),
            image_count: choose_image_count(&self.capabilities),
            pre_transform: self.capabilities.current_transform,
        })
    }
}

/// Swapchain parameters, fixed for the life of one swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Image format and color space
    pub surface_format: vk::SurfaceFormatKHR,
    /// Presentation mode
    pub present_mode: vk::PresentModeKHR,
    /// Image extent
    pub extent: vk::Extent2D,
    /// Minimum image count requested
    pub image_count: u32,
    /// Transform applied on present
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

impl SurfaceConfig {
    /// Image format
    pub fn format(&self) -> vk::Format {
        self.surface_format.format
    }
}

struct SwapchainHandle {
    device: SharedDevice,
    handle: vk::SwapchainKHR,
}

impl Drop for SwapchainHandle {
    fn drop(&mut self) {
        self.device.destroy_swapchain(self.handle);
    }
}

/// Swapchain image view with RAII cleanup
pub struct ImageView {
    device: SharedDevice,
    view: vk::ImageView,
}

impl ImageView {
    /// 2D color view over a swapchain image
    pub fn new(device: &SharedDevice, image: vk::Image, format: vk::Format) -> VulkanResult<Self> {
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = device
            .create_image_view(&create_info)
            .map_err(VulkanError::ImageViewCreation)?;

        Ok(Self {
            device: SharedDevice::clone(device),
            view,
        })
    }

    /// Get the image view handle
    pub fn handle(&self) -> vk::ImageView {
        self.view
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        self.device.destroy_image_view(self.view);
    }
}

/// Swapchain management wrapper with RAII cleanup
pub struct Swapchain {
    // Views go before the swapchain they were made from
    image_views: OwnedList<ImageView>,
    swapchain: SwapchainHandle,
    images: Vec<vk::Image>,
    config: SurfaceConfig,
}

impl Swapchain {
    /// Create the swapchain and one view per image
    pub fn new(
        device: &SharedDevice,
        surface: vk::SurfaceKHR,
        config: SurfaceConfig,
        indices: QueueFamilyIndices,
    ) -> VulkanResult<Self> {
        let (sharing_mode, family_indices) = choose_sharing_mode(indices);

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(config.image_count)
            .image_format(config.surface_format.format)
            .image_color_space(config.surface_format.color_space)
            .image_extent(config.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&family_indices)
            .pre_transform(config.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(config.present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let handle = device
            .create_swapchain(&create_info)
            .map_err(VulkanError::SwapchainCreation)?;
        let swapchain = SwapchainHandle {
            device: SharedDevice::clone(device),
            handle,
        };

        let images = device
            .get_swapchain_images(handle)
            .map_err(VulkanError::SwapchainCreation)?;

        let mut image_views = OwnedList::with_capacity(images.len());
        for &image in &images {
            image_views.push(ImageView::new(device, image, config.format())?);
        }

        log::info!(
            "Created swapchain: {}x{} {:?}/{:?} {:?}, {} image(s), {:?} sharing",
            config.extent.width,
            config.extent.height,
            config.surface_format.format,
            config.surface_format.color_space,
            config.present_mode,
            images.len(),
            sharing_mode
        );

        Ok(Self {
            image_views,
            swapchain,
            images,
            config,
        })
    }

    /// Get the swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain.handle
    }

    /// Negotiated parameters
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Image extent
    pub fn extent(&self) -> vk::Extent2D {
        self.config.extent
    }

    /// Image format
    pub fn format(&self) -> vk::Format {
        self.config.format()
    }

    /// Swapchain images, owned by the swapchain
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// One view per image, same order
    pub fn image_views(&self) -> &[ImageView] {
        &self.image_views
    }

    /// Number of images actually created
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vulkan::mock::{HandleKind, MockDevice};

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    fn capabilities(min: u32, max: u32, current: vk::Extent2D) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
            current_extent: current,
            min_image_extent: vk::Extent2D { width: 100, height: 100 },
            max_image_extent: vk::Extent2D { width: 1920, height: 1080 },
            ..Default::default()
        }
    }

    const UNDEFINED: vk::Extent2D = vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
    };

    #[test]
    fn preferred_format_is_an_exact_match() {
        let srgb = format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        let wrong_space = format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);

        assert_eq!(
            choose_surface_format(&[srgb, wrong_space, PREFERRED_SURFACE_FORMAT]),
            Some(PREFERRED_SURFACE_FORMAT)
        );
        assert_eq!(choose_surface_format(&[wrong_space, srgb]), Some(wrong_space));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn mailbox_preferred_fifo_fallback() {
        use vk::PresentModeKHR as Mode;
        assert_eq!(choose_present_mode(&[Mode::FIFO, Mode::MAILBOX]), Mode::MAILBOX);
        assert_eq!(choose_present_mode(&[Mode::IMMEDIATE]), Mode::FIFO);
        assert_eq!(choose_present_mode(&[]), Mode::FIFO);
    }

    #[test]
    fn undefined_extent_is_clamped_per_component() {
        let caps = capabilities(2, 3, UNDEFINED);
        let extent = choose_extent(&caps, vk::Extent2D { width: 4000, height: 10 });
        assert_eq!(extent, vk::Extent2D { width: 1920, height: 100 });

        let inside = choose_extent(&caps, vk::Extent2D { width: 800, height: 600 });
        assert_eq!(inside, vk::Extent2D { width: 800, height: 600 });
    }

    #[test]
    fn defined_extent_passes_through() {
        let current = vk::Extent2D { width: 640, height: 480 };
        let caps = capabilities(2, 3, current);
        assert_eq!(choose_extent(&caps, vk::Extent2D { width: 4000, height: 4000 }), current);
        assert_eq!(choose_extent(&caps, vk::Extent2D { width: 1, height: 1 }), current);
    }

    #[test]
    fn image_count_stays_within_bounds() {
        assert_eq!(choose_image_count(&capabilities(2, 3, UNDEFINED)), 3);
        assert_eq!(choose_image_count(&capabilities(2, 2, UNDEFINED)), 2);
        assert_eq!(choose_image_count(&capabilities(2, 0, UNDEFINED)), 3);

        for (min, max) in [(1, 1), (1, 8), (3, 0), (4, 4)] {
            let count = choose_image_count(&capabilities(min, max, UNDEFINED));
            assert!(count >= min);
            assert!(max == 0 || count <= max);
        }
    }

    #[test]
    fn sharing_mode_follows_family_split() {
        let (mode, families) = choose_sharing_mode(QueueFamilyIndices { graphics: 0, present: 0 });
        assert_eq!(mode, vk::SharingMode::EXCLUSIVE);
        assert!(families.is_empty());

        let (mode, families) = choose_sharing_mode(QueueFamilyIndices { graphics: 0, present: 2 });
        assert_eq!(mode, vk::SharingMode::CONCURRENT);
        assert_eq!(families, vec![0, 2]);
    }

    #[test]
    fn negotiation_requires_formats_and_modes() {
        let support = SurfaceSupport {
            capabilities: capabilities(2, 3, UNDEFINED),
            formats: vec![PREFERRED_SURFACE_FORMAT],
            present_modes: Vec::new(),
        };
        assert!(!support.is_adequate());
        assert!(support.negotiate(vk::Extent2D { width: 800, height: 600 }).is_none());
    }

    fn config() -> SurfaceConfig {
        SurfaceConfig {
            surface_format: PREFERRED_SURFACE_FORMAT,
            present_mode: vk::PresentModeKHR::FIFO,
            extent: vk::Extent2D { width: 800, height: 600 },
            image_count: 3,
            pre_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        }
    }

    #[test]
    fn one_view_per_image() {
        let (mock, device) = MockDevice::shared();
        mock.set_swapchain_image_count(4);

        let swapchain = Swapchain::new(
            &device,
            vk::SurfaceKHR::null(),
            config(),
            QueueFamilyIndices { graphics: 0, present: 1 },
        )
        .unwrap();

        assert_eq!(swapchain.image_count(), 4);
        assert_eq!(swapchain.image_views().len(), swapchain.images().len());

        let request = &mock.swapchain_requests()[0];
        assert_eq!(request.sharing_mode, vk::SharingMode::CONCURRENT);
        assert_eq!(request.queue_family_indices, vec![0, 1]);
        assert_eq!(request.min_image_count, 3);

        drop(swapchain);
        assert!(mock.live().is_empty());
        mock.check_reverse_teardown(&[]).unwrap();
    }

    #[test]
    fn failed_view_releases_earlier_views_and_swapchain() {
        let (mock, device) = MockDevice::shared();
        mock.fail_on(HandleKind::ImageView, 2);

        let result = Swapchain::new(
            &device,
            vk::SurfaceKHR::null(),
            config(),
            QueueFamilyIndices { graphics: 0, present: 0 },
        );

        assert!(matches!(result, Err(VulkanError::ImageViewCreation(_))));
        assert!(mock.live().is_empty());
        mock.check_reverse_teardown(&[]).unwrap();
    }

    #[test]
    fn swapchain_failure_is_reported_as_such() {
        let (mock, device) = MockDevice::shared();
        mock.fail_on(HandleKind::Swapchain, 0);

        let result = Swapchain::new(
            &device,
            vk::SurfaceKHR::null(),
            config(),
            QueueFamilyIndices { graphics: 0, present: 0 },
        );
        assert!(matches!(result, Err(VulkanError::SwapchainCreation(_))));
        assert!(mock.events().is_empty());
    }
}
