//! Physical device discovery and scoring
//!
//! Every enumerated device is inspected into a [`PhysicalDeviceCandidate`].
//! A candidate scores 0 when it lacks a required extension, a graphics or
//! present family, or any surface format or present mode. Devices that pass
//! are ranked by a scoring function; [`prefer_discrete`] gives discrete GPUs 2
//! and everything else 1. The highest score wins and the first enumerated
//! device wins a tie.

use ash::vk;

use super::api::PhysicalDeviceSource;
use super::error::{VulkanError, VulkanResult};
use super::instance::first_unsupported;
use super::queue_family::{QueueFamilyAssignment, QueueFamilyIndices};
use super::swapchain::SurfaceSupport;

/// Score of a device that cannot drive the surface
pub const UNUSABLE: u32 = 0;

/// Transient view of one physical device during selection
#[derive(Debug, Clone)]
pub struct PhysicalDeviceCandidate {
    /// Physical device handle
    pub handle: vk::PhysicalDevice,
    /// Driver-reported device name
    pub name: String,
    /// Discrete, integrated, virtual, ...
    pub device_type: vk::PhysicalDeviceType,
    /// Queue family table
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    /// Resolved queue roles
    pub assignment: QueueFamilyAssignment,
    /// Surface capabilities, formats and present modes, when the query succeeded
    pub surface: Option<SurfaceSupport>,
    /// Every required extension is exposed
    pub extensions_supported: bool,
    /// Suitability, higher is better, [`UNUSABLE`] disqualifies
    pub score: u32,
}

impl PhysicalDeviceCandidate {
    /// [`inspect_with`](Self::inspect_with) using [`prefer_discrete`]
    pub fn inspect(source: &dyn PhysicalDeviceSource, device: vk::PhysicalDevice, required_extensions: &[String]) -> Self {
        Self::inspect_with(source, device, required_extensions, &prefer_discrete)
    }

    /// Query everything selection needs about `device` and rank it with `scorer`
    ///
    /// Extension support is checked first; a device missing one is not
    /// queried further. Query failures make the candidate unusable instead of
    /// aborting selection. `scorer` only sees candidates that meet every
    /// requirement.
    pub fn inspect_with(
        source: &dyn PhysicalDeviceSource,
        device: vk::PhysicalDevice,
        required_extensions: &[String],
        scorer: &dyn Fn(&Self) -> u32,
    ) -> Self {
        let properties = source.properties(device);
        let name = device_name(&properties.device_name);

        let mut candidate = Self {
            handle: device,
            name,
            device_type: properties.device_type,
            queue_families: Vec::new(),
            assignment: QueueFamilyAssignment::default(),
            surface: None,
            extensions_supported: false,
            score: UNUSABLE,
        };

        candidate.extensions_supported = match check_device_extensions(source, device, required_extensions) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("{}: {}", candidate.name, err);
                false
            }
        };
        if !candidate.extensions_supported {
            return candidate;
        }

        candidate.queue_families = source.queue_families(device);
        match QueueFamilyAssignment::resolve(&candidate.queue_families, |index| source.surface_support(device, index)) {
            Ok(assignment) => candidate.assignment = assignment,
            Err(result) => log::warn!("{}: surface support query failed: {:?}", candidate.name, result),
        }

        match SurfaceSupport::query(source, device) {
            Ok(support) => candidate.surface = Some(support),
            Err(result) => log::warn!("{}: surface query failed: {:?}", candidate.name, result),
        }

        if candidate.meets_requirements() {
            candidate.score = scorer(&candidate);
        }
        candidate
    }

    /// Required extensions, both queue roles and a usable surface
    pub fn meets_requirements(&self) -> bool {
        let surface_ok = self.surface.as_ref().is_some_and(SurfaceSupport::is_adequate);
        self.extensions_supported && self.assignment.is_complete() && surface_ok
    }
}

/// Default ranking: discrete GPUs 2, every other device type 1
pub fn prefer_discrete(candidate: &PhysicalDeviceCandidate) -> u32 {
    if candidate.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
        2
    } else {
        1
    }
}

/// Verify that `device` exposes every name in `required`
///
/// Names are matched exactly, including case.
pub fn check_device_extensions(
    source: &dyn PhysicalDeviceSource,
    device: vk::PhysicalDevice,
    required: &[String],
) -> VulkanResult<()> {
    let available = source.device_extensions(device).map_err(VulkanError::Api)?;
    match first_unsupported(required, &available) {
        Some(missing) => Err(VulkanError::ExtensionUnsupported(missing.to_string())),
        None => Ok(()),
    }
}

/// The winning device with everything later stages need
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    /// Physical device handle
    pub handle: vk::PhysicalDevice,
    /// Driver-reported device name
    pub name: String,
    /// Graphics and present families
    pub queue_families: QueueFamilyIndices,
    /// Surface capabilities, formats and present modes
    pub surface: SurfaceSupport,
}

/// Pick the best candidate, first enumerated wins a tie
pub fn best_candidate(candidates: &[PhysicalDeviceCandidate]) -> Option<&PhysicalDeviceCandidate> {
    let mut best: Option<&PhysicalDeviceCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.score > UNUSABLE) {
        if best.map_or(true, |current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Enumerate, score and pick a physical device for the surface behind `source`
pub fn select_physical_device(
    source: &dyn PhysicalDeviceSource,
    required_extensions: &[String],
) -> VulkanResult<SelectedDevice> {
    select_physical_device_with(source, required_extensions, &prefer_discrete)
}

/// [`select_physical_device`] with a custom ranking for usable devices
///
/// A `scorer` result of [`UNUSABLE`] disqualifies the device.
pub fn select_physical_device_with(
    source: &dyn PhysicalDeviceSource,
    required_extensions: &[String],
    scorer: &dyn Fn(&PhysicalDeviceCandidate) -> u32,
) -> VulkanResult<SelectedDevice> {
    let devices = source.enumerate_physical_devices().map_err(VulkanError::Api)?;

    let candidates: Vec<PhysicalDeviceCandidate> = devices
        .iter()
        .map(|&device| PhysicalDeviceCandidate::inspect_with(source, device, required_extensions, scorer))
        .collect();

    for candidate in &candidates {
        log::debug!(
            "GPU candidate '{}' ({:?}): score {}",
            candidate.name,
            candidate.device_type,
            candidate.score
        );
    }

    let winner = best_candidate(&candidates).ok_or(VulkanError::NoSuitableDevice {
        candidates: candidates.len(),
    })?;

    let queue_families = winner.assignment.complete()?;
    let surface = winner.surface.clone().ok_or(VulkanError::NoSuitableDevice {
        candidates: candidates.len(),
    })?;

    log::info!(
        "Selected GPU '{}' ({:?}), graphics family {}, present family {}",
        winner.name,
        winner.device_type,
        queue_families.graphics,
        queue_families.present
    );

    Ok(SelectedDevice {
        handle: winner.handle,
        name: winner.name.clone(),
        queue_families,
        surface,
    })
}

fn device_name(raw: &[std::os::raw::c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c.to_ne_bytes()[0])
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
