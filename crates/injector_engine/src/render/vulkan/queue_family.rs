//! Graphics and present queue family resolution

use ash::prelude::VkResult;
use ash::vk;

use super::error::{VulkanError, VulkanResult};

/// Partially resolved queue family roles for one device/surface pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyAssignment {
    /// First family advertising graphics support
    pub graphics_family: Option<u32>,
    /// First family able to present to the surface
    pub present_family: Option<u32>,
}

impl QueueFamilyAssignment {
    /// Scan `families` in index order, first fit for each role
    ///
    /// `present_support` is queried per family until both roles are filled;
    /// the scan stops at that point.
    pub fn resolve<F>(families: &[vk::QueueFamilyProperties], mut present_support: F) -> VkResult<Self>
    where
        F: FnMut(u32) -> VkResult<bool>,
    {
        let mut assignment = Self::default();

        for (index, family) in (0u32..).zip(families) {
            if assignment.graphics_family.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                assignment.graphics_family = Some(index);
            }

            if assignment.present_family.is_none() && present_support(index)? {
                assignment.present_family = Some(index);
            }

            if assignment.is_complete() {
                break;
            }
        }

        Ok(assignment)
    }

    /// Both roles are assigned
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// Resolved indices, or [`VulkanError::IncompleteQueueFamilies`]
    pub fn complete(&self) -> VulkanResult<QueueFamilyIndices> {
        match (self.graphics_family, self.present_family) {
            (Some(graphics), Some(present)) => Ok(QueueFamilyIndices { graphics, present }),
            (graphics, present) => Err(VulkanError::IncompleteQueueFamilies { graphics, present }),
        }
    }
}

/// Fully resolved queue family indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Graphics family index
    pub graphics: u32,
    /// Present family index
    pub present: u32,
}

impl QueueFamilyIndices {
    /// Distinct family indices in first-seen order (graphics, then present)
    pub fn unique(&self) -> Vec<u32> {
        if self.graphics == self.present {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }

    /// Graphics and present live in different families
    pub fn is_split(&self) -> bool {
        self.graphics != self.present
    }
}
