use ash::vk::QueueFlags;

use crate::{
    physical_device::PhysicalDeviceDescriptor, surface::SurfaceGuard, NegotiationError, Result,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// family capable of runing graphics related commands
    pub graphics_family: Option<u32>,
    /// family capable of displaying results on the surface
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// The resolved pair, or `None` while either role is unset.
    pub fn complete(&self) -> Option<QueueFamilies> {
        Some(QueueFamilies {
            graphics: self.graphics_family?,
            present: self.present_family?,
        })
    }
}

/// Queue family indices with both roles resolved. Only this form can be used
/// to create a logical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    /// True when one family serves both graphics and presentation.
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// The distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

/// Scans the device's queue families in index order, recording each family
/// with graphics support and each family that can present to `surface`. A
/// later match overwrites an earlier one, and the scan stops at the first
/// index where both roles are set.
///
/// The result may be incomplete; the caller decides what that means.
pub fn resolve_queue_families(
    device: &PhysicalDeviceDescriptor,
    surface: &SurfaceGuard,
) -> Result<QueueFamilyIndices> {
    let mut indices = QueueFamilyIndices::default();
    for (index, family) in device.queue_families.iter().enumerate() {
        let index = index as u32;
        if family.queue_flags.contains(QueueFlags::GRAPHICS) {
            indices.graphics_family = Some(index);
        }
        let supports_present = surface
            .get_physical_device_surface_support(device.handle, index)
            .map_err(NegotiationError::query("surface support"))?;
        if supports_present {
            indices.present_family = Some(index);
        }
        if indices.is_complete() {
            break;
        }
    }
    Ok(indices)
}
