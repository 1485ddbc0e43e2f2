use std::{ffi::CStr, fmt};

use ash::vk::{self, PhysicalDeviceType};
use tracing::{debug, info};

use crate::{
    instance::InstanceGuard,
    queue_families::{resolve_queue_families, QueueFamilies},
    surface::SurfaceGuard,
    swapchain::SwapChainSupportDetails,
    NegotiationError, Result,
};

/// Snapshot of one physical device, taken once per candidate during selection.
///
/// Only what the cheap checks need is queried up front. Extensions are
/// enumerated later, for devices that get that far.
#[derive(Debug, Clone)]
pub struct PhysicalDeviceDescriptor {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub device_type: PhysicalDeviceType,
    pub features: vk::PhysicalDeviceFeatures,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
}

impl PhysicalDeviceDescriptor {
    pub fn query(instance: &InstanceGuard, handle: vk::PhysicalDevice) -> Result<Self> {
        let api = instance.api();
        let properties = api
            .physical_device_properties(**instance, handle)
            .map_err(NegotiationError::query("device properties"))?;
        let features = api
            .physical_device_features(**instance, handle)
            .map_err(NegotiationError::query("device features"))?;
        let queue_families = api
            .queue_family_properties(**instance, handle)
            .map_err(NegotiationError::query("queue families"))?;
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Ok(Self {
            handle,
            name,
            device_type: properties.device_type,
            features,
            queue_families,
        })
    }

    pub fn query_extensions(&self, instance: &InstanceGuard) -> Result<Vec<String>> {
        instance
            .api()
            .device_extensions(**instance, self.handle)
            .map_err(NegotiationError::query("device extensions"))
    }
}

/// Required extensions missing from `available`, compared by exact name.
pub fn missing_extensions(available: &[String], required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|extension_name| !available.contains(extension_name))
        .cloned()
        .collect()
}

/// The first device that passed every check, with what was learned about it.
#[derive(Debug, Clone)]
pub struct SuitableDevice {
    pub descriptor: PhysicalDeviceDescriptor,
    pub queue_families: QueueFamilies,
    pub extensions: Vec<String>,
    pub swapchain_support: SwapChainSupportDetails,
}

/// Why a candidate device was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotDiscreteGpu(PhysicalDeviceType),
    NoGeometryShader,
    IncompleteQueueFamilies,
    MissingExtensions(Vec<String>),
    NoSwapchainSupport,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDiscreteGpu(device_type) => {
                write!(f, "not a discrete GPU ({:?})", device_type)
            }
            Self::NoGeometryShader => write!(f, "geometry shaders not supported"),
            Self::IncompleteQueueFamilies => write!(f, "required queue families not available"),
            Self::MissingExtensions(names) => {
                write!(f, "device extensions not available: {}", names.join(", "))
            }
            Self::NoSwapchainSupport => write!(f, "no surface formats or present modes"),
        }
    }
}

/// Runs the suitability checks in order, stopping at the first that fails.
/// Extension and surface queries are only made for devices that get that far,
/// so a device rejected early cannot fail selection through them.
pub fn evaluate_device(
    device: PhysicalDeviceDescriptor,
    surface: &SurfaceGuard,
    required_extensions: &[String],
) -> Result<std::result::Result<SuitableDevice, Rejection>> {
    // dedicated graphics card only, even if others could do the job
    if device.device_type != PhysicalDeviceType::DISCRETE_GPU {
        return Ok(Err(Rejection::NotDiscreteGpu(device.device_type)));
    }

    if device.features.geometry_shader != vk::TRUE {
        return Ok(Err(Rejection::NoGeometryShader));
    }

    let Some(queue_families) = resolve_queue_families(&device, surface)?.complete() else {
        return Ok(Err(Rejection::IncompleteQueueFamilies));
    };

    let extensions = device.query_extensions(surface.instance())?;
    debug!(
        "{}: {} device extensions available",
        device.name,
        extensions.len()
    );
    let missing = missing_extensions(&extensions, required_extensions);
    if !missing.is_empty() {
        return Ok(Err(Rejection::MissingExtensions(missing)));
    }

    let swapchain_support = SwapChainSupportDetails::query(surface, device.handle)?;
    if !swapchain_support.is_adequate() {
        return Ok(Err(Rejection::NoSwapchainSupport));
    }

    Ok(Ok(SuitableDevice {
        descriptor: device,
        queue_families,
        extensions,
        swapchain_support,
    }))
}

/// Picks the first device, in the order the driver lists them, that is a
/// discrete GPU with geometry shaders, graphics and present queue families,
/// every required extension and a usable swapchain for `surface`.
pub fn select_device(
    instance: &InstanceGuard,
    surface: &SurfaceGuard,
    required_extensions: &[String],
) -> Result<SuitableDevice> {
    let physical_devices = instance
        .api()
        .enumerate_physical_devices(**instance)
        .map_err(NegotiationError::query("physical devices"))?;
    debug!("{} physical devices", physical_devices.len());
    if physical_devices.is_empty() {
        return Err(NegotiationError::NoPhysicalDevices);
    }

    for physical_device in physical_devices {
        let descriptor = PhysicalDeviceDescriptor::query(instance, physical_device)?;
        let name = descriptor.name.clone();
        match evaluate_device(descriptor, surface, required_extensions)? {
            Ok(suitable) => {
                info!(
                    "Selected {}, graphics queue family = {}, present queue family = {}",
                    name, suitable.queue_families.graphics, suitable.queue_families.present
                );
                return Ok(suitable);
            }
            Err(rejection) => debug!("Skipping {}: {}", name, rejection),
        }
    }
    Err(NegotiationError::NoSuitableDevice)
}
