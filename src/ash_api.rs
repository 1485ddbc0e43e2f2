use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::{CStr, CString},
    os::raw::c_char,
};

use ash::{
    extensions::{
        ext::DebugUtils,
        khr::{Surface, Swapchain},
    },
    prelude::VkResult,
    vk, Device, Entry, Instance,
};
use tracing::{debug, warn};

use crate::{
    api::{DeviceRequest, GraphicsApi, InstanceRequest, SwapchainRequest},
    logging::vulkan_debug_utils_callback,
};

struct InstanceFns {
    instance: Instance,
    surface: Surface,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

struct DeviceFns {
    device: Device,
    swapchain: Swapchain,
}

/// `GraphicsApi` backed by the Vulkan loader through ash.
///
/// ash needs a loaded function table per instance and per device, so those
/// are kept here keyed by the raw handle the pipeline passes around.
pub struct AshApi {
    entry: Entry,
    instances: RefCell<HashMap<vk::Instance, InstanceFns>>,
    devices: RefCell<HashMap<vk::Device, DeviceFns>>,
}

impl AshApi {
    pub fn linked() -> Self {
        Self::new(Entry::linked())
    }

    pub fn new(entry: Entry) -> Self {
        Self {
            entry,
            instances: RefCell::new(HashMap::new()),
            devices: RefCell::new(HashMap::new()),
        }
    }

    fn with_instance<T>(
        &self,
        instance: vk::Instance,
        f: impl FnOnce(&InstanceFns) -> VkResult<T>,
    ) -> VkResult<T> {
        let instances = self.instances.borrow();
        let fns = instances.get(&instance).ok_or(vk::Result::ERROR_UNKNOWN)?;
        f(fns)
    }

    fn with_device<T>(
        &self,
        device: vk::Device,
        f: impl FnOnce(&DeviceFns) -> VkResult<T>,
    ) -> VkResult<T> {
        let devices = self.devices.borrow();
        let fns = devices.get(&device).ok_or(vk::Result::ERROR_UNKNOWN)?;
        f(fns)
    }
}

fn to_c_strings(names: &[String]) -> VkResult<Vec<CString>> {
    names
        .iter()
        .map(|name| CString::new(name.as_str()))
        .collect::<Result<_, _>>()
        .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)
}

fn name_from_raw(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

fn debug_utils_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        )
        .pfn_user_callback(Some(vulkan_debug_utils_callback))
}

impl GraphicsApi for AshApi {
    fn instance_extension_count(&self) -> VkResult<usize> {
        Ok(self
            .entry
            .enumerate_instance_extension_properties(None)?
            .len())
    }

    fn available_layers(&self) -> VkResult<Vec<String>> {
        Ok(self
            .entry
            .enumerate_instance_layer_properties()?
            .iter()
            .map(|layer| name_from_raw(&layer.layer_name))
            .collect())
    }

    fn create_instance(&self, request: &InstanceRequest) -> VkResult<vk::Instance> {
        let application_name = CString::new(request.application_name.as_str())
            .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let engine_name = CString::new(request.engine_name.as_str())
            .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let application_info = vk::ApplicationInfo::builder()
            .application_name(&application_name)
            .application_version(request.application_version)
            .engine_name(&engine_name)
            .engine_version(request.engine_version)
            .api_version(request.api_version);

        let extension_names = to_c_strings(&request.extensions)?;
        let extension_name_pointers = extension_names
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();
        let layer_names = to_c_strings(&request.layers)?;
        let layer_name_pointers = layer_names
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();

        let debug_enabled = extension_names
            .iter()
            .any(|extension_name| extension_name.as_c_str() == DebugUtils::name());
        // chained so instance creation and destruction are reported as well
        let mut debug_create_info = debug_utils_create_info();
        let mut instance_create_info = vk::InstanceCreateInfo::builder()
            .application_info(&application_info)
            .enabled_extension_names(&extension_name_pointers)
            .enabled_layer_names(&layer_name_pointers);
        if debug_enabled {
            instance_create_info = instance_create_info.push_next(&mut debug_create_info);
        }

        let instance = unsafe { self.entry.create_instance(&instance_create_info, None)? };
        let handle = instance.handle();

        let debug_utils = if debug_enabled {
            let debug_utils = DebugUtils::new(&self.entry, &instance);
            let messenger = unsafe {
                debug_utils.create_debug_utils_messenger(&debug_utils_create_info(), None)
            };
            match messenger {
                Ok(messenger) => Some((debug_utils, messenger)),
                Err(code) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(code);
                }
            }
        } else {
            None
        };

        let surface = Surface::new(&self.entry, &instance);
        self.instances.borrow_mut().insert(
            handle,
            InstanceFns {
                instance,
                surface,
                debug_utils,
            },
        );
        Ok(handle)
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        let Some(fns) = self.instances.borrow_mut().remove(&instance) else {
            warn!("Asked to destroy unknown instance {:?}", instance);
            return;
        };
        unsafe {
            if let Some((debug_utils, messenger)) = fns.debug_utils {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            fns.instance.destroy_instance(None);
        }
    }

    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        let destroyed = self.with_instance(instance, |fns| {
            unsafe { fns.surface.destroy_surface(surface, None) };
            Ok(())
        });
        if destroyed.is_err() {
            warn!("Surface {:?} outlived its instance", surface);
        }
    }

    fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
    ) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.with_instance(instance, |fns| unsafe {
            fns.instance.enumerate_physical_devices()
        })
    }

    fn physical_device_properties(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        self.with_instance(instance, |fns| {
            Ok(unsafe {
                fns.instance
                    .get_physical_device_properties(physical_device)
            })
        })
    }

    fn physical_device_features(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceFeatures> {
        self.with_instance(instance, |fns| {
            Ok(unsafe { fns.instance.get_physical_device_features(physical_device) })
        })
    }

    fn queue_family_properties(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        self.with_instance(instance, |fns| {
            Ok(unsafe {
                fns.instance
                    .get_physical_device_queue_family_properties(physical_device)
            })
        })
    }

    fn device_extensions(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<String>> {
        self.with_instance(instance, |fns| {
            let extensions = unsafe {
                fns.instance
                    .enumerate_device_extension_properties(physical_device)?
            };
            Ok(extensions
                .iter()
                .map(|extension| name_from_raw(&extension.extension_name))
                .collect())
        })
    }

    fn surface_support(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.with_instance(instance, |fns| unsafe {
            fns.surface.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                surface,
            )
        })
    }

    fn surface_capabilities(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.with_instance(instance, |fns| unsafe {
            fns.surface
                .get_physical_device_surface_capabilities(physical_device, surface)
        })
    }

    fn surface_formats(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.with_instance(instance, |fns| unsafe {
            fns.surface
                .get_physical_device_surface_formats(physical_device, surface)
        })
    }

    fn surface_present_modes(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.with_instance(instance, |fns| unsafe {
            fns.surface
                .get_physical_device_surface_present_modes(physical_device, surface)
        })
    }

    fn create_device(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        request: &DeviceRequest,
    ) -> VkResult<vk::Device> {
        let (device, swapchain) = self.with_instance(instance, |fns| {
            let device_queue_create_infos = request
                .queues
                .iter()
                .map(|queue| {
                    vk::DeviceQueueCreateInfo::builder()
                        .queue_family_index(queue.family_index)
                        .queue_priorities(&queue.priorities)
                        .build()
                })
                .collect::<Vec<_>>();

            let device_extension_names = to_c_strings(&request.extensions)?;
            let device_extension_name_ptrs = device_extension_names
                .iter()
                .map(|device_extension| device_extension.as_ptr())
                .collect::<Vec<_>>();

            let device_create_info = vk::DeviceCreateInfo::builder()
                .queue_create_infos(&device_queue_create_infos)
                .enabled_extension_names(&device_extension_name_ptrs)
                .enabled_features(&request.features);
            let device = unsafe {
                fns.instance
                    .create_device(physical_device, &device_create_info, None)?
            };
            let swapchain = Swapchain::new(&fns.instance, &device);
            Ok((device, swapchain))
        })?;

        let handle = device.handle();
        self.devices
            .borrow_mut()
            .insert(handle, DeviceFns { device, swapchain });
        Ok(handle)
    }

    fn device_queue(
        &self,
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue> {
        self.with_device(device, |fns| {
            Ok(unsafe {
                fns.device
                    .get_device_queue(queue_family_index, queue_index)
            })
        })
    }

    fn destroy_device(&self, device: vk::Device) {
        let Some(fns) = self.devices.borrow_mut().remove(&device) else {
            warn!("Asked to destroy unknown device {:?}", device);
            return;
        };
        unsafe { fns.device.destroy_device(None) }
    }

    fn create_swapchain(
        &self,
        device: vk::Device,
        request: &SwapchainRequest,
    ) -> VkResult<vk::SwapchainKHR> {
        self.with_device(device, |fns| {
            let swapchain_create_info = vk::SwapchainCreateInfoKHR::builder()
                .surface(request.surface)
                .min_image_count(request.min_image_count)
                .image_format(request.surface_format.format)
                .image_color_space(request.surface_format.color_space)
                .image_extent(request.extent)
                .image_array_layers(request.image_array_layers)
                .image_usage(request.image_usage)
                .image_sharing_mode(request.sharing_mode)
                .queue_family_indices(&request.queue_family_indices)
                .pre_transform(request.pre_transform)
                .composite_alpha(request.composite_alpha)
                .present_mode(request.present_mode)
                .clipped(request.clipped)
                .old_swapchain(vk::SwapchainKHR::null());
            unsafe {
                fns.swapchain
                    .create_swapchain(&swapchain_create_info, None)
            }
        })
    }

    fn swapchain_images(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>> {
        self.with_device(device, |fns| unsafe {
            fns.swapchain.get_swapchain_images(swapchain)
        })
    }

    fn destroy_swapchain(&self, device: vk::Device, swapchain: vk::SwapchainKHR) {
        let destroyed = self.with_device(device, |fns| {
            unsafe { fns.swapchain.destroy_swapchain(swapchain, None) };
            Ok(())
        });
        if destroyed.is_err() {
            warn!("Swapchain {:?} outlived its device", swapchain);
        }
    }

    fn create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        self.with_device(device, |fns| unsafe {
            fns.device.create_image_view(create_info, None)
        })
    }

    fn destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView) {
        let destroyed = self.with_device(device, |fns| {
            unsafe { fns.device.destroy_image_view(image_view, None) };
            Ok(())
        });
        if destroyed.is_err() {
            warn!("Image view {:?} outlived its device", image_view);
        }
    }
}

impl Drop for AshApi {
    fn drop(&mut self) {
        let devices = self.devices.borrow().len();
        let instances = self.instances.borrow().len();
        if devices > 0 || instances > 0 {
            warn!(
                "Dropping AshApi with {} device(s) and {} instance(s) still alive",
                devices, instances
            );
        } else {
            debug!("Dropping AshApi");
        }
    }
}
