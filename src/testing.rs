//! Scripted stand-ins for the driver and the window system.

use std::cell::{Cell, RefCell};

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};

use crate::{
    api::{DeviceRequest, GraphicsApi, InstanceRequest, SwapchainRequest},
    window::WindowSystem,
};

pub(crate) struct FakeQueueFamily {
    pub flags: vk::QueueFlags,
    pub present: bool,
}

impl FakeQueueFamily {
    pub fn new(flags: vk::QueueFlags, present: bool) -> Self {
        Self { flags, present }
    }
}

pub(crate) struct FakeDevice {
    pub name: &'static str,
    pub device_type: vk::PhysicalDeviceType,
    pub geometry_shader: bool,
    pub queue_families: Vec<FakeQueueFamily>,
    pub extensions: Vec<String>,
    /// Fails extension enumeration for this device.
    pub extensions_error: Option<vk::Result>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl FakeDevice {
    /// A discrete GPU passing every selection check, with one queue family
    /// that does graphics and presentation.
    pub fn capable(name: &'static str) -> Self {
        Self {
            name,
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            geometry_shader: true,
            queue_families: vec![FakeQueueFamily::new(vk::QueueFlags::GRAPHICS, true)],
            extensions: vec!["VK_KHR_swapchain".to_owned()],
            extensions_error: None,
            capabilities: capabilities(2, 0, (800, 600)),
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
        }
    }

    pub fn of_type(mut self, device_type: vk::PhysicalDeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    pub fn with_queue_families(mut self, queue_families: Vec<FakeQueueFamily>) -> Self {
        self.queue_families = queue_families;
        self
    }
}

pub(crate) fn capabilities(
    min_image_count: u32,
    max_image_count: u32,
    current_extent: (u32, u32),
) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count,
        max_image_count,
        current_extent: vk::Extent2D {
            width: current_extent.0,
            height: current_extent.1,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Destroyed {
    ImageView(vk::ImageView),
    Swapchain(vk::SwapchainKHR),
    Device(vk::Device),
    Surface(vk::SurfaceKHR),
    Instance(vk::Instance),
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub extension_count: usize,
    pub layers: Vec<String>,
    pub devices: Vec<FakeDevice>,
    pub instance_error: Option<vk::Result>,
    pub device_error: Option<vk::Result>,
    pub queue_error: Option<vk::Result>,
    pub swapchain_error: Option<vk::Result>,
    pub swapchain_images_error: Option<vk::Result>,
    /// Fails the image view creation with this index.
    pub image_view_error: Option<(usize, vk::Result)>,
    /// Images handed out beyond the requested minimum.
    pub extra_swapchain_images: u32,

    pub instance_requests: RefCell<Vec<InstanceRequest>>,
    pub device_requests: RefCell<Vec<DeviceRequest>>,
    pub queue_retrievals: RefCell<Vec<(u32, u32)>>,
    pub swapchain_requests: RefCell<Vec<SwapchainRequest>>,
    pub image_view_infos: RefCell<Vec<vk::ImageViewCreateInfo>>,
    pub surface_support_queries: RefCell<Vec<(vk::PhysicalDevice, u32)>>,
    pub destroyed: RefCell<Vec<Destroyed>>,
    pub next_handle: Cell<u64>,
}

impl FakeApi {
    pub fn with_devices(devices: Vec<FakeDevice>) -> Self {
        Self {
            extension_count: 12,
            devices,
            ..Default::default()
        }
    }

    fn next_raw(&self) -> u64 {
        let raw = self.next_handle.get() + 0x100;
        self.next_handle.set(raw);
        raw
    }

    fn device(&self, physical_device: vk::PhysicalDevice) -> VkResult<&FakeDevice> {
        let index = physical_device.as_raw().wrapping_sub(1) as usize;
        self.devices.get(index).ok_or(vk::Result::ERROR_UNKNOWN)
    }

    pub fn physical_device(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64 + 1)
    }
}

impl GraphicsApi for FakeApi {
    fn instance_extension_count(&self) -> VkResult<usize> {
        Ok(self.extension_count)
    }

    fn available_layers(&self) -> VkResult<Vec<String>> {
        Ok(self.layers.clone())
    }

    fn create_instance(&self, request: &InstanceRequest) -> VkResult<vk::Instance> {
        self.instance_requests.borrow_mut().push(request.clone());
        match self.instance_error {
            Some(code) => Err(code),
            None => Ok(vk::Instance::from_raw(self.next_raw())),
        }
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        self.destroyed
            .borrow_mut()
            .push(Destroyed::Instance(instance));
    }

    fn destroy_surface(&self, _instance: vk::Instance, surface: vk::SurfaceKHR) {
        self.destroyed.borrow_mut().push(Destroyed::Surface(surface));
    }

    fn enumerate_physical_devices(
        &self,
        _instance: vk::Instance,
    ) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok((0..self.devices.len())
            .map(Self::physical_device)
            .collect())
    }

    fn physical_device_properties(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        let device = self.device(physical_device)?;
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: device.device_type,
            ..Default::default()
        };
        for (slot, byte) in properties.device_name.iter_mut().zip(device.name.bytes()) {
            *slot = byte as std::os::raw::c_char;
        }
        Ok(properties)
    }

    fn physical_device_features(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceFeatures> {
        let device = self.device(physical_device)?;
        Ok(vk::PhysicalDeviceFeatures {
            geometry_shader: device.geometry_shader.into(),
            ..Default::default()
        })
    }

    fn queue_family_properties(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        Ok(self
            .device(physical_device)?
            .queue_families
            .iter()
            .map(|family| vk::QueueFamilyProperties {
                queue_flags: family.flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect())
    }

    fn device_extensions(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<String>> {
        let device = self.device(physical_device)?;
        match device.extensions_error {
            Some(code) => Err(code),
            None => Ok(device.extensions.clone()),
        }
    }

    fn surface_support(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.surface_support_queries
            .borrow_mut()
            .push((physical_device, queue_family_index));
        let family = self
            .device(physical_device)?
            .queue_families
            .get(queue_family_index as usize)
            .ok_or(vk::Result::ERROR_UNKNOWN)?;
        Ok(family.present)
    }

    fn surface_capabilities(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.device(physical_device)?.capabilities)
    }

    fn surface_formats(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.device(physical_device)?.formats.clone())
    }

    fn surface_present_modes(
        &self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.device(physical_device)?.present_modes.clone())
    }

    fn create_device(
        &self,
        _instance: vk::Instance,
        _physical_device: vk::PhysicalDevice,
        request: &DeviceRequest,
    ) -> VkResult<vk::Device> {
        self.device_requests.borrow_mut().push(request.clone());
        match self.device_error {
            Some(code) => Err(code),
            None => Ok(vk::Device::from_raw(self.next_raw())),
        }
    }

    /// Hands out a fresh handle on every call, like a driver may.
    fn device_queue(
        &self,
        _device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue> {
        self.queue_retrievals
            .borrow_mut()
            .push((queue_family_index, queue_index));
        match self.queue_error {
            Some(code) => Err(code),
            None => Ok(vk::Queue::from_raw(self.next_raw())),
        }
    }

    fn destroy_device(&self, device: vk::Device) {
        self.destroyed.borrow_mut().push(Destroyed::Device(device));
    }

    fn create_swapchain(
        &self,
        _device: vk::Device,
        request: &SwapchainRequest,
    ) -> VkResult<vk::SwapchainKHR> {
        self.swapchain_requests.borrow_mut().push(request.clone());
        match self.swapchain_error {
            Some(code) => Err(code),
            None => Ok(vk::SwapchainKHR::from_raw(self.next_raw())),
        }
    }

    fn swapchain_images(
        &self,
        _device: vk::Device,
        _swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>> {
        if let Some(code) = self.swapchain_images_error {
            return Err(code);
        }
        let requested = self
            .swapchain_requests
            .borrow()
            .last()
            .map(|request| request.min_image_count)
            .ok_or(vk::Result::ERROR_UNKNOWN)?;
        Ok((0..requested + self.extra_swapchain_images)
            .map(|_| vk::Image::from_raw(self.next_raw()))
            .collect())
    }

    fn destroy_swapchain(&self, _device: vk::Device, swapchain: vk::SwapchainKHR) {
        self.destroyed
            .borrow_mut()
            .push(Destroyed::Swapchain(swapchain));
    }

    fn create_image_view(
        &self,
        _device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        let index = self.image_view_infos.borrow().len();
        self.image_view_infos.borrow_mut().push(*create_info);
        match self.image_view_error {
            Some((failing, code)) if failing == index => Err(code),
            _ => Ok(vk::ImageView::from_raw(self.next_raw())),
        }
    }

    fn destroy_image_view(&self, _device: vk::Device, image_view: vk::ImageView) {
        self.destroyed
            .borrow_mut()
            .push(Destroyed::ImageView(image_view));
    }
}

pub(crate) struct FakeWindow {
    pub extensions: Option<Vec<String>>,
    pub surface: VkResult<vk::SurfaceKHR>,
    pub drawable_size: (u32, u32),
    pub drawable_size_queried: Cell<bool>,
}

impl FakeWindow {
    pub fn new() -> Self {
        Self {
            extensions: Some(vec![
                "VK_KHR_surface".to_owned(),
                "VK_KHR_xcb_surface".to_owned(),
            ]),
            surface: Ok(vk::SurfaceKHR::from_raw(0x5eed)),
            drawable_size: (1920, 1080),
            drawable_size_queried: Cell::new(false),
        }
    }
}

impl WindowSystem for FakeWindow {
    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.extensions.clone()
    }

    fn create_surface(&self, _instance: vk::Instance) -> VkResult<vk::SurfaceKHR> {
        self.surface
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable_size_queried.set(true);
        self.drawable_size
    }
}
