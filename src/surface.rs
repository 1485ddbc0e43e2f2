use std::{ops::Deref, rc::Rc};

use ash::{prelude::VkResult, vk};
use tracing::debug;

use crate::{instance::InstanceGuard, window::WindowSystem, NegotiationError, Result};

/// RAII for Surface
pub struct SurfaceGuard {
    handle: vk::SurfaceKHR,
    // need to keep a reference to instance to ensure we get dropped before it
    instance: Rc<InstanceGuard>,
}

impl SurfaceGuard {
    /// Binds a presentable surface for `window` to `instance`. The window must
    /// already have been created for Vulkan presentation.
    pub fn try_new(instance: &Rc<InstanceGuard>, window: &dyn WindowSystem) -> Result<Rc<Self>> {
        let handle = window
            .create_surface(***instance)
            .map_err(NegotiationError::SurfaceCreationFailed)?;
        Ok(Rc::new(Self {
            handle,
            instance: Rc::clone(instance),
        }))
    }

    pub fn instance(&self) -> &Rc<InstanceGuard> {
        &self.instance
    }

    pub fn get_physical_device_surface_support(
        &self,
        device: vk::PhysicalDevice,
        index: u32,
    ) -> VkResult<bool> {
        self.instance
            .api()
            .surface_support(**self.instance, device, index, self.handle)
    }

    pub fn get_capabilities(
        &self,
        device: vk::PhysicalDevice,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.instance
            .api()
            .surface_capabilities(**self.instance, device, self.handle)
    }

    pub fn get_surface_formats(
        &self,
        device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.instance
            .api()
            .surface_formats(**self.instance, device, self.handle)
    }

    pub fn get_presentation_modes(
        &self,
        device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.instance
            .api()
            .surface_present_modes(**self.instance, device, self.handle)
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        debug!("Dropping SurfaceGuard");
        self.instance
            .api()
            .destroy_surface(**self.instance, self.handle);
    }
}

impl Deref for SurfaceGuard {
    type Target = vk::SurfaceKHR;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
