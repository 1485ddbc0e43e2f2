use std::rc::Rc;

use ash::vk::{Extent2D, Queue, SurfaceFormatKHR};
use tracing::info;

use crate::{
    api::GraphicsApi,
    config::PipelineConfig,
    extensions::required_extensions,
    image_view::{create_image_views, ImageViewGuard},
    instance::InstanceGuard,
    logical_device::LogicalDeviceGuard,
    physical_device::{select_device, PhysicalDeviceDescriptor},
    surface::SurfaceGuard,
    swapchain::SwapchainGuard,
    window::WindowSystem,
    Result,
};

/// Everything from instance to swapchain image views, ready to render to.
///
/// Fields drop in declaration order, which is the reverse of creation: image
/// views, swapchain, device, surface, instance. Built and dropped on the
/// thread that owns the window.
pub struct Presentation {
    image_views: Vec<ImageViewGuard>,
    swapchain: SwapchainGuard,
    logical_device: Rc<LogicalDeviceGuard>,
    physical_device: PhysicalDeviceDescriptor,
    surface: Rc<SurfaceGuard>,
    instance: Rc<InstanceGuard>,
}

impl Presentation {
    /// Runs every stage in order and stops at the first error. Whatever was
    /// created before the failing stage is destroyed on the way out.
    pub fn establish(
        api: &Rc<dyn GraphicsApi>,
        window: &dyn WindowSystem,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let extensions = required_extensions(api.as_ref(), window)?;
        let instance = InstanceGuard::try_new(api, config, extensions)?;
        let surface = SurfaceGuard::try_new(&instance, window)?;
        let suitable = select_device(&instance, &surface, &config.device_extensions)?;
        let logical_device = LogicalDeviceGuard::try_new(
            &instance,
            &suitable.descriptor,
            suitable.queue_families,
            &config.device_extensions,
        )?;
        let swapchain = SwapchainGuard::try_new(
            &logical_device,
            &surface,
            &suitable.swapchain_support,
            window,
        )?;
        let image_views = create_image_views(
            &logical_device,
            swapchain.images(),
            swapchain.surface_format().format,
        )?;
        info!(
            "Presentation ready on {}: {} image views at {}x{}",
            suitable.descriptor.name,
            image_views.len(),
            swapchain.extent().width,
            swapchain.extent().height
        );

        Ok(Self {
            image_views,
            swapchain,
            logical_device,
            physical_device: suitable.descriptor,
            surface,
            instance,
        })
    }

    pub fn instance(&self) -> &Rc<InstanceGuard> {
        &self.instance
    }

    pub fn surface(&self) -> &Rc<SurfaceGuard> {
        &self.surface
    }

    pub fn physical_device(&self) -> &PhysicalDeviceDescriptor {
        &self.physical_device
    }

    pub fn logical_device(&self) -> &Rc<LogicalDeviceGuard> {
        &self.logical_device
    }

    pub fn graphics_queue(&self) -> Queue {
        self.logical_device.graphics_queue()
    }

    pub fn present_queue(&self) -> Queue {
        self.logical_device.present_queue()
    }

    pub fn swapchain(&self) -> &SwapchainGuard {
        &self.swapchain
    }

    pub fn surface_format(&self) -> SurfaceFormatKHR {
        self.swapchain.surface_format()
    }

    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    pub fn image_views(&self) -> &[ImageViewGuard] {
        &self.image_views
    }
}
