use std::{ops::Deref, rc::Rc};

use ash::vk::{
    self, ColorSpaceKHR, CompositeAlphaFlagsKHR, Extent2D, Format, ImageUsageFlags,
    PresentModeKHR, SharingMode, SurfaceCapabilitiesKHR, SurfaceFormatKHR,
};
use tracing::{debug, info};

use crate::{
    api::SwapchainRequest, logical_device::LogicalDeviceGuard, queue_families::QueueFamilies,
    surface::SurfaceGuard, window::WindowSystem, NegotiationError, Result,
};

/// `currentExtent` value meaning the surface lets the swapchain pick its size.
pub const UNDEFINED_EXTENT: u32 = u32::MAX;

/// What the swap chain supports for one physical device and surface.
#[derive(Debug, Clone)]
pub struct SwapChainSupportDetails {
    pub capabilities: SurfaceCapabilitiesKHR,
    /// The formats (color depth settings) available to use, in driver order.
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapChainSupportDetails {
    pub fn query(surface: &SurfaceGuard, device: vk::PhysicalDevice) -> Result<Self> {
        let capabilities = surface
            .get_capabilities(device)
            .map_err(NegotiationError::query("surface capabilities"))?;
        let formats = surface
            .get_surface_formats(device)
            .map_err(NegotiationError::query("surface formats"))?;
        let present_modes = surface
            .get_presentation_modes(device)
            .map_err(NegotiationError::query("surface present modes"))?;
        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// A swapchain needs at least one format and one present mode.
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Prefers 8 bit BGRA sRGB in the non-linear sRGB color space, otherwise the
/// first format the driver listed. `None` only for an empty list.
pub fn choose_swap_surface_format(
    available_formats: &[SurfaceFormatKHR],
) -> Option<SurfaceFormatKHR> {
    available_formats
        .iter()
        .find(|format| {
            format.format == Format::B8G8R8A8_SRGB
                && format.color_space == ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| available_formats.first())
        .copied()
}

/// Mailbox if offered, otherwise FIFO, which every driver has to support.
pub fn choose_swap_present_mode(available_modes: &[PresentModeKHR]) -> PresentModeKHR {
    // mailbox replaces queued images with newer ones instead of blocking
    if available_modes.contains(&PresentModeKHR::MAILBOX) {
        PresentModeKHR::MAILBOX
    } else {
        PresentModeKHR::FIFO
    }
}

/// The surface's current extent, unless it is undefined, in which case the
/// window's drawable size in pixels clamped to the supported range. If a
/// driver reports a minimum above the maximum, the maximum wins.
pub fn choose_swap_extent(
    capabilities: &SurfaceCapabilitiesKHR,
    window: &dyn WindowSystem,
) -> Extent2D {
    let current = capabilities.current_extent;
    if current.width != UNDEFINED_EXTENT && current.height != UNDEFINED_EXTENT {
        return current;
    }
    let (width, height) = window.drawable_size();
    Extent2D {
        width: width
            .max(capabilities.min_image_extent.width)
            .min(capabilities.max_image_extent.width),
        height: height
            .max(capabilities.min_image_extent.height)
            .min(capabilities.max_image_extent.height),
    }
}

/// One more than the minimum, capped by the maximum when there is one.
pub fn choose_image_count(capabilities: &SurfaceCapabilitiesKHR) -> u32 {
    let image_count = capabilities.min_image_count.saturating_add(1);
    // zero means there is no max
    if capabilities.max_image_count > 0 {
        image_count.min(capabilities.max_image_count)
    } else {
        image_count
    }
}

/// Exclusive ownership when one family does both jobs, otherwise concurrent
/// access shared by the graphics and present families.
pub fn choose_sharing(queue_families: &QueueFamilies) -> (SharingMode, Vec<u32>) {
    if queue_families.is_shared() {
        (SharingMode::EXCLUSIVE, vec![])
    } else {
        (
            SharingMode::CONCURRENT,
            vec![queue_families.graphics, queue_families.present],
        )
    }
}

/// RAII for the swapchain, along with the images it owns and what was
/// negotiated for them.
pub struct SwapchainGuard {
    handle: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    surface_format: SurfaceFormatKHR,
    extent: Extent2D,
    present_mode: PresentModeKHR,
    // references we need to keep to ensure
    // we are cleaned up before they are
    logical_device: Rc<LogicalDeviceGuard>,
    _surface: Rc<SurfaceGuard>,
}

impl SwapchainGuard {
    /// Negotiates format, present mode, extent and image count from `support`,
    /// creates the swapchain and fetches its images.
    pub fn try_new(
        logical_device: &Rc<LogicalDeviceGuard>,
        surface: &Rc<SurfaceGuard>,
        support: &SwapChainSupportDetails,
        window: &dyn WindowSystem,
    ) -> Result<Self> {
        let surface_format = choose_swap_surface_format(&support.formats)
            .ok_or(NegotiationError::SwapchainCreationFailed(
                vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
            ))?;
        let present_mode = choose_swap_present_mode(&support.present_modes);
        let extent = choose_swap_extent(&support.capabilities, window);
        let image_count = choose_image_count(&support.capabilities);
        let (sharing_mode, queue_family_indices) =
            choose_sharing(logical_device.queue_families());
        debug!(
            "Swapchain request: {:?}, {:?}, {}x{}, {} images, {:?}",
            surface_format, present_mode, extent.width, extent.height, image_count, sharing_mode
        );

        let request = SwapchainRequest {
            surface: ***surface,
            min_image_count: image_count,
            surface_format,
            extent,
            // not doing sterioscopic processing, only need 1 layer
            image_array_layers: 1,
            // we're rendering images, so set usage as a color attachment
            image_usage: ImageUsageFlags::COLOR_ATTACHMENT,
            sharing_mode,
            queue_family_indices,
            // no extra transforms - just pass in current transform
            pre_transform: support.capabilities.current_transform,
            // ignore alpha channel
            composite_alpha: CompositeAlphaFlagsKHR::OPAQUE,
            present_mode,
            // discard pixels hidden by something else (like another window)
            clipped: true,
        };

        let api = logical_device.api();
        let handle = api
            .create_swapchain(***logical_device, &request)
            .map_err(NegotiationError::SwapchainCreationFailed)?;
        let images = match api.swapchain_images(***logical_device, handle) {
            Ok(images) => images,
            Err(code) => {
                api.destroy_swapchain(***logical_device, handle);
                return Err(NegotiationError::SwapchainCreationFailed(code));
            }
        };
        info!("{} swap chain images", images.len());

        Ok(Self {
            handle,
            images,
            surface_format,
            extent,
            present_mode,
            logical_device: Rc::clone(logical_device),
            _surface: Rc::clone(surface),
        })
    }

    /// The images in the order the driver returned them. There may be more
    /// than were asked for.
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    pub fn surface_format(&self) -> SurfaceFormatKHR {
        self.surface_format
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn present_mode(&self) -> PresentModeKHR {
        self.present_mode
    }
}

impl Drop for SwapchainGuard {
    fn drop(&mut self) {
        debug!("Dropping SwapchainGuard");
        self.logical_device
            .api()
            .destroy_swapchain(**self.logical_device, self.handle);
    }
}

impl Deref for SwapchainGuard {
    type Target = vk::SwapchainKHR;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
