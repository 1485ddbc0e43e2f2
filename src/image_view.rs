use std::{ops::Deref, rc::Rc};

use ash::vk::{
    self, ComponentMapping, ComponentSwizzle, Format, Image, ImageAspectFlags,
    ImageSubresourceRange, ImageViewCreateInfo, ImageViewType,
};
use tracing::debug;

use crate::{logical_device::LogicalDeviceGuard, NegotiationError, Result};

/// First mip level the swapchain views expose. Swapchain images only have
/// level 0, so 1 is suspect, but it is what these views have always used.
pub const SWAPCHAIN_VIEW_BASE_MIP_LEVEL: u32 = 1;

/// 2D color view of `image` with no swizzling, one mip level and one layer.
pub fn image_view_create_info(image: Image, format: Format) -> ImageViewCreateInfo {
    ImageViewCreateInfo::builder()
        .image(image)
        .view_type(ImageViewType::TYPE_2D)
        .format(format)
        .components(
            ComponentMapping::builder()
                .r(ComponentSwizzle::IDENTITY)
                .g(ComponentSwizzle::IDENTITY)
                .b(ComponentSwizzle::IDENTITY)
                .a(ComponentSwizzle::IDENTITY)
                .build(),
        )
        .subresource_range(
            ImageSubresourceRange::builder()
                .aspect_mask(ImageAspectFlags::COLOR)
                .base_mip_level(SWAPCHAIN_VIEW_BASE_MIP_LEVEL)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1)
                .build(),
        )
        .build()
}

/// RAII for ImageView
pub struct ImageViewGuard {
    view: vk::ImageView,
    _image: Image,
    logical_device: Rc<LogicalDeviceGuard>,
}

impl ImageViewGuard {
    pub fn try_new(
        image: Image,
        logical_device: &Rc<LogicalDeviceGuard>,
        format: Format,
    ) -> ash::prelude::VkResult<Self> {
        let image_view_create_info = image_view_create_info(image, format);
        let view = logical_device
            .api()
            .create_image_view(***logical_device, &image_view_create_info)?;
        Ok(Self {
            view,
            _image: image,
            logical_device: Rc::clone(logical_device),
        })
    }
}

/// Creates one view per swapchain image, in image order.
///
/// Stops at the first failure. Views created before it are dropped, and so
/// destroyed, before the error is returned.
pub fn create_image_views(
    logical_device: &Rc<LogicalDeviceGuard>,
    images: &[Image],
    format: Format,
) -> Result<Vec<ImageViewGuard>> {
    images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            ImageViewGuard::try_new(*image, logical_device, format)
                .map_err(|code| NegotiationError::ImageViewCreationFailed { index, code })
        })
        .collect()
}

impl Drop for ImageViewGuard {
    fn drop(&mut self) {
        debug!("Dropping ImageViewGuard");
        self.logical_device
            .api()
            .destroy_image_view(**self.logical_device, self.view);
    }
}

impl Deref for ImageViewGuard {
    type Target = vk::ImageView;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}
