use ash::{prelude::VkResult, vk};

/// Everything needed to create an instance.
#[derive(Debug, Clone)]
pub struct InstanceRequest {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    pub api_version: u32,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

/// One queue family to create queues from, with a priority per queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueRequest {
    pub family_index: u32,
    pub priorities: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub queues: Vec<QueueRequest>,
    pub extensions: Vec<String>,
    pub features: vk::PhysicalDeviceFeatures,
}

#[derive(Debug, Clone)]
pub struct SwapchainRequest {
    pub surface: vk::SurfaceKHR,
    pub min_image_count: u32,
    pub surface_format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub image_array_layers: u32,
    pub image_usage: vk::ImageUsageFlags,
    pub sharing_mode: vk::SharingMode,
    /// Empty unless `sharing_mode` is concurrent.
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
    pub present_mode: vk::PresentModeKHR,
    pub clipped: bool,
}

/// The native primitives the presentation pipeline is built from.
///
/// Handles are the typed `ash::vk` handles. Implementations report a handle
/// they did not create with `vk::Result::ERROR_UNKNOWN`. Destruction is
/// infallible and must be called in reverse creation order.
pub trait GraphicsApi {
    /// Number of instance extensions the loader reports.
    fn instance_extension_count(&self) -> VkResult<usize>;
    fn available_layers(&self) -> VkResult<Vec<String>>;
    fn create_instance(&self, request: &InstanceRequest) -> VkResult<vk::Instance>;
    fn destroy_instance(&self, instance: vk::Instance);
    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR);

    fn enumerate_physical_devices(&self, instance: vk::Instance)
        -> VkResult<Vec<vk::PhysicalDevice>>;
    fn physical_device_properties(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties>;
    fn physical_device_features(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceFeatures>;
    fn queue_family_properties(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>>;
    fn device_extensions(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<String>>;

    fn surface_support(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;
    fn surface_capabilities(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    fn create_device(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        request: &DeviceRequest,
    ) -> VkResult<vk::Device>;
    fn device_queue(
        &self,
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue>;
    fn destroy_device(&self, device: vk::Device);

    fn create_swapchain(
        &self,
        device: vk::Device,
        request: &SwapchainRequest,
    ) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>>;
    fn destroy_swapchain(&self, device: vk::Device, swapchain: vk::SwapchainKHR);

    fn create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView);
}
