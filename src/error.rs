use ash::vk;
use thiserror::Error;

pub type Result<T, E = NegotiationError> = std::result::Result<T, E>;

/// Every way the presentation pipeline can stop. None of these are retried.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("window system could not report the required instance extensions")]
    ExtensionQueryFailed,
    #[error("validation layers not available: {}", missing.join(", "))]
    ValidationLayerUnsupported { missing: Vec<String> },
    #[error("failed to create instance: {0}")]
    InstanceCreationFailed(vk::Result),
    #[error("failed to create window surface: {0}")]
    SurfaceCreationFailed(vk::Result),
    #[error("no physical devices found")]
    NoPhysicalDevices,
    #[error("no suitable physical device found")]
    NoSuitableDevice,
    #[error("failed to create logical device: {0}")]
    DeviceCreationFailed(vk::Result),
    #[error("failed to create swapchain: {0}")]
    SwapchainCreationFailed(vk::Result),
    #[error("failed to create image view for swapchain image {index}: {code}")]
    ImageViewCreationFailed { index: usize, code: vk::Result },
    #[error("query for {query} failed: {code}")]
    QueryFailed { query: &'static str, code: vk::Result },
}

impl NegotiationError {
    /// Adapter for `map_err` on enumeration calls.
    pub(crate) fn query(query: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |code| Self::QueryFailed { query, code }
    }
}
