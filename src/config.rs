use ash::{extensions::khr::Swapchain, vk::make_api_version};

const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

#[cfg(feature = "enable_validations")]
const ENABLE_VALIDATIONS: bool = true;
#[cfg(not(feature = "enable_validations"))]
const ENABLE_VALIDATIONS: bool = false;

/// Inputs to instance creation and device selection.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    /// `None` disables validation entirely.
    pub validation_layers: Option<Vec<String>>,
    /// Device extensions every candidate must expose. Enabled verbatim on
    /// the logical device.
    pub device_extensions: Vec<String>,
}

impl PipelineConfig {
    pub fn with_validation_layers(mut self, layers: Vec<String>) -> Self {
        self.validation_layers = Some(layers);
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validation_layers = None;
        self
    }

    pub fn with_device_extensions(mut self, extensions: Vec<String>) -> Self {
        self.device_extensions = extensions;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let version_major = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default();
        let version_minor = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default();
        let version_patch = env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or_default();
        let app_version = make_api_version(0, version_major, version_minor, version_patch);

        Self {
            application_name: env!("CARGO_PKG_NAME").to_owned(),
            application_version: app_version,
            engine_name: "No Engine".to_owned(),
            engine_version: make_api_version(0, 1, 0, 0),
            validation_layers: ENABLE_VALIDATIONS.then(|| vec![VALIDATION_LAYER.to_owned()]),
            device_extensions: vec![Swapchain::name().to_string_lossy().into_owned()],
        }
    }
}
