use std::{ops::Deref, rc::Rc};

use ash::{
    extensions::ext::DebugUtils,
    vk::{self, API_VERSION_1_0},
};
use tracing::debug;

use crate::{
    api::{GraphicsApi, InstanceRequest},
    config::PipelineConfig,
    NegotiationError, Result,
};

const API_VERSION: u32 = API_VERSION_1_0;

/// RAII for Instance
pub struct InstanceGuard {
    api: Rc<dyn GraphicsApi>,
    handle: vk::Instance,
}

impl InstanceGuard {
    /// Creates the instance with the window system's extensions and, when the
    /// config asks for validation, the validation layers plus debug utils.
    ///
    /// Requested layers are checked against the available ones first, and a
    /// missing layer fails before the driver is asked for an instance.
    pub fn try_new(
        api: &Rc<dyn GraphicsApi>,
        config: &PipelineConfig,
        extensions: Vec<String>,
    ) -> Result<Rc<Self>> {
        let mut extension_names = extensions;
        let mut layer_names = vec![];
        if let Some(validation_layers) = &config.validation_layers {
            check_validation_layer_support(api.as_ref(), validation_layers)?;
            layer_names = validation_layers.clone();
            extension_names.push(DebugUtils::name().to_string_lossy().into_owned());
        }
        debug!("Instance extension names: {:?}", extension_names);
        debug!("Layers to enable: {}", layer_names.join(", "));

        let request = InstanceRequest {
            application_name: config.application_name.clone(),
            application_version: config.application_version,
            engine_name: config.engine_name.clone(),
            engine_version: config.engine_version,
            api_version: API_VERSION,
            extensions: extension_names,
            layers: layer_names,
        };
        let handle = api
            .create_instance(&request)
            .map_err(NegotiationError::InstanceCreationFailed)?;

        Ok(Rc::new(Self {
            api: Rc::clone(api),
            handle,
        }))
    }

    pub fn api(&self) -> &dyn GraphicsApi {
        self.api.as_ref()
    }
}

/// Fails with the names of every requested layer the loader does not list.
/// Names must match exactly.
pub fn check_validation_layer_support(api: &dyn GraphicsApi, requested: &[String]) -> Result<()> {
    let available = api
        .available_layers()
        .map_err(NegotiationError::query("instance layers"))?;
    debug!("{} available layers: {:?}", available.len(), available);

    let missing = requested
        .iter()
        .filter(|layer| !available.contains(layer))
        .cloned()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(NegotiationError::ValidationLayerUnsupported { missing });
    }
    Ok(())
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        debug!("Dropping InstanceGuard");
        self.api.destroy_instance(self.handle);
    }
}

impl Deref for InstanceGuard {
    type Target = vk::Instance;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
