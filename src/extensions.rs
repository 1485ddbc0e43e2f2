use tracing::debug;

use crate::{api::GraphicsApi, window::WindowSystem, NegotiationError, Result};

/// Returns the instance extensions the window system needs to present.
///
/// The loader's total extension count is only logged, it does not filter the
/// list.
pub fn required_extensions(
    api: &dyn GraphicsApi,
    window: &dyn WindowSystem,
) -> Result<Vec<String>> {
    match api.instance_extension_count() {
        Ok(count) => debug!("{} instance extensions available", count),
        Err(code) => debug!("Could not count instance extensions: {}", code),
    }

    let extension_names = window
        .required_instance_extensions()
        .ok_or(NegotiationError::ExtensionQueryFailed)?;
    debug!(
        "Required instance extension count is {}: {:?}",
        extension_names.len(),
        extension_names
    );
    Ok(extension_names)
}
