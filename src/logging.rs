use std::ffi::CStr;

use anyhow::Result;
use ash::vk::{
    Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
    DebugUtilsMessengerCallbackDataEXT,
};
use simple_logger::{set_up_color_terminal, SimpleLogger};
use tracing::{event, Level};

pub fn init() -> Result<()> {
    set_up_color_terminal();
    let logger = SimpleLogger::new();
    logger.init()?;
    Ok(())
}

/// Forwards validation layer messages to tracing at the matching level.
pub(crate) unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return ash::vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message)
        .to_string_lossy()
        .into_owned();
    let ty = format!("{:?}", message_type).to_lowercase();

    match message_severity {
        DebugUtilsMessageSeverityFlagsEXT::INFO => {
            event!(Level::INFO, message = message, ty = ty)
        }
        DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            event!(Level::WARN, message = message, ty = ty)
        }
        DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            event!(Level::ERROR, message = message, ty = ty)
        }
        _ => event!(Level::TRACE, message = message, ty = ty),
    }
    // dont skip driver
    ash::vk::FALSE
}
