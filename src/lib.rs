pub mod api;
pub mod ash_api;
pub mod config;
mod error;
pub mod extensions;
pub mod image_view;
pub mod instance;
pub mod logging;
pub mod logical_device;
pub mod physical_device;
pub mod presentation;
pub mod queue_families;
pub mod surface;
pub mod swapchain;
pub mod window;

#[cfg(test)]
mod testing;

pub use api::GraphicsApi;
pub use ash_api::AshApi;
pub use config::PipelineConfig;
pub use error::{NegotiationError, Result};
pub use presentation::Presentation;
pub use window::{GlfwWindow, WindowSystem};
