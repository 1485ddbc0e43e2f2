use std::rc::Rc;

use anyhow::Result;
use rusty_present::{logging, AshApi, GlfwWindow, GraphicsApi, PipelineConfig, Presentation};
use tracing::info;

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const WINDOW_TITLE: &str = "Hello, Swapchain";

fn main() -> Result<()> {
    logging::init()?;

    // the window must outlive every vulkan object presenting to it
    let mut window = GlfwWindow::try_new(WINDOW_WIDTH, WINDOW_HEIGHT, WINDOW_TITLE)?;
    let api: Rc<dyn GraphicsApi> = Rc::new(AshApi::linked());
    let config = PipelineConfig::default();

    let presentation = Presentation::establish(&api, &window, &config)?;
    info!(
        "Presenting to {} with {:?} in {:?}, {} image views",
        presentation.physical_device().name,
        presentation.surface_format().format,
        presentation.swapchain().present_mode(),
        presentation.image_views().len()
    );

    window.run_event_loop();

    drop(presentation);
    Ok(())
}
