use std::{mem::MaybeUninit, ptr};

use anyhow::{anyhow, ensure, Result};
use ash::{prelude::VkResult, vk};
use glfw::{
    fail_on_errors, Action, ClientApiHint, Glfw, GlfwReceiver, Key, PWindow, WindowEvent,
    WindowHint, WindowMode,
};
use tracing::debug;

/// The windowing collaborator the presentation pipeline needs.
pub trait WindowSystem {
    /// Instance extensions needed to present to this window, or `None` if the
    /// window system cannot present through Vulkan.
    fn required_instance_extensions(&self) -> Option<Vec<String>>;
    fn create_surface(&self, instance: vk::Instance) -> VkResult<vk::SurfaceKHR>;
    /// Size of the drawable area in pixels, which differs from the window
    /// size on high DPI displays.
    fn drawable_size(&self) -> (u32, u32);
}

/// A GLFW window created without a client API so Vulkan can present to it.
pub struct GlfwWindow {
    glfw: Glfw,
    window: PWindow,
    receiver: GlfwReceiver<(f64, WindowEvent)>,
}

impl GlfwWindow {
    pub fn try_new(width: u32, height: u32, title: &str) -> Result<Self> {
        let mut glfw = glfw::init(fail_on_errors!())?;
        ensure!(glfw.vulkan_supported(), "GLFW did not find a Vulkan loader");
        glfw.window_hint(WindowHint::ClientApi(ClientApiHint::NoApi));
        glfw.window_hint(WindowHint::Resizable(false));

        let (mut window, receiver) = glfw
            .create_window(width, height, title, WindowMode::Windowed)
            .ok_or(anyhow!("Failed to create GLFW window"))?;
        window.set_key_polling(true);

        Ok(Self {
            glfw,
            window,
            receiver,
        })
    }

    pub fn run_event_loop(&mut self) {
        while !self.window.should_close() {
            self.glfw.wait_events();
            for (_, event) in glfw::flush_messages(&self.receiver) {
                debug!("{:?}", event);
                if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                    self.window.set_should_close(true);
                }
            }
        }
    }
}

impl WindowSystem for GlfwWindow {
    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.glfw.get_required_instance_extensions()
    }

    fn create_surface(&self, instance: vk::Instance) -> VkResult<vk::SurfaceKHR> {
        let mut surface = MaybeUninit::<vk::SurfaceKHR>::zeroed();
        self.window
            .create_window_surface(instance, ptr::null(), surface.as_mut_ptr())
            .result()?;
        surface_from_raw(unsafe { surface.assume_init() })
    }

    fn drawable_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (
            u32::try_from(width).unwrap_or_default(),
            u32::try_from(height).unwrap_or_default(),
        )
    }
}

/// The one place a handle written by the window system becomes a surface the
/// graphics API will accept.
fn surface_from_raw(surface: vk::SurfaceKHR) -> VkResult<vk::SurfaceKHR> {
    if surface == vk::SurfaceKHR::null() {
        return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
    }
    Ok(surface)
}
