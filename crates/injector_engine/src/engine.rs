//! Core engine implementation

use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::render::vulkan::{PresentStatus, VulkanContext, VulkanError};
use crate::render::window::{Window, WindowError};
use std::time::Duration;
use thiserror::Error;

/// How long to sleep on window events while the swapchain is out of date
const OUT_OF_DATE_BACKOFF: Duration = Duration::from_millis(100);

/// Tracks runs of frames that were not presented cleanly
///
/// Reports only changes of status, so a long run of identical outcomes
/// yields a single warning.
#[derive(Debug, Default)]
struct FrameHealth {
    last_problem: Option<PresentStatus>,
    degraded_frames: u64,
}

impl FrameHealth {
    /// Record one frame; returns true when the status differs from the previous frame
    fn record(&mut self, status: PresentStatus) -> bool {
        let problem = (status != PresentStatus::Presented).then_some(status);
        if problem.is_some() {
            self.degraded_frames += 1;
        }
        let changed = problem != self.last_problem;
        self.last_problem = problem;
        changed
    }
}

/// Main engine struct
///
/// Owns the window and the Vulkan context drawing into it, and runs the
/// frame loop until the window is closed.
pub struct Engine {
    // Vulkan objects go before the window that backs their surface
    context: VulkanContext,
    window: Window,
    health: FrameHealth,
}

impl Engine {
    /// Open the window and bring up Vulkan on it
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        let window = Window::new(&config.window)?;
        let context = VulkanContext::new(config, &window)?;

        Ok(Self {
            context,
            window,
            health: FrameHealth::default(),
        })
    }

    /// Poll events and draw until the window closes
    ///
    /// Returns the first fatal frame error. Swapchain recreation is not
    /// implemented, so out-of-date or suboptimal frames are logged once per
    /// change of status and the loop keeps going. While the swapchain is out
    /// of date the loop waits on window events instead of spinning.
    pub fn run(&mut self) -> Result<(), EngineError> {
        log::info!("Starting main loop...");

        while !self.window.should_close() {
            self.window.poll_events();

            let status = self.context.draw_frame()?;
            if self.health.record(status) {
                match status {
                    PresentStatus::Presented => log::info!("Frames presenting cleanly again"),
                    other => log::warn!("Frame not presented cleanly: {other:?}"),
                }
            }

            if status == PresentStatus::OutOfDate {
                self.window.wait_events(OUT_OF_DATE_BACKOFF);
            }
        }

        log::info!(
            "Main loop exited after {} presented frame(s), {} with warnings",
            self.context.stack().renderer().scheduler().frames_presented(),
            self.health.degraded_frames
        );
        Ok(())
    }

    /// Vulkan side of the engine
    pub fn context(&self) -> &VulkanContext {
        &self.context
    }

    /// The window being drawn into
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("Shutting down engine");
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Window or GLFW failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan bring-up or frame failure
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
