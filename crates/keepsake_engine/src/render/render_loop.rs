//! Render loop handle
//!
//! The host's display-refresh callback runs every frame; the loop handle
//! decides whether that frame renders. Clearing the running flag is how a
//! scene stops its loop from rescheduling itself.

/// Running flag plus frame accounting for one render surface
#[derive(Debug, Clone, Default)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    /// Create a stopped loop
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or resume) rendering
    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Render loop started after {} frames", self.frames);
        }
        self.running = true;
    }

    /// Stop rendering; the next tick returns false
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Render loop stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    /// Whether frames are being rendered
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Called once per display refresh; true if this frame should render
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.frames += 1;
        }
        self.running
    }
}
