//! Hooks into the presentation's stage
//!
//! Everything outside the core state machines (overlay panels, counters,
//! cursor, audio cues, letter and finale effects) is reached through
//! [`Stage`]. Every hook defaults to doing nothing, so a stage implements
//! only what it actually has.

use crate::scene::SceneId;

/// Pointer cursor shown over the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Regular arrow
    #[default]
    Default,
    /// Hand over an interactive card
    Pointer,
}

/// External collaborators driven by the presentation
pub trait Stage {
    /// The loading screen is done and the main presentation shows
    fn loading_finished(&mut self) {}

    /// Loading progress changed
    fn loading_progress(&mut self, _loaded: usize, _total: usize) {}

    /// A scene became visible
    fn scene_entered(&mut self, _scene: SceneId) {}

    /// A scene stopped being visible
    fn scene_left(&mut self, _scene: SceneId) {}

    /// Put the letter back in its sealed envelope
    fn reset_letter_state(&mut self) {}

    /// Change the pointer cursor
    fn set_cursor(&mut self, _cursor: Cursor) {}

    /// Show or hide the control that closes a focused card
    fn set_close_affordance(&mut self, _visible: bool) {}

    /// Show the gallery's how-to-interact hint
    fn show_tutorial(&mut self) {}

    /// Hide the gallery's how-to-interact hint
    fn dismiss_tutorial(&mut self) {}

    /// Update the "memories found" counter
    fn update_memory_counter(&mut self, _found: usize, _total: usize) {}

    /// Reveal the control that moves on to `next`
    fn reveal_next_scene_affordance(&mut self, _next: SceneId) {}

    /// Start the finale sequence (candles, wishes)
    fn start_finale(&mut self) {}
}

/// Stage without any hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStage;

impl Stage for NullStage {}
