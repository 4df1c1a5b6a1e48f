//! Input handling
//!
//! Pointer tracking for picking and drag gestures, plus the few keys the
//! presentation reacts to.

pub mod picking;

pub use picking::PointerState;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key
    Escape,
    /// Enter key
    Enter,
    /// Space key
    Space,
}
