//! Host events and application-level errors

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::gallery::GalleryError;
use crate::input::KeyCode;
use crate::scene::{SceneId, TransitionRejected};

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Gallery resources could not be created
    #[error("Gallery error: {0}")]
    Gallery(#[from] GalleryError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// A scene change was refused
    #[error("Transition refused: {0}")]
    Transition(#[from] TransitionRejected),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Events delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Pointer movement in window pixels
    PointerMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },

    /// Primary pointer button went down
    PointerPressed,

    /// Mouse wheel turned; negative values scroll towards the content
    Wheel {
        /// Wheel delta in host units
        delta: f64,
    },

    /// Primary pointer button went up
    PointerReleased,

    /// Key was pressed
    KeyPressed(KeyCode),

    /// The close control of a focused card was activated
    CloseRequested,

    /// Window was resized
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },

    /// A navigation control asked for another scene
    NavigateTo(SceneId),
}
