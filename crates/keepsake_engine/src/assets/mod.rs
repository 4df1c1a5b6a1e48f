//! Asset loading and the loading-screen progress gate

pub mod loader;
pub mod progress_gate;

pub use loader::{AssetInfo, AssetSource, ImageFileSource, LoadProgress, LoadingManager};
pub use progress_gate::{GateReason, ProgressGate};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The file exists but could not be decoded
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// Path as registered
        path: String,
        /// Decoder failure
        #[source]
        source: image::ImageError,
    },

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
