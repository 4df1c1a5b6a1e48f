//! # Core Module
//!
//! Shared configuration for every presentation subsystem.
//!
//! ## Organization
//!
//! - **Config**: Tunables for loading, scene transitions, the gallery and
//!   pointer interaction

pub mod config;

pub use config::{
    PresentationConfig,
    LoadingConfig,
    TransitionConfig,
    GalleryConfig,
    DeviceTier,
    InteractionConfig,
    Config,
    ConfigError,
};
