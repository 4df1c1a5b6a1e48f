//! # Keepsake Engine
//!
//! Scene lifecycle and 3D interaction engine for scripted greeting
//! presentations.
//!
//! ## Features
//!
//! - **Scene Transitions**: Shutter cover/reveal and cross-fades between
//!   mutually exclusive scenes
//! - **Resource Lifecycle**: Allocation and complete release of the 3D
//!   gallery on scene entry and exit
//! - **3D Interaction**: Ray picking, hover, focus/zoom, floating motion and
//!   parallax over a retained scene graph
//! - **Loading Gate**: One-shot loading completion with a fail-safe timeout
//! - **Headless**: Every subsystem runs without a GPU, driven by frame deltas
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keepsake_engine::prelude::*;
//!
//! let mut presentation = Presentation::new(
//!     PresentationConfig::default(),
//!     Viewport::default(),
//!     Box::new(HeadlessSurfaceFactory::new()),
//!     Box::new(ImageFileSource::new(".")),
//!     NullStage,
//! );
//!
//! presentation.update(1.0 / 60.0);
//! presentation.handle_event(AppEvent::NavigateTo(SceneId::Memory));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared configuration
pub mod core;

pub mod foundation;
pub mod config;
pub mod events;
pub mod animation;
pub mod assets;
pub mod render;
pub mod physics;
pub mod input;
pub mod scene;
pub mod gallery;
pub mod interaction;
pub mod stage;

mod application;
mod presentation;

pub use application::{AppError, AppEvent};
pub use presentation::Presentation;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, AppEvent, Presentation,
        animation::{AnimationDriver, Easing, Timeline, TweenSpec, Tweens},
        assets::{AssetSource, ImageFileSource, LoadingManager, ProgressGate},
        config::Config,
        core::config::{GalleryConfig, InteractionConfig, LoadingConfig, PresentationConfig, TransitionConfig},
        foundation::math::{Vec2, Vec3, Mat4, Transform},
        gallery::{GalleryLifecycle, ViewedSet},
        input::KeyCode,
        interaction::{InteractionEngine, Tutorial},
        render::{HeadlessSurfaceFactory, SurfaceFactory, Viewport},
        scene::{SceneId, SceneRegistry, SceneTransitionController},
        stage::{Cursor, NullStage, Stage},
    };
}
