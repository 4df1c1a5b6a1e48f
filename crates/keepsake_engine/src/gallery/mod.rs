//! The 3D memory gallery
//!
//! Cards floating in a star field. [`GalleryLifecycle`] creates and frees the
//! [`ResourceBundle`]; the interaction engine animates what is inside it.

pub mod item;
pub mod bundle;
pub mod lifecycle;
pub mod viewed;

pub use bundle::ResourceBundle;
pub use item::{FloatPhysics, GalleryItem, HoverRestore};
pub use lifecycle::{GalleryError, GalleryLifecycle};
pub use viewed::ViewedSet;
