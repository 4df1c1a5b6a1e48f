//! Animation driver
//!
//! Property tweens, easing curves and sequencing helpers. The presentation
//! only talks to [`AnimationDriver`]; [`TweenEngine`] is the frame-stepped
//! implementation it is normally paired with.

pub mod easing;
pub mod tween;
pub mod timeline;

pub use easing::Easing;
pub use timeline::{Placement, Stagger, StaggerFrom, Timeline};
pub use tween::{
    AnimationDriver, Channels, Overwrite, Property, PropertyAccess, TweenEngine, TweenHandle,
    TweenSpec,
};

use crate::foundation::collections::{ItemKey, NodeId};
use crate::scene::SceneId;

/// Everything a presentation animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTarget {
    /// A gallery card (transform, opacity, glow)
    Item(ItemKey),
    /// A decoration node in the gallery scene graph
    Node(NodeId),
    /// The gallery camera
    Camera,
    /// The full-screen shutter used by scene transitions
    Shutter,
    /// A scene's presentation layer (opacity)
    SceneLayer(SceneId),
}

impl AnimTarget {
    /// Whether the target lives inside the gallery resource bundle
    pub fn is_gallery_owned(&self) -> bool {
        matches!(self, Self::Item(_) | Self::Node(_) | Self::Camera)
    }
}

/// Completion notifications routed back to the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// The shutter fully covers the screen
    ShutterCovered,
    /// The shutter left the screen
    ShutterRevealed,
    /// The outgoing layer of a cross-fade is transparent
    LayerFadedOut,
    /// The incoming layer of a cross-fade is opaque
    LayerFadedIn,
    /// The gallery camera finished its entry fly-in
    GalleryEntered,
    /// A card reached its focus pose
    FocusSettled(ItemKey),
    /// A card is back at its place in the cloud
    ReturnSettled(ItemKey),
}

/// Driver instantiation used by the presentation
pub type Tweens = TweenEngine<AnimTarget, Cue>;

/// Object-safe driver interface used by scene code
pub type Driver = dyn AnimationDriver<AnimTarget, Cue>;
