//! Scene management
//!
//! The scene registry, the retained scene graph used by 3D scenes and the
//! transition controller that moves between scenes.

pub mod registry;
pub mod graph;
pub mod transition;

pub use graph::{Fog, Node, NodeKind, NodeTransform, SceneGraph};
pub use registry::{Scene, SceneId, SceneRegistry, UnknownScene};
pub use transition::{
    OverlayAccess, SceneHost, SceneTransitionController, TransitionPhase, TransitionRejected,
    TransitionStyle,
};
