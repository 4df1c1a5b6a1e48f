//! 3D interaction
//!
//! Pointer-driven hover and focus for the gallery cards, plus their ambient
//! floating motion.

pub mod engine;
pub mod tutorial;

pub use engine::{FocusState, InteractionEngine};
pub use tutorial::Tutorial;

use crate::animation::Driver;
use crate::events::{PresentationEvent, Scheduler};
use crate::gallery::{ResourceBundle, ViewedSet};
use crate::render::ResourceRegistry;
use crate::stage::Stage;

/// Everything an interaction call may touch, borrowed for that call only
pub struct InteractionContext<'a> {
    /// The live gallery
    pub bundle: &'a mut ResourceBundle,
    /// Registry the gallery's GPU allocations live in
    pub resources: &'a mut ResourceRegistry,
    /// Animation driver
    pub driver: &'a mut Driver,
    /// Timer queue
    pub scheduler: &'a mut Scheduler<PresentationEvent>,
    /// Session-wide found images
    pub viewed: &'a mut ViewedSet,
    /// Stage hooks
    pub stage: &'a mut dyn Stage,
}
