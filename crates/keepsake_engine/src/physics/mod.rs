//! Physics module
//!
//! Ray casting primitives used for pointer picking.

pub mod collision;

pub use collision::{Ray, RayHit, Triangle, Quad};
