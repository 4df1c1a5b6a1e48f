//! Rendering module
//!
//! Camera, GPU resource bookkeeping, render surfaces and the per-surface
//! render loop. Actual drawing is delegated to a [`RenderSurface`]
//! implementation; the engine itself never talks to a graphics API.

pub mod camera;
pub mod resources;
pub mod surface;
pub mod render_loop;

pub use camera::Camera;
pub use render_loop::RenderLoop;
pub use resources::{
    Blending, DisposalReport, Geometry, Material, ResourceRegistry, Texture, TextureSlot,
    TextureSource,
};
pub use surface::{
    FrameStats, HeadlessSurface, HeadlessSurfaceFactory, RenderError, RenderSurface,
    SurfaceFactory, SurfaceLog, Viewport,
};
