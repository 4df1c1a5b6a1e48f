//! Render surfaces
//!
//! A render surface is the drawing target a scene renders into (a canvas, a
//! swapchain). The presentation only needs to create one per gallery
//! bundle, resize it, draw frames and finally dispose it, so that is the
//! whole trait. [`HeadlessSurface`] implements it without a GPU, which is
//! what scripted runs and tests use.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::camera::Camera;
use crate::scene::graph::{NodeKind, SceneGraph};

/// Size of the drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for an empty viewport
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Render surface errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No surface could be created
    #[error("Render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Drawing into a surface that was already disposed
    #[error("Render surface is detached")]
    Detached,
}

/// What one frame drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Visible meshes
    pub meshes: usize,
    /// Visible point clouds
    pub point_clouds: usize,
    /// Lights in the scene
    pub lights: usize,
}

impl FrameStats {
    /// Count what a scene graph would draw
    pub fn collect(graph: &SceneGraph) -> Self {
        let mut stats = Self::default();
        for id in graph.traverse() {
            let Some(node) = graph.node(id) else { continue };
            if !node.visible {
                continue;
            }
            match node.kind {
                NodeKind::Mesh { .. } => stats.meshes += 1,
                NodeKind::Points { .. } => stats.point_clouds += 1,
                NodeKind::AmbientLight { .. } | NodeKind::PointLight { .. } => stats.lights += 1,
                NodeKind::Group => {}
            }
        }
        stats
    }
}

/// Drawing target owned by a scene's resource bundle
pub trait RenderSurface {
    /// Current size
    fn viewport(&self) -> Viewport;

    /// Resize the drawing buffer
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame
    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<FrameStats, RenderError>;

    /// Release the drawing context and detach the surface from the page
    fn dispose(&mut self);

    /// Whether the surface is still attached
    fn is_attached(&self) -> bool;
}

/// Creates render surfaces on demand
pub trait SurfaceFactory {
    /// Create a surface of the given size
    fn create_surface(&mut self, viewport: Viewport) -> Result<Box<dyn RenderSurface>, RenderError>;
}

/// Shared bookkeeping of every headless surface a factory created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceLog {
    /// Surfaces created
    pub created: usize,
    /// Surfaces disposed
    pub disposed: usize,
    /// Frames drawn across all surfaces
    pub frames: u64,
    /// Every resize, in order
    pub resizes: Vec<Viewport>,
    /// Stats of the most recent frame
    pub last_frame: Option<FrameStats>,
}

impl SurfaceLog {
    /// Surfaces created and not yet disposed
    pub fn live(&self) -> usize {
        self.created - self.disposed
    }
}

/// GPU-less render surface
#[derive(Debug)]
pub struct HeadlessSurface {
    viewport: Viewport,
    attached: bool,
    log: Rc<RefCell<SurfaceLog>>,
}

impl HeadlessSurface {
    fn new(viewport: Viewport, log: Rc<RefCell<SurfaceLog>>) -> Self {
        log.borrow_mut().created += 1;
        Self {
            viewport,
            attached: true,
            log,
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn render(&mut self, graph: &SceneGraph, _camera: &Camera) -> Result<FrameStats, RenderError> {
        if !self.attached {
            return Err(RenderError::Detached);
        }
        let stats = FrameStats::collect(graph);
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_frame = Some(stats);
        Ok(stats)
    }

    fn dispose(&mut self) {
        if self.attached {
            self.attached = false;
            self.log.borrow_mut().disposed += 1;
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Factory for [`HeadlessSurface`]s sharing one [`SurfaceLog`]
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurfaceFactory {
    log: Rc<RefCell<SurfaceLog>>,
}

impl HeadlessSurfaceFactory {
    /// Create a factory with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the shared log
    pub fn log(&self) -> SurfaceLog {
        self.log.borrow().clone()
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create_surface(&mut self, viewport: Viewport) -> Result<Box<dyn RenderSurface>, RenderError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(RenderError::SurfaceUnavailable(format!(
                "empty viewport {}x{}",
                viewport.width, viewport.height
            )));
        }
        Ok(Box::new(HeadlessSurface::new(viewport, Rc::clone(&self.log))))
    }
}
