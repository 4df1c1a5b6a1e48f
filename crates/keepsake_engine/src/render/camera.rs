//! # 3D Camera
//!
//! Perspective camera for the gallery, with the unprojection used to turn a
//! pointer position into a picking ray.
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera looks along `direction` (by default -Z),
//! and NDC follow the usual convention: X+ right, Y+ up, Z in [-1, 1].

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};
use crate::physics::collision::Ray;

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Viewing direction (unit length)
    pub direction: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view angle in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking down -Z
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            direction: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Update the field of view from degrees
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov = utils::deg_to_rad(fov_degrees);
    }

    /// Update the aspect ratio, ignoring degenerate values
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        } else {
            log::warn!("Ignoring invalid camera aspect ratio: {aspect}");
        }
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.direction, self.up)
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined world-to-clip matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point given in NDC
    ///
    /// Unprojects the NDC point on the near and far planes and connects them.
    /// Returns `None` only when the camera matrices are degenerate.
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inv_view_proj = self.view_projection_matrix().try_inverse()?;

        let world_near_h = inv_view_proj * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let world_far_h = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        if world_near_h.w.abs() <= f32::EPSILON || world_far_h.w.abs() <= f32::EPSILON {
            return None;
        }

        let world_near = world_near_h.xyz() / world_near_h.w;
        let world_far = world_far_h.xyz() / world_far_h.w;

        Some(Ray::new(self.position, world_far - world_near))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 10.0), 75.0, 16.0 / 9.0, 0.1, 2000.0)
    }
}
