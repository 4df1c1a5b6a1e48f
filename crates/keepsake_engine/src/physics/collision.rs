//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays, triangles and rectangular quads with the intersection
//! tests needed to pick flat cards under the pointer.

use crate::foundation::math::{Mat4, Point3, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<K> {
    /// The object that was hit
    pub target: K,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    ///
    /// Both faces count as hits. A degenerate triangle (for example one
    /// scaled to zero) is never hit.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        const EPSILON: f32 = 0.000_001;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle (or triangle collapsed)
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t >= 0.0 {
            Some((t, u, v))
        } else {
            None
        }
    }
}

/// Rectangle centred on the origin of its local XY plane
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    corners: [Vec3; 4],
}

impl Quad {
    /// Place a `width` x `height` rectangle with a world matrix
    pub fn from_matrix(width: f32, height: f32, world: &Mat4) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let corner = |x: f32, y: f32| world.transform_point(&Point3::new(x, y, 0.0)).coords;
        Self {
            corners: [corner(-hw, -hh), corner(hw, -hh), corner(hw, hh), corner(-hw, hh)],
        }
    }

    /// World-space corners, counter-clockwise from bottom-left
    pub fn corners(&self) -> &[Vec3; 4] {
        &self.corners
    }

    /// Nearest intersection distance, testing the quad as two triangles
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let [a, b, c, d] = self.corners;
        [Triangle::new(a, b, c), Triangle::new(a, c, d)]
            .iter()
            .filter_map(|triangle| triangle.intersect_ray(ray).map(|(t, _, _)| t))
            .reduce(f32::min)
    }
}

/// Pick the nearest hit; on an exact tie the earlier candidate wins
pub fn nearest_hit<K>(hits: impl IntoIterator<Item = RayHit<K>>) -> Option<RayHit<K>> {
    let mut closest: Option<RayHit<K>> = None;
    for hit in hits {
        match &closest {
            Some(best) if hit.distance >= best.distance => {}
            _ => closest = Some(hit),
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use approx::assert_relative_eq;

    fn forward_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 100.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_triangle_hit_distance() {
        let triangle = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let (t, _, _) = triangle.intersect_ray(&forward_ray()).expect("hit");
        assert_relative_eq!(t, 100.0);
    }

    #[test]
    fn test_back_face_is_hit() {
        let triangle = Triangle::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
        );
        assert!(triangle.intersect_ray(&forward_ray()).is_some());
    }

    #[test]
    fn test_quad_respects_transform() {
        let world = Transform::from_position(Vec3::new(30.0, 0.0, 0.0)).to_matrix();
        let quad = Quad::from_matrix(24.0, 34.0, &world);
        assert!(quad.intersect_ray(&forward_ray()).is_none());

        let shifted = Ray::new(Vec3::new(40.0, 16.0, 100.0), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(quad.intersect_ray(&shifted).expect("inside corner"), 100.0);
    }

    #[test]
    fn test_collapsed_quad_is_never_hit() {
        let world = Transform {
            scale: Vec3::zeros(),
            ..Transform::identity()
        }
        .to_matrix();
        let quad = Quad::from_matrix(24.0, 34.0, &world);
        assert!(quad.intersect_ray(&forward_ray()).is_none());
    }

    #[test]
    fn test_nearest_hit_prefers_first_on_tie() {
        let hit = |target: u32, distance: f32| RayHit { target, distance, point: Vec3::zeros() };
        let best = nearest_hit(vec![hit(1, 50.0), hit(2, 20.0), hit(3, 20.0), hit(4, 70.0)]);
        assert_eq!(best.map(|h| h.target), Some(2));
        assert!(nearest_hit::<u32>(Vec::new()).is_none());
    }
}
