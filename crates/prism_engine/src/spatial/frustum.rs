//! Plane and frustum primitives

use crate::foundation::math::{constants, Mat4, Vec3};

/// Plane in the form `dot(normal, p) + dist = 0`.
///
/// Points with `dot(normal, p) + dist >= 0` are on the inside when the plane
/// belongs to a frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal, or zero for the null plane
    pub normal: Vec3,
    /// Signed distance from the origin along the normal
    pub dist: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::zeros(),
            dist: 0.0,
        }
    }
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and distance.
    ///
    /// Both components are divided by the normal's length. A degenerate
    /// normal collapses to the null plane (zero normal, zero distance)
    /// instead of producing NaNs, so downstream arithmetic stays
    /// well-defined: the null plane classifies every point as inside.
    pub fn new(normal: Vec3, dist: f32) -> Self {
        let mut plane = Self { normal, dist };
        plane.normalize();
        plane
    }

    /// Create a plane from raw components
    pub fn from_components(nx: f32, ny: f32, nz: f32, dist: f32) -> Self {
        Self::new(Vec3::new(nx, ny, nz), dist)
    }

    /// Renormalize in place; see [`Plane::new`] for the degenerate case
    pub fn normalize(&mut self) {
        let len = self.normal.magnitude();
        if len <= constants::EPSILON {
            self.normal = Vec3::zeros();
            self.dist = 0.0;
        } else {
            self.normal /= len;
            self.dist /= len;
        }
    }

    /// Signed distance from the plane to a point
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.dist
    }
}

/// Frustum described by six inward-facing planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    // left, right, top, bottom, near, far
    planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes ordered left, right, top, bottom,
    /// near, far
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract the six planes from a combined `projection * view` matrix
    /// using the Gribb-Hartmann method. The resulting planes are normalized.
    pub fn from_view_projection(matrix: &Mat4) -> Self {
        let row = |r: usize| {
            (
                Vec3::new(matrix[(r, 0)], matrix[(r, 1)], matrix[(r, 2)]),
                matrix[(r, 3)],
            )
        };
        let (r0, d0) = row(0);
        let (r1, d1) = row(1);
        let (r2, d2) = row(2);
        let (r3, d3) = row(3);

        Self::new([
            Plane::new(r3 + r0, d3 + d0), // left
            Plane::new(r3 - r0, d3 - d0), // right
            Plane::new(r3 - r1, d3 - d1), // top
            Plane::new(r3 + r1, d3 + d1), // bottom
            Plane::new(r3 + r2, d3 + d2), // near
            Plane::new(r3 - r2, d3 - d2), // far
        ])
    }

    /// The six planes, ordered left, right, top, bottom, near, far
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Check whether a point lies inside or on every plane
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalization_scales_normal_and_distance() {
        let plane = Plane::new(Vec3::new(0.0, 3.0, 0.0), 6.0);
        assert_relative_eq!(plane.normal.y, 1.0);
        assert_relative_eq!(plane.dist, 2.0);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut plane = Plane::new(Vec3::new(0.6, 0.8, 0.0), 1.5);
        let before = plane;
        plane.normalize();
        assert_relative_eq!(plane.normal.x, before.normal.x, epsilon = 1e-6);
        assert_relative_eq!(plane.normal.y, before.normal.y, epsilon = 1e-6);
        assert_relative_eq!(plane.dist, before.dist, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_normal_collapses_to_null_plane() {
        let plane = Plane::new(Vec3::new(1e-7, 0.0, 0.0), 5.0);
        assert_eq!(plane.normal, Vec3::zeros());
        assert_eq!(plane.dist, 0.0);
        // The null plane classifies everything as inside.
        assert_eq!(plane.signed_distance(Vec3::new(100.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_signed_distance() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), -2.0);
        assert_relative_eq!(plane.signed_distance(Vec3::new(0.0, 5.0, 0.0)), 3.0);
        assert_relative_eq!(plane.signed_distance(Vec3::new(0.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn test_extracted_frustum_classifies_points() {
        let proj = Mat4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let view = Mat4::look_at_rh(
            &nalgebra::Point3::new(0.0, 0.0, 0.0),
            &nalgebra::Point3::new(0.0, 0.0, -1.0),
            &Vec3::y(),
        );
        let frustum = Frustum::from_view_projection(&(proj * view));

        // Straight ahead, between the clip planes.
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        // Behind the camera.
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        // Beyond the far plane.
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -200.0)));
        // Outside the 90 degree horizontal field of view.
        assert!(!frustum.contains_point(Vec3::new(30.0, 0.0, -10.0)));
    }
}
