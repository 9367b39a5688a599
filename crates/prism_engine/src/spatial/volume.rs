//! Axis-aligned box and sphere volumes

use crate::foundation::math::{utils, Vec3};
use crate::spatial::Frustum;

/// Axis-Aligned Bounding Box for visibility and proximity queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with the given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the AABB
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB intersects a sphere.
    ///
    /// Accumulates, per axis, the squared distance from the sphere center to
    /// the nearest box face when the center lies outside the box on that
    /// axis. The volumes intersect iff the accumulated squared distance is no
    /// greater than the squared radius; touching counts as intersecting.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let mut dmin = 0.0f32;
        for i in 0..3 {
            if sphere.center[i] < self.min[i] {
                dmin += utils::sqr(sphere.center[i] - self.min[i]);
            } else if sphere.center[i] > self.max[i] {
                dmin += utils::sqr(sphere.center[i] - self.max[i]);
            }
        }
        dmin <= utils::sqr(sphere.radius)
    }

    /// Check if this AABB intersects a frustum.
    ///
    /// Tests the box center against each plane with the half-extents
    /// projected onto the plane normal. The box is rejected only when it lies
    /// entirely outside one plane, so the test is conservative: it can report
    /// a box as visible that a precise test would reject, never the reverse.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        let center = self.center();
        let half = self.half_extents();

        for plane in frustum.planes() {
            let d = center.dot(&plane.normal);
            let r = half.dot(&plane.normal.abs());
            if d + r < -plane.dist {
                return false;
            }
        }
        true
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere from center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects another sphere
    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let dist_sq = (other.center - self.center).magnitude_squared();
        dist_sq <= utils::sqr(self.radius + other.radius)
    }

    /// Check if this sphere intersects a frustum.
    ///
    /// Conservative in the same sense as [`Aabb::intersects_frustum`]: the
    /// sphere is rejected only when it lies entirely outside one plane.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        for plane in frustum.planes() {
            if self.center.dot(&plane.normal) + plane.dist < -self.radius {
                return false;
            }
        }
        true
    }
}
