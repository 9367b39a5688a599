//! Cascaded shadow map fitting
//!
//! Splits the camera frustum into depth slices on a logarithmic curve and
//! bounds each slice with a sphere, then derives an orthographic projection
//! and a light-aligned view matrix per cascade. Sphere bounds keep the
//! cascade footprint rotation-invariant, so shadow texel assignment does not
//! swim as the camera turns.
//!
//! Two fitting strategies are provided. The forward fit is cheap and places
//! spheres along the view ray with a 20% depth overlap between neighbors so
//! a fragment near a split boundary is always covered by one of the two
//! cascades. The corner fit reconstructs each slice's eight corners through
//! the inverse view-projection and bounds exactly what the camera sees; it
//! tracks the real frustum shape much more tightly at wide aspect ratios.

use crate::foundation::math::{constants, Mat4, Point3, Vec3, Vector4};
use crate::scene::CameraState;
use crate::spatial::Sphere;

/// Per-cascade bounding spheres and shadow matrices for one directional
/// light
#[derive(Debug, Clone)]
pub struct ShadowCascades {
    count: usize,
    spheres: Vec<Sphere>,
    light_dir: Vec3,
    z_far: f32,
}

impl ShadowCascades {
    /// Create a fitter with at least one cascade
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
            spheres: Vec::new(),
            light_dir: Vec3::y(),
            z_far: 1.0,
        }
    }

    /// Number of cascades
    pub fn cascade_count(&self) -> usize {
        self.count
    }

    /// Far depth of each split on a logarithmic curve:
    /// `near * (far / near)^((i + 1) / count)`. Strictly increasing, with
    /// the last split exactly at the far plane.
    pub fn split_depths(z_near: f32, z_far: f32, count: usize) -> Vec<f32> {
        let count = count.max(1);
        (0..count)
            .map(|i| z_near * (z_far / z_near).powf((i + 1) as f32 / count as f32))
            .collect()
    }

    /// Fit spheres along the camera's forward ray.
    ///
    /// Cascade `i` covers depths `[last, split_i]` where `last` starts at
    /// the near plane and then trails the previous split by 20%, giving
    /// neighboring cascades an overlap band.
    pub fn fit_forward(&mut self, camera: &CameraState, light_dir: Vec3) {
        self.set_light(light_dir, camera.z_far);
        self.spheres.clear();

        let mut last_depth = camera.z_near;
        for i in 0..self.count {
            let max_depth =
                camera.z_near * (camera.z_far / camera.z_near).powf((i + 1) as f32 / self.count as f32);
            self.spheres.push(Sphere {
                center: camera.position + camera.forward * (0.5 * (last_depth + max_depth)),
                radius: max_depth - last_depth,
            });
            last_depth = 0.8 * max_depth;
        }
    }

    /// Fit spheres around each slice's reconstructed frustum corners.
    ///
    /// For cascade `i` the clip-space depth window is scaled by
    /// `((i + 1) / count)^0.1 * 0.998`; the eight corners of that window are
    /// pushed through the inverse view-projection (with perspective divide)
    /// and bounded by the sphere centered at their min/max midpoint with a
    /// half-diagonal radius. A non-invertible camera leaves the previous fit
    /// in place.
    pub fn fit_corners(&mut self, camera: &CameraState, light_dir: Vec3) {
        let Some(inverse) = (camera.projection * camera.view).try_inverse() else {
            return;
        };
        self.set_light(light_dir, camera.z_far);
        self.spheres.clear();

        for i in 0..self.count {
            let z_limit = ((i + 1) as f32 / self.count as f32).powf(0.1) * 0.998;
            let mut mins = Vec3::repeat(f32::INFINITY);
            let mut maxes = Vec3::repeat(f32::NEG_INFINITY);
            for &x in &[-1.0f32, 1.0] {
                for &y in &[-1.0f32, 1.0] {
                    for &z in &[-z_limit, z_limit] {
                        let corner = inverse * Vector4::new(x, y, z, 1.0);
                        let corner = corner.xyz() / corner.w;
                        mins = mins.inf(&corner);
                        maxes = maxes.sup(&corner);
                    }
                }
            }
            self.spheres.push(Sphere {
                center: (mins + maxes) * 0.5,
                radius: (maxes - mins).magnitude() * 0.5,
            });
        }
    }

    /// Bounding sphere of a fitted cascade
    pub fn sphere(&self, index: usize) -> Option<Sphere> {
        self.spheres.get(index).copied()
    }

    /// Orthographic projection covering a cascade's sphere, with a depth
    /// range of `[0, 2 * far]` so casters well behind the slice still land
    /// in the map
    pub fn projection_matrix(&self, index: usize) -> Mat4 {
        let radius = self
            .spheres
            .get(index)
            .map_or(1.0, |s| s.radius.max(constants::EPSILON));
        Mat4::new_orthographic(-radius, radius, -radius, radius, 0.0, 2.0 * self.z_far)
    }

    /// View matrix looking down the light direction at a cascade's center,
    /// from one far-plane distance away
    pub fn view_matrix(&self, index: usize) -> Mat4 {
        let center = self.spheres.get(index).map_or(Vec3::zeros(), |s| s.center);
        let eye = center + self.light_dir * self.z_far;
        // Fall back to a Z up when the light is close to vertical.
        let up = if self.light_dir.y.abs() > 0.99 {
            Vec3::z()
        } else {
            Vec3::y()
        };
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(center), &up)
    }

    /// All fitted `(projection, view)` pairs, ordered near to far
    pub fn matrices(&self) -> Vec<(Mat4, Mat4)> {
        (0..self.spheres.len())
            .map(|i| (self.projection_matrix(i), self.view_matrix(i)))
            .collect()
    }

    fn set_light(&mut self, light_dir: Vec3, z_far: f32) {
        self.light_dir = light_dir
            .try_normalize(constants::EPSILON)
            .unwrap_or_else(Vec3::y);
        self.z_far = z_far;
    }
}
