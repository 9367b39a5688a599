//! Spatial volumes and culling primitives
//!
//! Pure geometry with no dependencies on the rest of the engine: bounding
//! boxes, spheres, planes, and frusta, plus the conservative intersection
//! tests the renderer uses to decide whether geometry is submitted to a
//! camera or light frustum. False positives are acceptable, false negatives
//! are not.

mod frustum;
mod volume;

pub use frustum::{Frustum, Plane};
pub use volume::{Aabb, Sphere};
