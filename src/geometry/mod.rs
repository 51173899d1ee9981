//! Geometry primitives for oriented boxes: vertex construction, convex
//! polygon clipping and the separating axis overlap test.

pub mod clip;
pub mod corners;
pub mod sat;

pub use clip::{intersection_area, polygon_area, Intersection};
pub use corners::{bev_corners, box_corners_3d};
pub use sat::separating_axis_overlap;

/// Tolerance used to reject zero-area polygons and near-parallel edges.
pub const GEOMETRY_EPS: f64 = 1e-12;
