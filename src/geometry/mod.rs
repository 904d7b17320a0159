//! Geometric transform engine.
//!
//! Shape functions per element kind, per-point Jacobians with their
//! adjugates and determinants, physical normals and face-area scales, and
//! the inverse (physical-to-reference) map.

mod inverse_map;
mod linalg;
mod point;
mod shape;
mod transform;

pub use inverse_map::{NELDER_MEAD_MAX_ITERS, NEWTON_MAX_ITERS};
pub use linalg::SmallMatrix;
pub use point::Point;
pub use shape::ElementShape;
pub use transform::{
    jacobian, space_time_jacobian, transformed_normal, ElementGeometry, PointTransform,
    DEGENERATE_FACE_TOL,
};
