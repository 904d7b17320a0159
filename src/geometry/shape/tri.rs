//! Linear (3-node) triangles on the unit simplex.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::geometry::Point;

pub(super) const CORNERS: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

pub(super) const FACE_NODES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

pub(super) fn ref_normal(face: usize) -> Point {
    match face {
        0 => Point::new_2d(0.0, -1.0),
        1 => Point::new_2d(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        _ => Point::new_2d(-1.0, 0.0),
    }
}

pub(super) fn shape(loc: &Point, out: &mut [f64]) {
    out[0] = 1.0 - loc.x - loc.y;
    out[1] = loc.x;
    out[2] = loc.y;
}

pub(super) fn dshape(out: &mut [[f64; 3]]) {
    out[0] = [-1.0, -1.0, 0.0];
    out[1] = [1.0, 0.0, 0.0];
    out[2] = [0.0, 1.0, 0.0];
}
