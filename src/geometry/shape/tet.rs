//! Linear (4-node) tetrahedra on the unit simplex.

use crate::geometry::Point;

pub(super) const CORNERS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Face `i` is opposite node `i`.
pub(super) const FACE_NODES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

pub(super) fn ref_normal(face: usize) -> Point {
    let s = 1.0 / 3.0f64.sqrt();
    match face {
        0 => Point::new(s, s, s),
        1 => Point::new(-1.0, 0.0, 0.0),
        2 => Point::new(0.0, -1.0, 0.0),
        _ => Point::new(0.0, 0.0, -1.0),
    }
}

pub(super) fn shape(loc: &Point, out: &mut [f64]) {
    out[0] = 1.0 - loc.x - loc.y - loc.z;
    out[1] = loc.x;
    out[2] = loc.y;
    out[3] = loc.z;
}

pub(super) fn dshape(out: &mut [[f64; 3]]) {
    out[0] = [-1.0, -1.0, -1.0];
    out[1] = [1.0, 0.0, 0.0];
    out[2] = [0.0, 1.0, 0.0];
    out[3] = [0.0, 0.0, 1.0];
}
