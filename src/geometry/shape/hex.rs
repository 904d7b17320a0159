//! Trilinear (8-node) hexahedra.

use crate::geometry::Point;

pub(super) const CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// z-, z+, x-, x+, y-, y+.
pub(super) const FACE_NODES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
];

pub(super) fn ref_normal(face: usize) -> Point {
    match face {
        0 => Point::new(0.0, 0.0, -1.0),
        1 => Point::new(0.0, 0.0, 1.0),
        2 => Point::new(-1.0, 0.0, 0.0),
        3 => Point::new(1.0, 0.0, 0.0),
        4 => Point::new(0.0, -1.0, 0.0),
        _ => Point::new(0.0, 1.0, 0.0),
    }
}

pub(super) fn shape(loc: &Point, out: &mut [f64]) {
    for (i, c) in CORNERS.iter().enumerate() {
        out[i] = 0.125 * (1.0 + loc.x * c[0]) * (1.0 + loc.y * c[1]) * (1.0 + loc.z * c[2]);
    }
}

pub(super) fn dshape(loc: &Point, out: &mut [[f64; 3]]) {
    for (i, c) in CORNERS.iter().enumerate() {
        let fx = 1.0 + loc.x * c[0];
        let fy = 1.0 + loc.y * c[1];
        let fz = 1.0 + loc.z * c[2];
        out[i] = [
            0.125 * c[0] * fy * fz,
            0.125 * c[1] * fx * fz,
            0.125 * c[2] * fx * fy,
        ];
    }
}
