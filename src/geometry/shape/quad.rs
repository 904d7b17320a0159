//! Bilinear (4-node) and serendipity (8-node) quadrilaterals.

use crate::geometry::Point;

pub(super) const CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
];

/// Bottom, right, top, left.
pub(super) const FACE_NODES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

pub(super) fn ref_normal(face: usize) -> Point {
    match face {
        0 => Point::new_2d(0.0, -1.0),
        1 => Point::new_2d(1.0, 0.0),
        2 => Point::new_2d(0.0, 1.0),
        _ => Point::new_2d(-1.0, 0.0),
    }
}

pub(super) fn shape(n_nodes: usize, loc: &Point, out: &mut [f64]) {
    let (xi, eta) = (loc.x, loc.y);
    if n_nodes == 4 {
        for (i, c) in CORNERS.iter().take(4).enumerate() {
            out[i] = 0.25 * (1.0 + xi * c[0]) * (1.0 + eta * c[1]);
        }
        return;
    }

    for (i, c) in CORNERS.iter().enumerate() {
        let (xi_i, eta_i) = (c[0], c[1]);
        out[i] = if i < 4 {
            0.25 * (1.0 + xi * xi_i) * (1.0 + eta * eta_i) * (xi * xi_i + eta * eta_i - 1.0)
        } else if xi_i == 0.0 {
            0.5 * (1.0 - xi * xi) * (1.0 + eta * eta_i)
        } else {
            0.5 * (1.0 + xi * xi_i) * (1.0 - eta * eta)
        };
    }
}

pub(super) fn dshape(n_nodes: usize, loc: &Point, out: &mut [[f64; 3]]) {
    let (xi, eta) = (loc.x, loc.y);
    if n_nodes == 4 {
        for (i, c) in CORNERS.iter().take(4).enumerate() {
            out[i][0] = 0.25 * c[0] * (1.0 + eta * c[1]);
            out[i][1] = 0.25 * c[1] * (1.0 + xi * c[0]);
        }
        return;
    }

    for (i, c) in CORNERS.iter().enumerate() {
        let (xi_i, eta_i) = (c[0], c[1]);
        if i < 4 {
            out[i][0] = 0.25 * xi_i * (1.0 + eta * eta_i) * (2.0 * xi * xi_i + eta * eta_i);
            out[i][1] = 0.25 * eta_i * (1.0 + xi * xi_i) * (xi * xi_i + 2.0 * eta * eta_i);
        } else if xi_i == 0.0 {
            out[i][0] = -xi * (1.0 + eta * eta_i);
            out[i][1] = 0.5 * eta_i * (1.0 - xi * xi);
        } else {
            out[i][0] = 0.5 * xi_i * (1.0 - eta * eta);
            out[i][1] = -eta * (1.0 + xi * xi_i);
        }
    }
}
