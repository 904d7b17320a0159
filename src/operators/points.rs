//! Solution, flux and plot point layouts for tensor-product elements.
//!
//! Solution points form a tensor grid of the 1D family with x fastest:
//! `spt = i + (p+1) j` (quad) and `spt = i + (p+1) (j + (p+1) k)` (hex).
//!
//! Quad flux points run counter-clockwise: bottom (x increasing), right
//! (y increasing), top (x decreasing), left (y decreasing), so the face of
//! flux point `f` is `f / (p+1)`. Hex faces are z-, z+, x-, x+, y-, y+ with
//! `face = f / (p+1)^2` and the two tangential coordinates in increasing
//! axis order, first one fastest.

use crate::geometry::{ElementShape, Point};

/// Where a flux point sits on the reference element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FluxPointInfo {
    /// Local face index
    pub face: usize,
    /// Reference axis normal to the face
    pub normal_dim: usize,
    /// +1 on the max-coordinate face, -1 on the min-coordinate face
    pub sign: i8,
    /// 1D point index along every tangential axis (normal axis unused)
    pub tang: [usize; 3],
}

/// Face layout of a hex: (normal axis, sign, tangential axes).
const HEX_FACES: [(usize, i8, [usize; 2]); 6] = [
    (2, -1, [0, 1]),
    (2, 1, [0, 1]),
    (0, -1, [1, 2]),
    (0, 1, [1, 2]),
    (1, -1, [0, 2]),
    (1, 1, [0, 2]),
];

/// Tensor index of a solution point.
pub fn spt_tensor_index(spt: usize, n1d: usize, n_dims: usize) -> [usize; 3] {
    let i = spt % n1d;
    let j = (spt / n1d) % n1d;
    let k = if n_dims == 3 { spt / (n1d * n1d) } else { 0 };
    [i, j, k]
}

/// Solution point index from a tensor index.
pub fn spt_linear_index(idx: [usize; 3], n1d: usize, n_dims: usize) -> usize {
    if n_dims == 3 {
        idx[0] + n1d * (idx[1] + n1d * idx[2])
    } else {
        idx[0] + n1d * idx[1]
    }
}

/// Reference solution point locations.
pub fn solution_points(n_dims: usize, pts: &[f64]) -> Vec<Point> {
    let n1d = pts.len();
    let n_spts = n1d.pow(n_dims as u32);
    (0..n_spts)
        .map(|spt| {
            let idx = spt_tensor_index(spt, n1d, n_dims);
            let mut p = Point::zero();
            for d in 0..n_dims {
                p[d] = pts[idx[d]];
            }
            p
        })
        .collect()
}

/// Flux point descriptors for a quad or hex.
pub fn flux_points(shape: ElementShape, n1d: usize) -> Vec<FluxPointInfo> {
    let last = n1d - 1;
    match shape {
        ElementShape::Quad => {
            let mut out = Vec::with_capacity(4 * n1d);
            for k in 0..n1d {
                out.push(FluxPointInfo { face: 0, normal_dim: 1, sign: -1, tang: [k, 0, 0] });
            }
            for k in 0..n1d {
                out.push(FluxPointInfo { face: 1, normal_dim: 0, sign: 1, tang: [0, k, 0] });
            }
            for k in 0..n1d {
                out.push(FluxPointInfo { face: 2, normal_dim: 1, sign: 1, tang: [last - k, 0, 0] });
            }
            for k in 0..n1d {
                out.push(FluxPointInfo { face: 3, normal_dim: 0, sign: -1, tang: [0, last - k, 0] });
            }
            out
        }
        _ => {
            let mut out = Vec::with_capacity(6 * n1d * n1d);
            for (face, &(normal_dim, sign, axes)) in HEX_FACES.iter().enumerate() {
                for b in 0..n1d {
                    for a in 0..n1d {
                        let mut tang = [0; 3];
                        tang[axes[0]] = a;
                        tang[axes[1]] = b;
                        out.push(FluxPointInfo { face, normal_dim, sign, tang });
                    }
                }
            }
            out
        }
    }
}

/// Reference location of a flux point.
pub fn flux_point_location(info: &FluxPointInfo, n_dims: usize, pts: &[f64]) -> Point {
    let mut p = Point::zero();
    for d in 0..n_dims {
        p[d] = if d == info.normal_dim {
            f64::from(info.sign)
        } else {
            pts[info.tang[d]]
        };
    }
    p
}

/// 1D plot coordinates: the element ends plus the solution points.
pub fn plot_points_1d(pts: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(pts.len() + 2);
    out.push(-1.0);
    out.extend_from_slice(pts);
    out.push(1.0);
    out
}
