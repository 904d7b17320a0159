//! Clipping a tet by a half-space.
//!
//! Vertices with `(x - x_c)·n > 0` lie outside the plane through `x_c` with
//! outward normal `n`. The surviving region is re-tetrahedralized with a
//! fixed table for each count of outside vertices.

use tracing::warn;

use super::tetra::Tetra;
use crate::geometry::Point;

const PLANE_TOL: f64 = 1e-12;

/// For a single vertex, the other three ordered so that the vertex sees
/// them counter-clockwise.
const OPPOSITE: [[usize; 3]; 4] = [[1, 3, 2], [0, 2, 3], [0, 3, 1], [0, 1, 2]];

/// Even node permutation bringing a kept edge to positions (0, 1) and the
/// removed pair to (2, 3).
const KEEP_EDGE: [([usize; 2], [usize; 4]); 6] = [
    ([0, 1], [0, 1, 2, 3]),
    ([0, 2], [0, 2, 3, 1]),
    ([0, 3], [0, 3, 1, 2]),
    ([1, 2], [1, 2, 0, 3]),
    ([1, 3], [1, 3, 2, 0]),
    ([2, 3], [2, 3, 0, 1]),
];

/// Point where segment `a`-`b` crosses the plane.
fn intersect(a: Point, b: Point, centroid: &Point, normal: &Point) -> Point {
    let ab = b - a;
    let t = normal.dot(&(*centroid - a)) / normal.dot(&ab);
    a + ab * t
}

/// Clip `tet` by the half-space behind the planar face `face` with outward
/// `normal`, returning the surviving region as positively oriented tets.
///
/// A tet entirely behind the plane is returned unchanged.
pub fn clip_tet(tet: &Tetra, face: &[Point], normal: &Point) -> Vec<Tetra> {
    let xc = face.iter().fold(Point::zero(), |acc, &p| acc + p) * (1.0 / face.len() as f64);
    // vertices on the plane survive
    let tol = PLANE_TOL * tet.max_edge() * normal.norm();
    let dead: Vec<bool> = tet
        .nodes
        .iter()
        .map(|p| (*p - xc).dot(normal) > tol)
        .collect();
    let n_dead = dead.iter().filter(|&&d| d).count();
    if n_dead == 0 {
        return vec![*tet];
    }
    let x = |i: usize| tet.nodes[i];
    let cut = |a: usize, b: usize| intersect(x(a), x(b), &xc, normal);

    let out = match n_dead {
        1 => {
            // prism between the kept face and the cut triangle
            let kill = dead.iter().position(|&d| d).unwrap_or(0);
            let e = OPPOSITE[kill];
            let n = e.map(|i| cut(kill, i));
            vec![
                Tetra::new([x(e[0]), x(e[1]), n[0], x(e[2])]),
                Tetra::new([x(e[2]), n[0], n[2], n[1]]),
                Tetra::new([x(e[1]), x(e[2]), n[1], n[0]]),
            ]
        }
        2 => {
            // wedge around the kept edge
            let keep: Vec<usize> = (0..4).filter(|&i| !dead[i]).collect();
            let ind = KEEP_EDGE
                .iter()
                .find(|(k, _)| k[..] == keep[..])
                .map(|(_, ind)| *ind)
                .unwrap_or([0, 1, 2, 3]);
            let n = [
                cut(ind[0], ind[3]),
                cut(ind[1], ind[3]),
                cut(ind[1], ind[2]),
                cut(ind[0], ind[2]),
            ];
            vec![
                Tetra::new([x(ind[1]), n[0], n[3], x(ind[0])]),
                Tetra::new([n[0], n[3], n[1], x(ind[1])]),
                Tetra::new([n[1], n[3], n[2], x(ind[1])]),
            ]
        }
        3 => {
            let keep = dead.iter().position(|&d| !d).unwrap_or(0);
            let e = OPPOSITE[keep];
            vec![Tetra::new([cut(keep, e[0]), cut(keep, e[1]), cut(keep, e[2]), x(keep)])]
        }
        _ => {
            warn!("donor tet lies entirely outside the target cell");
            Vec::new()
        }
    };
    out.into_iter().map(Tetra::oriented).collect()
}
