//! Linear tetrahedra.

use crate::geometry::Point;

/// Split of the 8-node hex (bottom face 0-3, top face 4-7) into 5 tets.
pub const HEX_TO_TETS: [[usize; 4]; 5] = [
    [0, 1, 4, 3],
    [2, 1, 6, 3],
    [5, 1, 6, 4],
    [7, 3, 4, 6],
    [1, 3, 6, 4],
];

/// A straight-sided tetrahedron.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tetra {
    pub nodes: [Point; 4],
}

impl Tetra {
    pub fn new(nodes: [Point; 4]) -> Self {
        Self { nodes }
    }

    /// Signed volume; positive when node 3 lies on the side of face (0, 1, 2)
    /// given by the right-hand rule.
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c, d] = self.nodes;
        (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Same tet with positive orientation.
    pub fn oriented(mut self) -> Self {
        if self.signed_volume() < 0.0 {
            self.nodes.swap(0, 1);
        }
        self
    }

    /// Longest edge length.
    pub fn max_edge(&self) -> f64 {
        let mut h: f64 = 0.0;
        for i in 0..4 {
            for j in i + 1..4 {
                h = h.max(self.nodes[i].distance(&self.nodes[j]));
            }
        }
        h
    }

    pub fn centroid(&self) -> Point {
        self.nodes.iter().fold(Point::zero(), |acc, &p| acc + p) * 0.25
    }

    /// Map from the unit reference tet `{ξ >= 0, ξ1 + ξ2 + ξ3 <= 1}`.
    pub fn map(&self, xi: &[f64; 3]) -> Point {
        let [a, b, c, d] = self.nodes;
        a + (b - a) * xi[0] + (c - a) * xi[1] + (d - a) * xi[2]
    }
}

/// Split a hexahedron into 5 positively oriented tets.
pub fn split_hex_into_tets(hex: &[Point]) -> Vec<Tetra> {
    HEX_TO_TETS
        .iter()
        .map(|idx| Tetra::new(idx.map(|i| hex[i])).oriented())
        .collect()
}
