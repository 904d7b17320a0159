//! Element shapes and their closed-form mapping functions.
//!
//! Each shape lives in its own module exposing the same small set of
//! functions; [`ElementShape`] dispatches on the variant. Quadrilaterals and
//! hexahedra use the bi-unit reference cube, triangles and tetrahedra the
//! unit simplex.

mod hex;
mod quad;
mod tet;
mod tri;

use super::Point;
use crate::error::{FrError, Result};

/// Reference element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementShape {
    Tri,
    Quad,
    Tet,
    Hex,
}

impl ElementShape {
    /// Topological dimension.
    pub fn n_dims(&self) -> usize {
        match self {
            ElementShape::Tri | ElementShape::Quad => 2,
            ElementShape::Tet | ElementShape::Hex => 3,
        }
    }

    /// Number of faces (edges in 2D).
    pub fn n_faces(&self) -> usize {
        match self {
            ElementShape::Tri => 3,
            ElementShape::Quad | ElementShape::Tet => 4,
            ElementShape::Hex => 6,
        }
    }

    /// Number of corner vertices.
    pub fn n_corners(&self) -> usize {
        match self {
            ElementShape::Tri => 3,
            ElementShape::Quad | ElementShape::Tet => 4,
            ElementShape::Hex => 8,
        }
    }

    /// Whether the solver has flux reconstruction operators for this shape.
    pub fn has_fr_operators(&self) -> bool {
        matches!(self, ElementShape::Quad | ElementShape::Hex)
    }

    /// Check that `n_nodes` is a supported geometric node count.
    pub fn check_nodes(&self, n_nodes: usize) -> Result<()> {
        let ok = match self {
            ElementShape::Tri => n_nodes == 3,
            ElementShape::Quad => n_nodes == 4 || n_nodes == 8,
            ElementShape::Tet => n_nodes == 4,
            ElementShape::Hex => n_nodes == 8,
        };
        if ok {
            Ok(())
        } else {
            Err(FrError::UnsupportedElement {
                shape: *self,
                n_nodes,
                reason: "no shape functions for this node count",
            })
        }
    }

    /// Shape function values at `loc`, one per geometric node.
    pub fn shape(&self, n_nodes: usize, loc: &Point, out: &mut Vec<f64>) {
        out.clear();
        out.resize(n_nodes, 0.0);
        match self {
            ElementShape::Tri => tri::shape(loc, out),
            ElementShape::Quad => quad::shape(n_nodes, loc, out),
            ElementShape::Tet => tet::shape(loc, out),
            ElementShape::Hex => hex::shape(loc, out),
        }
    }

    /// Parametric derivatives `dshape[node][dim]` at `loc`.
    pub fn dshape(&self, n_nodes: usize, loc: &Point, out: &mut Vec<[f64; 3]>) {
        out.clear();
        out.resize(n_nodes, [0.0; 3]);
        match self {
            ElementShape::Tri => tri::dshape(out),
            ElementShape::Quad => quad::dshape(n_nodes, loc, out),
            ElementShape::Tet => tet::dshape(out),
            ElementShape::Hex => hex::dshape(loc, out),
        }
    }

    /// Outward reference-space normal of `face` (not necessarily unit
    /// length for the slanted simplex face).
    pub fn ref_normal(&self, face: usize) -> Point {
        match self {
            ElementShape::Tri => tri::ref_normal(face),
            ElementShape::Quad => quad::ref_normal(face),
            ElementShape::Tet => tet::ref_normal(face),
            ElementShape::Hex => hex::ref_normal(face),
        }
    }

    /// Corner-node indices of `face`, ordered so that the right-hand rule
    /// gives the outward normal.
    pub fn face_nodes(&self, face: usize) -> &'static [usize] {
        match self {
            ElementShape::Tri => &tri::FACE_NODES[face],
            ElementShape::Quad => &quad::FACE_NODES[face],
            ElementShape::Tet => &tet::FACE_NODES[face],
            ElementShape::Hex => &hex::FACE_NODES[face],
        }
    }

    /// Reference coordinates of the corner nodes.
    pub fn ref_corners(&self) -> &'static [[f64; 3]] {
        match self {
            ElementShape::Tri => &tri::CORNERS,
            ElementShape::Quad => &quad::CORNERS,
            ElementShape::Tet => &tet::CORNERS,
            ElementShape::Hex => &hex::CORNERS,
        }
    }

    /// Reference-domain bounds used to clamp iterates of the inverse map.
    pub fn clamp_ref(&self, loc: &mut Point) {
        let (lo, hi) = match self {
            ElementShape::Tri | ElementShape::Tet => (0.0, 1.0),
            ElementShape::Quad | ElementShape::Hex => (-1.0, 1.0),
        };
        for d in 0..self.n_dims() {
            loc[d] = loc[d].clamp(lo, hi);
        }
    }
}
