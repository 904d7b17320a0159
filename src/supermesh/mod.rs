//! Local supermesh of a target hex against overlapping donor hexes.
//!
//! Each donor hex is split into tets, and every tet is clipped by the six
//! half-spaces of the target cell. The surviving fragments tile the
//! intersection exactly, so integrals of donor data over the fragments
//! give a conservative transfer onto the target cell.

mod clip;
mod quadrature;
mod tetra;

pub use clip::clip_tet;
pub use quadrature::reference_tet_rule;
pub use tetra::{split_hex_into_tets, Tetra, HEX_TO_TETS};

use tracing::{debug, warn};

use crate::error::{FrError, Result};
use crate::geometry::{ElementShape, Point};

/// Intersection of one target hex with a set of donor hexes.
#[derive(Clone, Debug)]
pub struct SuperMesh {
    target: Vec<Point>,
    donors: Vec<Vec<Point>>,
    quad_order: usize,
    tets: Vec<Tetra>,
    /// Donor index of each fragment
    parents: Vec<usize>,
    qpts: Vec<Point>,
    qwts: Vec<f64>,
    n_qpts_tet: usize,
}

impl SuperMesh {
    /// Build the supermesh of `target` (8 hex nodes) with `donors`.
    pub fn new(target: Vec<Point>, donors: Vec<Vec<Point>>, quad_order: usize) -> Result<Self> {
        ElementShape::Hex.check_nodes(target.len())?;
        for d in &donors {
            ElementShape::Hex.check_nodes(d.len())?;
        }
        let mut mesh = Self {
            target,
            donors,
            quad_order,
            tets: Vec::new(),
            parents: Vec::new(),
            qpts: Vec::new(),
            qwts: Vec::new(),
            n_qpts_tet: 0,
        };
        mesh.build();
        Ok(mesh)
    }

    /// Recompute fragments and quadrature from the current nodes.
    pub fn build(&mut self) {
        let planes = self.target_planes();
        self.tets.clear();
        self.parents.clear();
        for (k, donor) in self.donors.iter().enumerate() {
            let mut pieces = split_hex_into_tets(donor);
            for (face, normal) in &planes {
                pieces = pieces
                    .iter()
                    .flat_map(|t| clip_tet(t, face, normal))
                    .collect();
                if pieces.is_empty() {
                    break;
                }
            }
            if pieces.is_empty() {
                warn!(donor = k, "donor cell does not overlap the target cell");
            }
            self.parents.extend(std::iter::repeat(k).take(pieces.len()));
            self.tets.extend(pieces);
        }

        let (ref_pts, ref_wts) = reference_tet_rule(self.quad_order);
        self.n_qpts_tet = ref_pts.len();
        self.qpts.clear();
        self.qwts.clear();
        for tet in &self.tets {
            let scale = 6.0 * tet.volume();
            for (xi, w) in ref_pts.iter().zip(&ref_wts) {
                self.qpts.push(tet.map(xi));
                self.qwts.push(w * scale);
            }
        }
        debug!(
            n_donors = self.donors.len(),
            n_tets = self.tets.len(),
            volume = self.volume(),
            "built supermesh"
        );
    }

    /// Target faces with outward unit normals.
    fn target_planes(&self) -> Vec<(Vec<Point>, Point)> {
        let center = self.target.iter().fold(Point::zero(), |a, &p| a + p) * 0.125;
        (0..6)
            .map(|f| {
                let face: Vec<Point> = ElementShape::Hex
                    .face_nodes(f)
                    .iter()
                    .map(|&i| self.target[i])
                    .collect();
                let mut normal = (face[2] - face[0]).cross(&(face[3] - face[1])).normalize();
                let fc = face.iter().fold(Point::zero(), |a, &p| a + p) * 0.25;
                if normal.dot(&(fc - center)) < 0.0 {
                    normal = -normal;
                }
                (face, normal)
            })
            .collect()
    }

    /// Fragments of the intersection.
    pub fn tets(&self) -> &[Tetra] {
        &self.tets
    }

    /// Donor index of each fragment.
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    /// Volume of the intersection.
    pub fn volume(&self) -> f64 {
        self.tets.iter().map(Tetra::volume).sum()
    }

    /// Quadrature points, fragment by fragment.
    pub fn quadrature_points(&self) -> &[Point] {
        &self.qpts
    }

    pub fn quadrature_weights(&self) -> &[f64] {
        &self.qwts
    }

    /// Points per fragment.
    pub fn n_qpts_per_tet(&self) -> usize {
        self.n_qpts_tet
    }

    /// Integral of data given at the quadrature points.
    pub fn integrate(&self, data: &[f64]) -> Result<f64> {
        if data.len() != self.qpts.len() {
            return Err(FrError::QuadratureMismatch {
                expected: self.qpts.len(),
                got: data.len(),
            });
        }
        Ok(data.iter().zip(&self.qwts).map(|(v, w)| v * w).sum())
    }

    /// Integral of `f` over the intersection.
    pub fn integrate_fn(&self, f: impl Fn(&Point) -> f64) -> f64 {
        self.qpts.iter().zip(&self.qwts).map(|(p, w)| w * f(p)).sum()
    }
}
