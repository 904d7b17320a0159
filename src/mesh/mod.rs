//! Mesh representation.
//!
//! Provides the geometric service the solver consumes:
//! - Vertex positions (initial and current) and grid velocities
//! - Cell-to-vertex connectivity with per-cell shape and overset status
//! - Face connectivity built from shared vertex sets, with periodic pairs
//!   matched through canonical vertex ids and the face's vertex layout
//! - Prescribed mesh motion
//!
//! Face convention follows [`ElementShape::face_nodes`]: quads have faces
//! bottom, right, top, left; hexes z-, z+, x-, x+, y-, y+.

mod boundary_tags;
mod motion;
mod structured;

pub use boundary_tags::BoundaryTag;
pub use motion::MeshMotion;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{FrError, Result};
use crate::geometry::{ElementShape, Point};

/// Overset (iblank) status of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellStatus {
    /// Regular field cell
    #[default]
    Normal,
    /// Blanked out; not updated
    Hole,
    /// Receives interpolated data; not updated by the time integrator
    Fringe,
}

impl CellStatus {
    /// Status from an iblank value (1 normal, 0 hole, -1 fringe).
    pub fn from_iblank(value: i32) -> Option<Self> {
        match value {
            1 => Some(CellStatus::Normal),
            0 => Some(CellStatus::Hole),
            -1 => Some(CellStatus::Fringe),
            _ => None,
        }
    }

    /// Iblank value of this status.
    pub fn iblank(&self) -> i32 {
        match self {
            CellStatus::Normal => 1,
            CellStatus::Hole => 0,
            CellStatus::Fringe => -1,
        }
    }
}

/// Reference to a cell and one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementFace {
    /// Cell index
    pub element: usize,
    /// Local face index
    pub face: usize,
}

impl ElementFace {
    pub fn new(element: usize, face: usize) -> Self {
        Self { element, face }
    }
}

/// One mesh cell.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Element shape
    pub shape: ElementShape,
    /// Vertex indices in the shape's node order
    pub nodes: Vec<usize>,
}

/// Information about a face in the mesh.
#[derive(Clone, Debug)]
pub struct MeshFace {
    /// Owning side (always present)
    pub left: ElementFace,
    /// Neighbouring side (None for boundary faces)
    pub right: Option<ElementFace>,
    /// Boundary tag (only for boundary faces)
    pub boundary_tag: Option<BoundaryTag>,
}

impl MeshFace {
    /// Check if this is a boundary face.
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }

    /// Check if this is an interior (or periodic) face.
    pub fn is_interior(&self) -> bool {
        self.right.is_some()
    }
}

/// Unstructured mesh of quads or hexes.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Spatial dimension
    pub n_dims: usize,
    /// Initial vertex positions
    pub vertices0: Vec<Point>,
    /// Current vertex positions
    pub vertices: Vec<Point>,
    /// Current vertex velocities
    pub grid_vel: Vec<Point>,
    /// Cells
    pub cells: Vec<Cell>,
    /// Overset status per cell
    pub cell_status: Vec<CellStatus>,
    /// Face connectivity
    pub faces: Vec<MeshFace>,
    /// Motion law
    pub motion: MeshMotion,
}

impl Mesh {
    /// Build a mesh from cells, tagging unmatched faces with `tag_of`.
    ///
    /// `canonical` maps each vertex to the id used for face matching; pass
    /// the identity for non-periodic meshes, or fold periodic images onto one
    /// another. `tag_of` receives the face-centroid of every unmatched face.
    pub fn from_cells(
        n_dims: usize,
        vertices: Vec<Point>,
        cells: Vec<Cell>,
        canonical: &[usize],
        tag_of: impl Fn(&Point) -> BoundaryTag,
    ) -> Result<Self> {
        for (k, cell) in cells.iter().enumerate() {
            cell.shape.check_nodes(cell.nodes.len())?;
            if cell.shape.n_dims() != n_dims {
                return Err(FrError::MeshConnectivity(format!(
                    "cell {k} is {:?} in a {n_dims}D mesh",
                    cell.shape
                )));
            }
            if let Some(&bad) = cell.nodes.iter().find(|&&v| v >= vertices.len()) {
                return Err(FrError::MeshConnectivity(format!(
                    "cell {k} references vertex {bad} of {}",
                    vertices.len()
                )));
            }
        }

        let faces = build_faces(&vertices, &cells, canonical, tag_of)?;
        let n_cells = cells.len();
        debug!(
            n_cells,
            n_faces = faces.len(),
            n_boundary = faces.iter().filter(|f| f.is_boundary()).count(),
            "built mesh connectivity"
        );

        Ok(Self {
            n_dims,
            grid_vel: vec![Point::zero(); vertices.len()],
            vertices0: vertices.clone(),
            vertices,
            cells,
            cell_status: vec![CellStatus::Normal; n_cells],
            faces,
            motion: MeshMotion::Static,
        })
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Set the motion law.
    pub fn with_motion(mut self, motion: MeshMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Current positions of the nodes of cell `k`.
    pub fn cell_nodes(&self, k: usize) -> Vec<Point> {
        self.cells[k].nodes.iter().map(|&v| self.vertices[v]).collect()
    }

    /// Current velocities of the nodes of cell `k`.
    pub fn cell_node_velocities(&self, k: usize) -> Vec<Point> {
        self.cells[k].nodes.iter().map(|&v| self.grid_vel[v]).collect()
    }

    /// Move every vertex to its position at time `t`.
    pub fn move_to(&mut self, t: f64) {
        if !self.motion.is_moving() {
            return;
        }
        for ((x, v), x0) in self
            .vertices
            .iter_mut()
            .zip(self.grid_vel.iter_mut())
            .zip(&self.vertices0)
        {
            let (pos, vel) = self.motion.evaluate(x0, self.n_dims, t);
            *x = pos;
            *v = vel;
        }
    }

    /// Centroid of a cell face at current positions.
    pub fn face_centroid(&self, ef: ElementFace) -> Point {
        let cell = &self.cells[ef.element];
        let corners = cell.shape.face_nodes(ef.face);
        let sum = corners
            .iter()
            .fold(Point::zero(), |acc, &c| acc + self.vertices[cell.nodes[c]]);
        sum * (1.0 / corners.len() as f64)
    }
}

/// Relative tolerance for matching face vertex layouts.
const FACE_MATCH_TOL: f64 = 1e-8;

/// A face waiting for its partner: canonical key plus the vertex offsets
/// relative to the first key vertex, in key order.
struct OpenFace {
    side: ElementFace,
    offsets: Vec<Point>,
}

impl OpenFace {
    /// Partners share the canonical key and the same vertex layout. The
    /// layout check separates faces whose canonical sets coincide only
    /// because a periodic direction is one or two cells wide.
    fn matches(&self, offsets: &[Point]) -> bool {
        let scale = offsets.iter().map(Point::norm).fold(0.0_f64, f64::max);
        self.offsets
            .iter()
            .zip(offsets)
            .all(|(a, b)| a.distance(b) <= FACE_MATCH_TOL * scale)
    }
}

/// Canonical key of a face and its vertex offsets. Ties between equal
/// canonical ids are broken by position.
fn face_key(
    vertices: &[Point],
    cell: &Cell,
    f: usize,
    canonical: &[usize],
) -> (Vec<usize>, Vec<Point>) {
    let mut corners: Vec<(usize, Point)> = cell
        .shape
        .face_nodes(f)
        .iter()
        .map(|&c| (canonical[cell.nodes[c]], vertices[cell.nodes[c]]))
        .collect();
    corners.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.x.total_cmp(&b.1.x))
            .then(a.1.y.total_cmp(&b.1.y))
            .then(a.1.z.total_cmp(&b.1.z))
    });
    let origin = corners[0].1;
    let key = corners.iter().map(|c| c.0).collect();
    let offsets = corners.iter().map(|c| c.1 - origin).collect();
    (key, offsets)
}

fn build_faces(
    vertices: &[Point],
    cells: &[Cell],
    canonical: &[usize],
    tag_of: impl Fn(&Point) -> BoundaryTag,
) -> Result<Vec<MeshFace>> {
    let mut open: HashMap<Vec<usize>, Vec<OpenFace>> = HashMap::new();
    let mut faces = Vec::new();

    for (k, cell) in cells.iter().enumerate() {
        for f in 0..cell.shape.n_faces() {
            let (key, offsets) = face_key(vertices, cell, f, canonical);
            let ef = ElementFace::new(k, f);
            let waiting = open.entry(key).or_default();
            match waiting.iter().position(|o| o.matches(&offsets)) {
                Some(i) => faces.push(MeshFace {
                    left: waiting.swap_remove(i).side,
                    right: Some(ef),
                    boundary_tag: None,
                }),
                None => waiting.push(OpenFace { side: ef, offsets }),
            }
        }
    }

    // Deterministic order for boundary faces.
    let mut unmatched: Vec<ElementFace> = open.into_values().flatten().map(|o| o.side).collect();
    unmatched.sort_by_key(|ef| (ef.element, ef.face));
    for ef in unmatched {
        let cell = &cells[ef.element];
        let corners = cell.shape.face_nodes(ef.face);
        let centroid = corners
            .iter()
            .fold(Point::zero(), |acc, &c| acc + vertices[cell.nodes[c]])
            * (1.0 / corners.len() as f64);
        let tag = tag_of(&centroid);
        if tag.is_periodic() {
            return Err(FrError::MeshConnectivity(format!(
                "periodic face {} of cell {} has no partner",
                ef.face, ef.element
            )));
        }
        faces.push(MeshFace {
            left: ef,
            right: None,
            boundary_tag: Some(tag),
        });
    }
    Ok(faces)
}
