//! Interfaces between elements and boundary faces.
//!
//! Faces own their common-solution and common-flux buffers. A residual runs
//! every face in parallel against read-only elements, then scatters the
//! buffers into the elements' flux-point arrays serially:
//!
//! ```text
//! faces (parallel):  U_L, U_R, ∇U_L, ∇U_R -> Uc, F*·n
//! scatter (serial):  Uc -> uc_fpts,  F*·n dA_L -> fn_fpts(L),  -F*·n dA_R -> fn_fpts(R)
//! ```
//!
//! Common fluxes are single-valued and always oriented along the left
//! element's outward normal, so what leaves one element enters the other.

mod boundary;
mod interior;

pub use boundary::BoundaryFace;
pub use interior::InteriorFace;

use faer::Mat;

use crate::element::{Context, Element};
use crate::error::Result;
use crate::geometry::Point;
use crate::mesh::{ElementFace, Mesh};
use crate::physics::{normal_flux, Physics, State, Tensor, MAX_FIELDS};

/// Pressure and viscous parts of the force on wall boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WallForce {
    /// Pressure contribution
    pub inviscid: [f64; 3],
    /// Viscous-stress contribution
    pub viscous: [f64; 3],
}

impl WallForce {
    /// Sum of both parts.
    pub fn total(&self) -> [f64; 3] {
        [
            self.inviscid[0] + self.viscous[0],
            self.inviscid[1] + self.viscous[1],
            self.inviscid[2] + self.viscous[2],
        ]
    }
}

impl std::ops::AddAssign for WallForce {
    fn add_assign(&mut self, rhs: Self) {
        for d in 0..3 {
            self.inviscid[d] += rhs.inviscid[d];
            self.viscous[d] += rhs.viscous[d];
        }
    }
}

/// Interior (or periodic) face, or boundary face.
#[derive(Clone, Debug)]
pub enum Face {
    Interior(InteriorFace),
    Boundary(BoundaryFace),
}

impl Face {
    /// Build every face of `mesh`, matching flux points across interfaces.
    pub fn build_all(mesh: &Mesh, elements: &[Element], ctx: &Context<'_>) -> Result<Vec<Face>> {
        mesh.faces
            .iter()
            .map(|mf| match (mf.right, mf.boundary_tag) {
                (Some(right), _) => {
                    let offset = mesh.face_centroid(right) - mesh.face_centroid(mf.left);
                    InteriorFace::new(mf.left, right, offset, elements, ctx).map(Face::Interior)
                }
                (None, tag) => Ok(Face::Boundary(BoundaryFace::new(
                    mf.left,
                    tag.unwrap_or_default(),
                    elements,
                    ctx,
                ))),
            })
            .collect()
    }

    /// Common solution for the viscous gradient correction.
    pub fn calc_common_solution(&mut self, elements: &[Element], ctx: &Context<'_>) {
        match self {
            Face::Interior(f) => f.calc_common_solution(elements, ctx),
            Face::Boundary(f) => f.calc_common_solution(elements, ctx),
        }
    }

    /// Common normal flux (inviscid, plus viscous when enabled).
    pub fn calc_common_flux(&mut self, elements: &[Element], ctx: &Context<'_>) {
        match self {
            Face::Interior(f) => f.calc_common_flux(elements, ctx),
            Face::Boundary(f) => f.calc_common_flux(elements, ctx),
        }
    }

    /// Write the common solution into the elements.
    pub fn scatter_common_solution(&self, elements: &mut [Element]) {
        match self {
            Face::Interior(f) => f.scatter_common_solution(elements),
            Face::Boundary(f) => f.scatter_common_solution(elements),
        }
    }

    /// Write the common normal flux into the elements.
    pub fn scatter_common_flux(&self, elements: &mut [Element]) {
        match self {
            Face::Interior(f) => f.scatter_common_flux(elements),
            Face::Boundary(f) => f.scatter_common_flux(elements),
        }
    }

    /// Owning side.
    pub fn left(&self) -> ElementFace {
        match self {
            Face::Interior(f) => f.left,
            Face::Boundary(f) => f.left,
        }
    }
}

/// Flux-point indices of one element face, in the element's order.
pub(crate) fn face_fpts(ops_fpts_per_face: usize, face: usize) -> Vec<usize> {
    (face * ops_fpts_per_face..(face + 1) * ops_fpts_per_face).collect()
}

/// Row `fpt` of a point-by-field matrix.
#[inline]
pub(crate) fn row(m: &Mat<f64>, fpt: usize, n_fields: usize) -> State {
    let mut out = [0.0; MAX_FIELDS];
    for k in 0..n_fields {
        out[k] = m[(fpt, k)];
    }
    out
}

/// Physical viscous normal flux of an element at one of its flux points.
pub(crate) fn viscous_normal_flux(
    ele: &Element,
    physics: &impl Physics,
    fpt: usize,
    normal: &Point,
) -> State {
    let u = row(&ele.u_fpts, fpt, ele.n_fields);
    let mut grad: Tensor = [[0.0; MAX_FIELDS]; 3];
    for d in 0..ele.n_dims {
        for k in 0..ele.n_fields {
            grad[d][k] = ele.grad_u_fpts[d][(fpt, k)];
        }
    }
    let mut flux: Tensor = [[0.0; MAX_FIELDS]; 3];
    physics.add_viscous_flux(&u, &grad, &mut flux);
    normal_flux(&flux, normal, ele.n_dims, ele.n_fields)
}
