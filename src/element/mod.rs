//! Element state container.
//!
//! An [`Element`] owns every point-indexed array of one mesh cell: solution,
//! fluxes, gradients, per-stage divergences and the geometric transforms at
//! its solution and flux points. Shared, read-only data (operators, physics
//! and configuration) is passed in through a [`Context`].
//!
//! Arrays are `faer::Mat<f64>` with points along rows and fields along
//! columns. Per-axis quantities are stored as one matrix per axis.
//!
//! Operations are split by concern:
//! - geometry and transforms (this file)
//! - fluxes, gradients and the FR correction (`flux`)
//! - time stepping and wave speeds (`time`)
//! - positivity and entropy squeezing (`squeeze`)
//! - primitives, norms, errors and plot data (`diagnostics`)

mod diagnostics;
mod flux;
mod squeeze;
mod time;

pub use diagnostics::PlotData;

use faer::Mat;

use crate::config::SolverConfig;
use crate::error::{FrError, PointKind, Result};
use crate::geometry::{
    jacobian, transformed_normal, ElementGeometry, ElementShape, Point, PointTransform,
};
use crate::mesh::CellStatus;
use crate::operators::{OperatorKey, OperatorLibrary, Operators};
use crate::physics::Equations;
use crate::time::IntegratorInfo;

/// Read-only data shared by every element and face during a residual.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Run configuration
    pub config: &'a SolverConfig,
    /// Equation set
    pub physics: &'a Equations,
    /// Operator registry
    pub ops: &'a OperatorLibrary,
}

/// One flux-reconstruction element.
#[derive(Clone)]
pub struct Element {
    /// Cell index in the mesh
    pub id: usize,
    /// Element shape
    pub shape: ElementShape,
    /// Polynomial order
    pub order: usize,
    /// Operators for (shape, order, point set)
    pub ops: OperatorKey,
    /// Spatial dimension
    pub n_dims: usize,
    /// Conserved fields
    pub n_fields: usize,
    /// Solution points
    pub n_spts: usize,
    /// Flux points
    pub n_fpts: usize,
    /// Overset status
    pub status: CellStatus,
    /// Whether the mesh moves
    pub moving: bool,

    /// Current node positions
    pub nodes: Vec<Point>,
    /// Current node velocities
    pub node_vel: Vec<Point>,

    shape_spts: Vec<Vec<f64>>,
    shape_fpts: Vec<Vec<f64>>,
    dshape_spts: Vec<Vec<[f64; 3]>>,
    dshape_fpts: Vec<Vec<[f64; 3]>>,

    /// Physical positions of the solution points
    pub pos_spts: Vec<Point>,
    /// Physical positions of the flux points
    pub pos_fpts: Vec<Point>,
    /// Grid velocity at the solution points
    pub grid_vel_spts: Vec<Point>,
    /// Grid velocity at the flux points
    pub grid_vel_fpts: Vec<Point>,
    /// Jacobian, adjugate and determinant at the solution points
    pub transform_spts: Vec<PointTransform>,
    /// Jacobian, adjugate and determinant at the flux points
    pub transform_fpts: Vec<PointTransform>,
    /// Physical unit outward normals at the flux points
    pub norm_fpts: Vec<Point>,
    /// Face-area scale at the flux points (0 on collapsed faces)
    pub da_fpts: Vec<f64>,

    /// Solution at the solution points
    pub u_spts: Mat<f64>,
    /// Solution at the flux points
    pub u_fpts: Mat<f64>,
    /// Solution at the start of the time step
    pub u0: Mat<f64>,
    /// Common solution at the flux points
    pub uc_fpts: Mat<f64>,
    /// Common minus discontinuous solution at the flux points
    pub duc_fpts: Mat<f64>,
    /// Flux at the solution points, one matrix per axis
    pub f_spts: Vec<Mat<f64>>,
    /// Discontinuous normal flux at the flux points
    pub disfn_fpts: Mat<f64>,
    /// Common normal flux at the flux points (scaled by dA)
    pub fn_fpts: Mat<f64>,
    /// Common minus discontinuous normal flux
    pub dfn_fpts: Mat<f64>,
    /// Reference-space gradient of U at the solution points
    pub grad_u_ref: Vec<Mat<f64>>,
    /// Physical gradient of U at the solution points
    pub grad_u_spts: Vec<Mat<f64>>,
    /// Physical gradient of U at the flux points
    pub grad_u_fpts: Vec<Mat<f64>>,
    /// Flux divergence (times detJ) per RK stage
    pub div_f_spts: Vec<Mat<f64>>,
    /// p-multigrid source term
    pub src_spts: Option<Mat<f64>>,
    /// `∂F_b/∂ξ_a` at index `a * n_dims + b` (moving meshes only)
    df_ref: Vec<Mat<f64>>,

    /// Characteristic speed times the face metric at the flux points
    pub wave_sp_fpts: Vec<f64>,
    /// Local time step
    pub dt: f64,
    /// Last shock-sensor value
    pub sensor: f64,
    /// Last element average
    pub u_avg: Vec<f64>,
    /// Entropy-error sensor at the solution points
    pub entropy_err_spts: Vec<f64>,
}

impl Element {
    /// Build an element, its point tables and transforms.
    ///
    /// Fails on unsupported shapes or node counts and on a negative
    /// Jacobian anywhere.
    pub fn new(
        id: usize,
        shape: ElementShape,
        nodes: Vec<Point>,
        node_vel: Vec<Point>,
        order: usize,
        ctx_ops: &mut OperatorLibrary,
        config: &SolverConfig,
    ) -> Result<Self> {
        shape.check_nodes(nodes.len())?;
        if !shape.has_fr_operators() {
            return Err(FrError::UnsupportedElement {
                shape,
                n_nodes: nodes.len(),
                reason: "the solver supports quads and hexes",
            });
        }
        let key = ctx_ops.get_or_build(shape, order, config.point_set)?;
        let ops = &ctx_ops[key];

        let n_dims = shape.n_dims();
        let n_fields = config.n_fields();
        let n_spts = ops.n_spts;
        let n_fpts = ops.n_fpts;
        let n_nodes = nodes.len();

        let mut shape_spts = Vec::with_capacity(n_spts);
        let mut dshape_spts = Vec::with_capacity(n_spts);
        for loc in &ops.loc_spts {
            let mut n = Vec::new();
            let mut dn = Vec::new();
            shape.shape(n_nodes, loc, &mut n);
            shape.dshape(n_nodes, loc, &mut dn);
            shape_spts.push(n);
            dshape_spts.push(dn);
        }
        let mut shape_fpts = Vec::with_capacity(n_fpts);
        let mut dshape_fpts = Vec::with_capacity(n_fpts);
        for loc in &ops.loc_fpts {
            let mut n = Vec::new();
            let mut dn = Vec::new();
            shape.shape(n_nodes, loc, &mut n);
            shape.dshape(n_nodes, loc, &mut dn);
            shape_fpts.push(n);
            dshape_fpts.push(dn);
        }

        let moving = config.is_moving();
        let need_grad = config.viscous || moving;
        let per_dim = |rows: usize| (0..n_dims).map(|_| Mat::zeros(rows, n_fields)).collect();
        let per_dim_sq = |n: usize| (0..n).map(|_| Mat::zeros(n_spts, n_fields)).collect();
        let n_stages = config.rk.n_stages();

        let mut ele = Self {
            id,
            shape,
            order,
            ops: key,
            n_dims,
            n_fields,
            n_spts,
            n_fpts,
            status: CellStatus::Normal,
            moving,
            nodes,
            node_vel,
            shape_spts,
            shape_fpts,
            dshape_spts,
            dshape_fpts,
            pos_spts: vec![Point::zero(); n_spts],
            pos_fpts: vec![Point::zero(); n_fpts],
            grid_vel_spts: vec![Point::zero(); n_spts],
            grid_vel_fpts: vec![Point::zero(); n_fpts],
            transform_spts: vec![PointTransform::default(); n_spts],
            transform_fpts: vec![PointTransform::default(); n_fpts],
            norm_fpts: vec![Point::zero(); n_fpts],
            da_fpts: vec![0.0; n_fpts],
            u_spts: Mat::zeros(n_spts, n_fields),
            u_fpts: Mat::zeros(n_fpts, n_fields),
            u0: Mat::zeros(n_spts, n_fields),
            uc_fpts: Mat::zeros(n_fpts, n_fields),
            duc_fpts: Mat::zeros(n_fpts, n_fields),
            f_spts: per_dim(n_spts),
            disfn_fpts: Mat::zeros(n_fpts, n_fields),
            fn_fpts: Mat::zeros(n_fpts, n_fields),
            dfn_fpts: Mat::zeros(n_fpts, n_fields),
            grad_u_ref: if need_grad { per_dim(n_spts) } else { Vec::new() },
            grad_u_spts: if need_grad { per_dim(n_spts) } else { Vec::new() },
            grad_u_fpts: if config.viscous { per_dim(n_fpts) } else { Vec::new() },
            div_f_spts: (0..n_stages).map(|_| Mat::zeros(n_spts, n_fields)).collect(),
            src_spts: config.pmg.as_ref().map(|_| Mat::zeros(n_spts, n_fields)),
            df_ref: if moving { per_dim_sq(n_dims * n_dims) } else { Vec::new() },
            wave_sp_fpts: vec![0.0; n_fpts],
            dt: config.dt,
            sensor: 0.0,
            u_avg: vec![0.0; n_fields],
            entropy_err_spts: vec![0.0; n_spts],
        };
        ele.calc_transforms(ops)?;
        Ok(ele)
    }

    /// Geometric view of the current nodes.
    pub fn geometry(&self) -> ElementGeometry<'_> {
        ElementGeometry::new(self.shape, &self.nodes)
    }

    /// Determinant of the Jacobian at solution point `spt`.
    #[inline]
    pub fn det_spt(&self, spt: usize) -> f64 {
        self.transform_spts[spt].det
    }

    /// Determinants at every solution point.
    pub fn det_spts(&self) -> Vec<f64> {
        self.transform_spts.iter().map(|t| t.det).collect()
    }

    /// Physical position of a reference location.
    pub fn calc_pos(&self, loc: &Point) -> Point {
        self.geometry().calc_pos(loc)
    }

    /// Reference location of a physical point (Newton, then Nelder-Mead).
    pub fn ref_loc(&self, pos: &Point) -> Option<Point> {
        self.geometry().ref_loc(pos)
    }

    /// Axis-aligned bounding box of the nodes.
    pub fn bounding_box(&self) -> (Point, Point) {
        self.geometry().bounding_box()
    }

    /// Replace node positions and velocities and recompute every transform.
    pub fn move_nodes(&mut self, ops: &Operators, nodes: &[Point], vel: &[Point]) -> Result<()> {
        self.nodes.clear();
        self.nodes.extend_from_slice(nodes);
        self.node_vel.clear();
        self.node_vel.extend_from_slice(vel);
        self.calc_transforms(ops)
    }

    /// Positions, grid velocities, Jacobians and normals at every point.
    ///
    /// Solution points first, then flux points: the flux-point normals need
    /// the flux-point adjugates.
    pub fn calc_transforms(&mut self, ops: &Operators) -> Result<()> {
        let nd = self.n_dims;

        for spt in 0..self.n_spts {
            self.pos_spts[spt] = interpolate_nodes(&self.nodes, &self.shape_spts[spt]);
            self.grid_vel_spts[spt] = interpolate_nodes(&self.node_vel, &self.shape_spts[spt]);
            let t = PointTransform::from_jacobian(jacobian(&self.nodes, &self.dshape_spts[spt], nd));
            if t.det < 0.0 {
                return Err(FrError::NegativeJacobian {
                    element: self.id,
                    point_kind: PointKind::Solution,
                    point: spt,
                    det: t.det,
                });
            }
            self.transform_spts[spt] = t;
        }

        for fpt in 0..self.n_fpts {
            self.pos_fpts[fpt] = interpolate_nodes(&self.nodes, &self.shape_fpts[fpt]);
            self.grid_vel_fpts[fpt] = interpolate_nodes(&self.node_vel, &self.shape_fpts[fpt]);
            let t = PointTransform::from_jacobian(jacobian(&self.nodes, &self.dshape_fpts[fpt], nd));
            if t.det < 0.0 {
                return Err(FrError::NegativeJacobian {
                    element: self.id,
                    point_kind: PointKind::Flux,
                    point: fpt,
                    det: t.det,
                });
            }
            let (n, da) = transformed_normal(&t.adj, &ops.tnorm_fpts[fpt], nd);
            self.norm_fpts[fpt] = n;
            self.da_fpts[fpt] = da;
            self.transform_fpts[fpt] = t;
        }
        Ok(())
    }

    /// Copy the physical positions of the solution points into a flat slice
    /// (`n_spts * n_dims`, point-major).
    pub fn pos_spts_flat(&self) -> Vec<f64> {
        self.pos_spts
            .iter()
            .flat_map(|p| (0..self.n_dims).map(move |d| p[d]))
            .collect()
    }

    /// Overwrite the solution from a flat point-major slice.
    pub fn set_u_spts(&mut self, data: &[f64]) {
        for spt in 0..self.n_spts {
            for k in 0..self.n_fields {
                self.u_spts[(spt, k)] = data[spt * self.n_fields + k];
            }
        }
    }

    /// Copy the solution into a flat point-major vector.
    pub fn u_spts_flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_spts * self.n_fields);
        for spt in 0..self.n_spts {
            for k in 0..self.n_fields {
                out.push(self.u_spts[(spt, k)]);
            }
        }
        out
    }
}

#[inline]
fn interpolate_nodes(values: &[Point], weights: &[f64]) -> Point {
    values
        .iter()
        .zip(weights)
        .fold(Point::zero(), |acc, (v, w)| acc + *v * *w)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::Equation;
    use approx::assert_relative_eq;

    #[test]
    fn test_affine_square_transforms() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2);
        let mut lib = OperatorLibrary::new();
        let ele = build(square(1.0, 2.0, 2.0), &config, &mut lib);
        for t in &ele.transform_spts {
            assert_relative_eq!(t.det, 1.0, epsilon = 1e-14);
        }
        // bottom face normal points down, dA = h/2
        assert_relative_eq!(ele.norm_fpts[0].y, -1.0, epsilon = 1e-14);
        assert_relative_eq!(ele.da_fpts[0], 1.0, epsilon = 1e-14);
        let ops = &lib[ele.ops];
        for (f, p) in ele.pos_fpts.iter().enumerate() {
            let loc = ops.loc_fpts[f];
            assert_relative_eq!(p.x, 2.0 + loc.x, epsilon = 1e-14);
            assert_relative_eq!(p.y, 3.0 + loc.y, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_inverted_element_is_fatal() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 1);
        let mut lib = OperatorLibrary::new();
        let mut nodes = square(0.0, 0.0, 1.0);
        nodes.swap(1, 3);
        let res = Element::new(
            7,
            ElementShape::Quad,
            nodes,
            vec![Point::zero(); 4],
            1,
            &mut lib,
            &config,
        );
        match res {
            Err(FrError::NegativeJacobian { element, point_kind, .. }) => {
                assert_eq!(element, 7);
                assert_eq!(point_kind, PointKind::Solution);
            }
            _ => panic!("expected a negative Jacobian error"),
        }
    }

    #[test]
    fn test_collapsed_face_has_zero_area() {
        // Quad with the top edge collapsed to a point
        let config = SolverConfig::new(Equation::NavierStokes, 2, 1);
        let mut lib = OperatorLibrary::new();
        let nodes = vec![
            Point::new_2d(0.0, 0.0),
            Point::new_2d(1.0, 0.0),
            Point::new_2d(0.5, 1.0),
            Point::new_2d(0.5, 1.0),
        ];
        let ele = build(nodes, &config, &mut lib);
        let ops = &lib[ele.ops];
        for f in 0..ele.n_fpts {
            if ops.fpt_info[f].face == 2 {
                assert_eq!(ele.da_fpts[f], 0.0);
                assert_eq!(ele.norm_fpts[f], Point::zero());
            } else {
                assert_relative_eq!(ele.norm_fpts[f].norm(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_triangles_rejected() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 1);
        let mut lib = OperatorLibrary::new();
        let nodes = vec![Point::zero(), Point::new_2d(1.0, 0.0), Point::new_2d(0.0, 1.0)];
        let res = Element::new(0, ElementShape::Tri, nodes, vec![Point::zero(); 3], 1, &mut lib, &config);
        assert!(matches!(res, Err(FrError::UnsupportedElement { .. })));
    }

    #[test]
    fn test_move_nodes_updates_grid_velocity() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 1);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 1.0), &config, &mut lib);
        let nodes = square(0.5, 0.0, 1.0);
        let vel = vec![Point::new_2d(1.0, 0.0); 4];
        ele.move_nodes(&lib[ele.ops], &nodes, &vel).unwrap();
        for (p, v) in ele.pos_spts.iter().zip(&ele.grid_vel_spts) {
            assert!(p.x > 0.5);
            assert_relative_eq!(v.x, 1.0, epsilon = 1e-14);
        }
    }
}
