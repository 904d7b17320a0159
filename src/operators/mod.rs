//! FR operators: interpolation, differentiation and correction matrices.
//!
//! This module provides:
//! - Point layouts for solution, flux and plot points (`points`)
//! - Dense operators for one (shape, order, point set) combination (`Operators`)
//! - A shared, read-only registry of operators keyed by that triple (`OperatorLibrary`)
//!
//! Element arrays are stored with points along rows and fields along columns,
//! so every operator application is a single matrix product.

mod library;
mod modal;
mod points;

pub use library::{OperatorKey, OperatorLibrary};
pub use points::{
    flux_point_location, flux_points, plot_points_1d, solution_points, spt_linear_index,
    spt_tensor_index, FluxPointInfo,
};

use faer::linalg::matmul::matmul;
use faer::{Accum, Mat, Par};

use crate::config::PointSet;
use crate::error::{FrError, Result};
use crate::geometry::{ElementShape, Point};
use crate::polynomial::{
    correction_derivative_right, gauss_legendre_nodes, gauss_legendre_weights, lagrange,
    lagrange_derivative, points_1d, weights_1d,
};

/// Tensor-product Lagrange interpolation matrix from a 1D node set to `targets`.
///
/// Rows are targets, columns the tensor nodes (x fastest).
pub fn tensor_interpolation(pts_1d: &[f64], n_dims: usize, targets: &[Point]) -> Mat<f64> {
    let n1d = pts_1d.len();
    let n_src = n1d.pow(n_dims as u32);
    Mat::from_fn(targets.len(), n_src, |t, s| {
        let idx = spt_tensor_index(s, n1d, n_dims);
        (0..n_dims)
            .map(|d| lagrange(pts_1d, targets[t][d], idx[d]))
            .product()
    })
}

/// Gauss-Legendre tensor quadrature with `n_points` points per direction.
pub fn quadrature_rule(n_dims: usize, n_points: usize) -> (Vec<Point>, Vec<f64>) {
    let nodes = gauss_legendre_nodes(n_points);
    let w1d = gauss_legendre_weights(&nodes);
    let locs = solution_points(n_dims, &nodes);
    let weights = (0..locs.len())
        .map(|q| {
            let idx = spt_tensor_index(q, n_points, n_dims);
            (0..n_dims).map(|d| w1d[idx[d]]).product()
        })
        .collect();
    (locs, weights)
}

/// Operators for a single element type, order and point family.
#[derive(Clone)]
pub struct Operators {
    /// Element shape
    pub shape: ElementShape,
    /// Polynomial order
    pub order: usize,
    /// Point family
    pub point_set: PointSet,
    /// Spatial dimension
    pub n_dims: usize,
    /// Number of solution points ((p+1)^d)
    pub n_spts: usize,
    /// Number of flux points
    pub n_fpts: usize,
    /// Number of plot points ((p+3)^d)
    pub n_ppts: usize,
    /// 1D solution point coordinates
    pub pts_1d: Vec<f64>,
    /// Reference solution point locations
    pub loc_spts: Vec<Point>,
    /// Reference flux point locations
    pub loc_fpts: Vec<Point>,
    /// Reference plot point locations
    pub loc_ppts: Vec<Point>,
    /// Face, normal axis and tangential indices of each flux point
    pub fpt_info: Vec<FluxPointInfo>,
    /// Reference outward unit normal at each flux point
    pub tnorm_fpts: Vec<Point>,
    /// Volume quadrature weights at solution points
    pub weights_spts: Vec<f64>,
    /// Face quadrature weights at flux points
    pub weights_fpts: Vec<f64>,
    /// Extrapolation spts -> fpts (n_fpts x n_spts)
    interp_fpts: Mat<f64>,
    /// Derivative along each reference axis at spts (n_spts x n_spts)
    grad_spts: Vec<Mat<f64>>,
    /// Correction-function derivatives (n_spts x n_fpts)
    corr_div: Mat<f64>,
    /// Interpolation spts -> plot points (n_ppts x n_spts)
    interp_ppts: Mat<f64>,
    /// Modal sensor and filter
    modal: modal::ModalFilter,
}

impl Operators {
    /// Build operators for quads or hexes.
    pub fn new(shape: ElementShape, order: usize, point_set: PointSet) -> Result<Self> {
        if !shape.has_fr_operators() {
            return Err(FrError::UnsupportedElement {
                shape,
                n_nodes: shape.n_corners(),
                reason: "flux reconstruction operators exist for quads and hexes only",
            });
        }
        if point_set == PointSet::Lobatto && order == 0 {
            return Err(FrError::UnsupportedOrder {
                order,
                reason: "Gauss-Lobatto points need order >= 1",
            });
        }

        let n_dims = shape.n_dims();
        let pts_1d = points_1d(point_set, order);
        let w_1d = weights_1d(point_set, order);
        let n1d = pts_1d.len();

        let loc_spts = solution_points(n_dims, &pts_1d);
        let n_spts = loc_spts.len();
        let weights_spts: Vec<f64> = (0..n_spts)
            .map(|s| {
                let idx = spt_tensor_index(s, n1d, n_dims);
                (0..n_dims).map(|d| w_1d[idx[d]]).product()
            })
            .collect();

        let fpt_info = flux_points(shape, n1d);
        let n_fpts = fpt_info.len();
        let loc_fpts: Vec<Point> = fpt_info
            .iter()
            .map(|f| flux_point_location(f, n_dims, &pts_1d))
            .collect();
        let tnorm_fpts: Vec<Point> = fpt_info.iter().map(|f| shape.ref_normal(f.face)).collect();
        let weights_fpts: Vec<f64> = fpt_info
            .iter()
            .map(|f| {
                (0..n_dims)
                    .filter(|&d| d != f.normal_dim)
                    .map(|d| w_1d[f.tang[d]])
                    .product()
            })
            .collect();

        let ppts_1d = plot_points_1d(&pts_1d);
        let loc_ppts = solution_points(n_dims, &ppts_1d);

        let interp_fpts = tensor_interpolation(&pts_1d, n_dims, &loc_fpts);
        let interp_ppts = tensor_interpolation(&pts_1d, n_dims, &loc_ppts);

        let grad_spts = (0..n_dims)
            .map(|dim| {
                Mat::from_fn(n_spts, n_spts, |i, j| {
                    let ii = spt_tensor_index(i, n1d, n_dims);
                    let jj = spt_tensor_index(j, n1d, n_dims);
                    let mut val = 1.0;
                    for d in 0..n_dims {
                        if d == dim {
                            val *= lagrange_derivative(&pts_1d, pts_1d[ii[d]], jj[d]);
                        } else if ii[d] != jj[d] {
                            return 0.0;
                        }
                    }
                    val
                })
            })
            .collect();

        // Nonzero only along the line of solution points normal to the face.
        let corr_div = Mat::from_fn(n_spts, n_fpts, |i, f| {
            let info = &fpt_info[f];
            let ii = spt_tensor_index(i, n1d, n_dims);
            let on_line = (0..n_dims)
                .filter(|&d| d != info.normal_dim)
                .all(|d| ii[d] == info.tang[d]);
            if on_line {
                let xi = pts_1d[ii[info.normal_dim]];
                correction_derivative_right(order, f64::from(info.sign) * xi)
            } else {
                0.0
            }
        });

        let modal = modal::ModalFilter::new(order, n_dims, &pts_1d);

        Ok(Self {
            shape,
            order,
            point_set,
            n_dims,
            n_spts,
            n_fpts,
            n_ppts: loc_ppts.len(),
            pts_1d,
            loc_spts,
            loc_fpts,
            loc_ppts,
            fpt_info,
            tnorm_fpts,
            weights_spts,
            weights_fpts,
            interp_fpts,
            grad_spts,
            corr_div,
            interp_ppts,
            modal,
        })
    }

    /// Number of flux points on one face.
    pub fn n_fpts_per_face(&self) -> usize {
        self.n_fpts / self.shape.n_faces()
    }

    /// Extrapolate solution-point data to the flux points.
    pub fn apply_spts_fpts(&self, u_spts: &Mat<f64>, u_fpts: &mut Mat<f64>) {
        matmul(
            u_fpts.as_mut(),
            Accum::Replace,
            self.interp_fpts.as_ref(),
            u_spts.as_ref(),
            1.0,
            Par::Seq,
        );
    }

    /// Reference-space gradient of solution-point data, one matrix per axis.
    pub fn apply_grad_spts(&self, u_spts: &Mat<f64>, du_spts: &mut [Mat<f64>]) {
        for (grad, du) in self.grad_spts.iter().zip(du_spts.iter_mut()) {
            matmul(
                du.as_mut(),
                Accum::Replace,
                grad.as_ref(),
                u_spts.as_ref(),
                1.0,
                Par::Seq,
            );
        }
    }

    /// Reference divergence `Σ_d ∂F_d/∂ξ_d` of a flux stored per axis.
    pub fn apply_div_f_spts(&self, f_spts: &[Mat<f64>], div_f: &mut Mat<f64>) {
        for (dim, (grad, f)) in self.grad_spts.iter().zip(f_spts).enumerate() {
            let accum = if dim == 0 { Accum::Replace } else { Accum::Add };
            matmul(
                div_f.as_mut(),
                accum,
                grad.as_ref(),
                f.as_ref(),
                1.0,
                Par::Seq,
            );
        }
    }

    /// Normal flux at the flux points: `Σ_d F_d n_d`, optionally scaled per point.
    ///
    /// Pass the reference normals and no scale for fluxes already in
    /// reference space, or physical normals with the face-area scale for
    /// physical fluxes.
    pub fn apply_extrapolate_fn(
        &self,
        f_spts: &[Mat<f64>],
        normals: &[Point],
        scale: Option<&[f64]>,
        disfn_fpts: &mut Mat<f64>,
    ) {
        let n_fields = f_spts[0].ncols();
        let mut f_fpts = Mat::<f64>::zeros(self.n_fpts, n_fields);
        for (dim, f) in f_spts.iter().enumerate() {
            self.apply_spts_fpts(f, &mut f_fpts);
            for fpt in 0..self.n_fpts {
                let n = normals[fpt][dim] * scale.map_or(1.0, |s| s[fpt]);
                for k in 0..n_fields {
                    let val = f_fpts[(fpt, k)] * n;
                    if dim == 0 {
                        disfn_fpts[(fpt, k)] = val;
                    } else {
                        disfn_fpts[(fpt, k)] += val;
                    }
                }
            }
        }
    }

    /// Add the FR correction of the normal-flux jump to the divergence.
    pub fn apply_correct_div_f(&self, dfn_fpts: &Mat<f64>, div_f: &mut Mat<f64>) {
        matmul(
            div_f.as_mut(),
            Accum::Add,
            self.corr_div.as_ref(),
            dfn_fpts.as_ref(),
            1.0,
            Par::Seq,
        );
    }

    /// Add the correction of the common-solution jump to the reference gradient.
    pub fn apply_correct_grad_u(&self, duc_fpts: &Mat<f64>, du_spts: &mut [Mat<f64>]) {
        let n_fields = duc_fpts.ncols();
        for (dim, du) in du_spts.iter_mut().enumerate() {
            let scaled = Mat::from_fn(self.n_fpts, n_fields, |f, k| {
                duc_fpts[(f, k)] * self.tnorm_fpts[f][dim]
            });
            matmul(
                du.as_mut(),
                Accum::Add,
                self.corr_div.as_ref(),
                scaled.as_ref(),
                1.0,
                Par::Seq,
            );
        }
    }

    /// Jacobian-weighted element average of every field.
    pub fn calc_avg(&self, u_spts: &Mat<f64>, det_spts: &[f64]) -> Vec<f64> {
        let mut avg = vec![0.0; u_spts.ncols()];
        let mut vol = 0.0;
        for spt in 0..self.n_spts {
            let w = self.weights_spts[spt] * det_spts[spt];
            vol += w;
            for (k, a) in avg.iter_mut().enumerate() {
                *a += w * u_spts[(spt, k)];
            }
        }
        for a in avg.iter_mut() {
            *a /= vol;
        }
        avg
    }

    /// Interpolation matrix from the solution points to arbitrary reference points.
    pub fn interpolation_to(&self, targets: &[Point]) -> Mat<f64> {
        tensor_interpolation(&self.pts_1d, self.n_dims, targets)
    }

    /// Interpolate solution-point data to arbitrary reference points.
    pub fn interpolate_spts_to_points(&self, u_spts: &Mat<f64>, targets: &[Point]) -> Mat<f64> {
        &self.interpolation_to(targets) * u_spts
    }

    /// Interpolate solution-point data to the plot grid.
    pub fn apply_spts_ppts(&self, u_spts: &Mat<f64>, u_ppts: &mut Mat<f64>) {
        matmul(
            u_ppts.as_mut(),
            Accum::Replace,
            self.interp_ppts.as_ref(),
            u_spts.as_ref(),
            1.0,
            Par::Seq,
        );
    }

    /// Matrix taking data on another order's solution points to this one's.
    ///
    /// Used for order changes on restart and for p-multigrid transfer:
    /// prolongation is exact, restriction interpolates.
    pub fn interpolation_from(&self, src_pts_1d: &[f64]) -> Mat<f64> {
        tensor_interpolation(src_pts_1d, self.n_dims, &self.loc_spts)
    }

    /// Matrix taking data stored at `from_order` (same shape and point
    /// family) to this order's solution points.
    pub fn order_change_matrix(&self, from_order: usize) -> Mat<f64> {
        self.interpolation_from(&points_1d(self.point_set, from_order))
    }

    /// Prolongation from a coarser operator set to this one.
    pub fn prolongation_from(&self, coarse: &Operators) -> Mat<f64> {
        self.interpolation_from(&coarse.pts_1d)
    }

    /// Restriction from this operator set to a coarser one.
    pub fn restriction_to(&self, coarse: &Operators) -> Mat<f64> {
        coarse.interpolation_from(&self.pts_1d)
    }

    /// Modal sensor on the density column; filters every field above `threshold`.
    ///
    /// Returns the sensor value.
    pub fn shock_capture(&self, u_spts: &mut Mat<f64>, threshold: f64) -> f64 {
        let sensor = self.modal.sensor(u_spts);
        if sensor > threshold {
            self.modal.filter(u_spts);
        }
        sensor
    }

    /// Modal sensor on the density column without filtering.
    pub fn shock_sensor(&self, u_spts: &Mat<f64>) -> f64 {
        self.modal.sensor(u_spts)
    }
}
