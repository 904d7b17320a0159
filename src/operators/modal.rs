//! Modal shock sensor and exponential filter.
//!
//! Nodal values are mapped to tensor-product orthonormal Legendre modes with
//! the inverse Vandermonde matrix:
//! - V[i,m] = φ_m(x_i), φ_(a,b,c) = P̃_a(ξ) P̃_b(η) P̃_c(ζ)
//! - modes = V^{-1} * nodal
//!
//! The sensor is the share of modal energy in the highest-degree modes; the
//! filter damps mode m by `exp(-36 η^8)` with `η = deg(m) / p`.

use faer::linalg::matmul::matmul;
use faer::linalg::solvers::Solve;
use faer::{Accum, Mat, Par};

use super::points::spt_tensor_index;
use crate::polynomial::{legendre, legendre_norm_sq};

const FILTER_ALPHA: f64 = 36.0;
const FILTER_EXPONENT: i32 = 8;

#[derive(Clone)]
pub(super) struct ModalFilter {
    order: usize,
    /// Nodal -> modal
    v_inv: Mat<f64>,
    /// V diag(σ) V^{-1}
    filter: Mat<f64>,
    /// Modes whose maximum per-axis degree equals the order
    high_modes: Vec<usize>,
}

impl ModalFilter {
    pub(super) fn new(order: usize, n_dims: usize, pts_1d: &[f64]) -> Self {
        let n1d = pts_1d.len();
        let n = n1d.pow(n_dims as u32);

        let v = Mat::from_fn(n, n, |i, m| {
            let xi = spt_tensor_index(i, n1d, n_dims);
            let deg = spt_tensor_index(m, n1d, n_dims);
            (0..n_dims)
                .map(|d| legendre(deg[d], pts_1d[xi[d]]) / legendre_norm_sq(deg[d]).sqrt())
                .product::<f64>()
        });
        let identity = Mat::<f64>::identity(n, n);
        let v_inv = v.as_ref().partial_piv_lu().solve(&identity);
        debug_assert!(
            (0..n).all(|j| (0..n).all(|i| v_inv[(i, j)].is_finite())),
            "singular modal Vandermonde"
        );

        let max_degree = |m: usize| {
            let deg = spt_tensor_index(m, n1d, n_dims);
            deg[..n_dims].iter().copied().max().unwrap_or(0)
        };
        let sigma: Vec<f64> = (0..n)
            .map(|m| {
                if order == 0 {
                    1.0
                } else {
                    let eta = max_degree(m) as f64 / order as f64;
                    (-FILTER_ALPHA * eta.powi(FILTER_EXPONENT)).exp()
                }
            })
            .collect();
        let scaled = Mat::from_fn(n, n, |i, j| v[(i, j)] * sigma[j]);
        let filter = &scaled * &v_inv;

        let high_modes = (0..n).filter(|&m| order > 0 && max_degree(m) == order).collect();

        Self {
            order,
            v_inv,
            filter,
            high_modes,
        }
    }

    /// Fraction of density modal energy in the highest modes.
    pub(super) fn sensor(&self, u_spts: &Mat<f64>) -> f64 {
        if self.order == 0 {
            return 0.0;
        }
        let n = self.v_inv.nrows();
        let mut total = 0.0;
        let mut modes = vec![0.0f64; n];
        for (m, c) in modes.iter_mut().enumerate() {
            *c = (0..n).map(|i| self.v_inv[(m, i)] * u_spts[(i, 0)]).sum();
            total += *c * *c;
        }
        if total <= f64::MIN_POSITIVE {
            return 0.0;
        }
        let high: f64 = self.high_modes.iter().map(|&m| modes[m] * modes[m]).sum();
        high / total
    }

    /// Apply the exponential filter to every field in place.
    pub(super) fn filter(&self, u_spts: &mut Mat<f64>) {
        let mut out = Mat::<f64>::zeros(u_spts.nrows(), u_spts.ncols());
        matmul(
            out.as_mut(),
            Accum::Replace,
            self.filter.as_ref(),
            u_spts.as_ref(),
            1.0,
            Par::Seq,
        );
        u_spts.clone_from(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PointSet;
    use crate::polynomial::points_1d;
    use approx::assert_relative_eq;

    #[test]
    fn test_smooth_field_has_small_sensor() {
        let pts = points_1d(PointSet::Legendre, 3);
        let f = ModalFilter::new(3, 2, &pts);
        let u = Mat::from_fn(16, 1, |i, _| {
            let idx = spt_tensor_index(i, 4, 2);
            1.0 + 0.1 * pts[idx[0]] + 0.05 * pts[idx[1]]
        });
        assert!(f.sensor(&u) < 1e-12);
    }

    #[test]
    fn test_oscillating_field_triggers_sensor() {
        let pts = points_1d(PointSet::Legendre, 3);
        let f = ModalFilter::new(3, 2, &pts);
        let u = Mat::from_fn(16, 1, |i, _| if i % 2 == 0 { 1.0 } else { 0.2 });
        assert!(f.sensor(&u) > 0.05);
    }

    #[test]
    fn test_filter_preserves_constants() {
        let pts = points_1d(PointSet::Legendre, 2);
        let f = ModalFilter::new(2, 3, &pts);
        let mut u = Mat::from_fn(27, 2, |_, k| 1.5 + k as f64);
        f.filter(&mut u);
        for i in 0..27 {
            assert_relative_eq!(u[(i, 0)], 1.5, epsilon = 1e-12);
            assert_relative_eq!(u[(i, 1)], 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_hex_inverse_vandermonde_is_finite() {
        for order in 1..=3 {
            let pts = points_1d(PointSet::Legendre, order);
            let f = ModalFilter::new(order, 3, &pts);
            let n = (order + 1).pow(3);
            assert_eq!(f.v_inv.nrows(), n);
            for i in 0..n {
                for j in 0..n {
                    assert!(f.v_inv[(i, j)].is_finite());
                }
            }
            // Constant field maps to the (0,0,0) mode only.
            let u = Mat::from_fn(n, 1, |_, _| 2.0);
            assert!(f.sensor(&u) < 1e-12);
        }
    }
}
