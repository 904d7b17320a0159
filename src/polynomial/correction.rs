//! Flux Reconstruction correction functions and stability limits.
//!
//! The DG-recovering correction is the right Radau polynomial
//! g_R = (P_p + P_{p+1}) / 2, which is 1 at x = 1 and 0 at x = -1. The
//! left function is its mirror, g_L(x) = g_R(-x).

use super::legendre::legendre_derivative;
use crate::error::{FrError, Result};

/// g_R'(x) for the DG correction at order `order`.
pub fn correction_derivative_right(order: usize, x: f64) -> f64 {
    0.5 * (legendre_derivative(order, x) + legendre_derivative(order + 1, x))
}

/// g_L'(x) = -g_R'(-x).
pub fn correction_derivative_left(order: usize, x: f64) -> f64 {
    -correction_derivative_right(order, -x)
}

/// Largest stable CFL number of the DG scheme with four-stage RK, by order.
const CFL_LIMITS: [f64; 6] = [1.392, 0.4642, 0.2351, 0.1453, 0.1000, 0.0736];

/// Order-dependent CFL limit factor.
pub fn cfl_limit(order: usize) -> Result<f64> {
    CFL_LIMITS
        .get(order)
        .copied()
        .ok_or(FrError::UnsupportedOrder {
            order,
            reason: "no CFL limit tabulated above order 5",
        })
}
