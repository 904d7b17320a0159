//! Polynomial building blocks.
//!
//! - Legendre polynomials and derivatives
//! - Gauss-Legendre and Gauss-Lobatto points and weights
//! - Lagrange interpolation on 1D point sets
//! - FR correction functions and CFL limits

mod correction;
mod lagrange;
mod legendre;
mod nodes;

pub use correction::{cfl_limit, correction_derivative_left, correction_derivative_right};
pub use lagrange::{lagrange, lagrange_derivative};
pub use legendre::{legendre, legendre_and_derivative, legendre_derivative, legendre_norm_sq};
pub use nodes::{
    gauss_legendre_nodes, gauss_legendre_weights, gauss_lobatto_nodes, gauss_lobatto_weights,
    points_1d, weights_1d,
};
