//! Time integration.
//!
//! Explicit Runge-Kutta schemes in the two-array form used by the solver
//! driver, see [`RkScheme`].

mod rk;

pub use rk::{IntegratorInfo, RkScheme};
