//! Interface fluxes.
//!
//! The inviscid common flux comes from a [`NumericalFlux`]; viscous terms use
//! the local discontinuous Galerkin (LDG) common solution and flux.

use super::{normal_flux, Physics, State, Tensor, MAX_FIELDS};
use crate::geometry::Point;

// =============================================================================
// Numerical Flux Trait
// =============================================================================

/// Inviscid common normal flux at an interface.
///
/// Fluxes are evaluated in the frame moving with the grid:
/// `F*·n ≈ (F - v_g U)·n`. Implementations must be consistent,
/// `F*(U, U) = (F(U) - v_g U)·n`.
pub trait NumericalFlux: Send + Sync {
    /// Common normal flux for left (owner) and right (neighbour or ghost)
    /// states along the owner's unit outward normal, written to `out`.
    fn compute<P: Physics + ?Sized>(
        &self,
        physics: &P,
        u_l: &[f64],
        u_r: &[f64],
        normal: &Point,
        grid_vel: &Point,
        out: &mut [f64],
    );

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Rusanov
// =============================================================================

/// Rusanov (local Lax-Friedrichs) flux.
///
/// Diffusive but robust; uses the larger of the two one-sided wave speeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rusanov;

impl Rusanov {
    fn moving_normal_flux<P: Physics + ?Sized>(
        physics: &P,
        u: &[f64],
        normal: &Point,
        grid_vel: &Point,
    ) -> State {
        let nd = physics.n_dims();
        let nf = physics.n_fields();
        let mut flux: Tensor = [[0.0; MAX_FIELDS]; 3];
        physics.inviscid_flux(u, &mut flux);
        let mut fn_ = normal_flux(&flux, normal, nd, nf);
        let vgn: f64 = (0..nd).map(|d| grid_vel[d] * normal[d]).sum();
        for k in 0..nf {
            fn_[k] -= vgn * u[k];
        }
        fn_
    }
}

impl NumericalFlux for Rusanov {
    #[inline]
    fn compute<P: Physics + ?Sized>(
        &self,
        physics: &P,
        u_l: &[f64],
        u_r: &[f64],
        normal: &Point,
        grid_vel: &Point,
        out: &mut [f64],
    ) {
        let f_l = Self::moving_normal_flux(physics, u_l, normal, grid_vel);
        let f_r = Self::moving_normal_flux(physics, u_r, normal, grid_vel);
        let lambda = physics
            .wave_speed(u_l, normal, grid_vel)
            .max(physics.wave_speed(u_r, normal, grid_vel));
        for k in 0..physics.n_fields() {
            out[k] = 0.5 * (f_l[k] + f_r[k]) - 0.5 * lambda * (u_r[k] - u_l[k]);
        }
    }

    fn name(&self) -> &'static str {
        "rusanov"
    }
}

// =============================================================================
// LDG viscous terms
// =============================================================================

/// LDG common solution `Uc = ½(U_L + U_R) - β (U_L - U_R)`.
#[inline]
pub fn ldg_common_solution(u_l: &[f64], u_r: &[f64], beta: f64, out: &mut [f64]) {
    for (k, o) in out.iter_mut().enumerate() {
        *o = 0.5 * (u_l[k] + u_r[k]) - beta * (u_l[k] - u_r[k]);
    }
}

/// LDG common viscous normal flux
/// `½(F_L + F_R)·n + β (F_L - F_R)·n + τ (U_L - U_R)`.
#[inline]
pub fn ldg_common_viscous_flux(
    fn_l: &[f64],
    fn_r: &[f64],
    u_l: &[f64],
    u_r: &[f64],
    beta: f64,
    tau: f64,
    out: &mut [f64],
) {
    for (k, o) in out.iter_mut().enumerate() {
        *o = 0.5 * (fn_l[k] + fn_r[k]) + beta * (fn_l[k] - fn_r[k]) + tau * (u_l[k] - u_r[k]);
    }
}
