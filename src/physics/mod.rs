//! Governing equations and interface fluxes.
//!
//! This module provides:
//! - The [`Physics`] trait: pointwise inviscid/viscous fluxes and wave speeds
//! - Compressible Navier-Stokes for an ideal gas ([`NavierStokes`])
//! - Linear advection-diffusion ([`AdvectionDiffusion`])
//! - Interface fluxes behind [`NumericalFlux`] plus the LDG viscous terms
//! - Initial conditions and exact solutions
//!
//! States are fixed-size arrays of [`MAX_FIELDS`] entries of which the first
//! `n_fields()` are used; fluxes and gradients carry one such array per axis.

mod advection;
mod initial;
mod navier_stokes;
mod riemann;

pub use advection::AdvectionDiffusion;
pub use initial::{exact_solution, initial_state, wrap_periodic};
pub use navier_stokes::NavierStokes;
pub use riemann::{ldg_common_solution, ldg_common_viscous_flux, NumericalFlux, Rusanov};

use crate::config::{Equation, SolverConfig};
use crate::geometry::Point;

/// Largest number of conserved fields (3D Navier-Stokes).
pub const MAX_FIELDS: usize = 5;

/// Conserved state at one point.
pub type State = [f64; MAX_FIELDS];

/// Per-axis vectors of field values (fluxes or gradients): `v[dim][field]`.
pub type Tensor = [[f64; MAX_FIELDS]; 3];

/// Pointwise physics of a conservation law.
pub trait Physics: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Number of conserved fields.
    fn n_fields(&self) -> usize;

    /// Spatial dimension.
    fn n_dims(&self) -> usize;

    /// Inviscid flux `F_d(U)`, overwriting `flux`.
    fn inviscid_flux(&self, u: &[f64], flux: &mut Tensor);

    /// Add the viscous flux for state `u` with physical gradient `grad`.
    fn add_viscous_flux(&self, u: &[f64], grad: &Tensor, flux: &mut Tensor);

    /// Largest characteristic speed along the unit `normal` relative to the grid.
    fn wave_speed(&self, u: &[f64], normal: &Point, grid_vel: &Point) -> f64;

    /// Speed used by the CFL bound. Defaults to the normal wave speed.
    fn cfl_wave_speed(&self, u: &[f64], normal: &Point, grid_vel: &Point) -> f64 {
        self.wave_speed(u, normal, grid_vel)
    }
}

/// The equation set selected by the configuration.
#[derive(Clone, Debug)]
pub enum Equations {
    NavierStokes(NavierStokes),
    AdvectionDiffusion(AdvectionDiffusion),
}

impl Equations {
    /// Build from the run configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        match config.equation {
            Equation::NavierStokes => Equations::NavierStokes(NavierStokes::new(
                config.n_dims,
                config.gamma,
                config.mu,
                config.prandtl,
            )),
            Equation::AdvectionDiffusion => Equations::AdvectionDiffusion(AdvectionDiffusion::new(
                config.n_dims,
                config.advect_velocity,
                config.diff_d,
            )),
        }
    }

    /// Navier-Stokes parameters, if that is the active equation set.
    pub fn navier_stokes(&self) -> Option<&NavierStokes> {
        match self {
            Equations::NavierStokes(ns) => Some(ns),
            Equations::AdvectionDiffusion(_) => None,
        }
    }
}

impl Physics for Equations {
    fn name(&self) -> &'static str {
        match self {
            Equations::NavierStokes(p) => p.name(),
            Equations::AdvectionDiffusion(p) => p.name(),
        }
    }

    fn n_fields(&self) -> usize {
        match self {
            Equations::NavierStokes(p) => p.n_fields(),
            Equations::AdvectionDiffusion(p) => p.n_fields(),
        }
    }

    fn n_dims(&self) -> usize {
        match self {
            Equations::NavierStokes(p) => p.n_dims(),
            Equations::AdvectionDiffusion(p) => p.n_dims(),
        }
    }

    #[inline]
    fn inviscid_flux(&self, u: &[f64], flux: &mut Tensor) {
        match self {
            Equations::NavierStokes(p) => p.inviscid_flux(u, flux),
            Equations::AdvectionDiffusion(p) => p.inviscid_flux(u, flux),
        }
    }

    #[inline]
    fn add_viscous_flux(&self, u: &[f64], grad: &Tensor, flux: &mut Tensor) {
        match self {
            Equations::NavierStokes(p) => p.add_viscous_flux(u, grad, flux),
            Equations::AdvectionDiffusion(p) => p.add_viscous_flux(u, grad, flux),
        }
    }

    #[inline]
    fn wave_speed(&self, u: &[f64], normal: &Point, grid_vel: &Point) -> f64 {
        match self {
            Equations::NavierStokes(p) => p.wave_speed(u, normal, grid_vel),
            Equations::AdvectionDiffusion(p) => p.wave_speed(u, normal, grid_vel),
        }
    }

    #[inline]
    fn cfl_wave_speed(&self, u: &[f64], normal: &Point, grid_vel: &Point) -> f64 {
        match self {
            Equations::NavierStokes(p) => p.cfl_wave_speed(u, normal, grid_vel),
            Equations::AdvectionDiffusion(p) => p.cfl_wave_speed(u, normal, grid_vel),
        }
    }
}

/// Normal component `Σ_d F_d n_d` of a per-axis flux.
#[inline]
pub fn normal_flux(flux: &Tensor, normal: &Point, n_dims: usize, n_fields: usize) -> State {
    let mut out = [0.0; MAX_FIELDS];
    for d in 0..n_dims {
        for k in 0..n_fields {
            out[k] += flux[d][k] * normal[d];
        }
    }
    out
}
