//! Positivity and minimum-entropy limiters.
//!
//! Both limiters blend every point toward the Jacobian-weighted element
//! average, `U = (1 - eps) U_avg + eps U`, which leaves the average (and so
//! conservation) untouched.

use tracing::debug;

use super::{Context, Element};
use crate::error::{FrError, Result};
use crate::operators::Operators;
use crate::physics::NavierStokes;

/// Density the positivity squeeze restores at the worst point.
pub const DENSITY_TOL: f64 = 1e-10;

impl Element {
    /// Recompute and store the element average.
    pub fn calc_avg_solution(&mut self, ops: &Operators) -> &[f64] {
        let det = self.det_spts();
        self.u_avg = ops.calc_avg(&self.u_spts, &det);
        &self.u_avg
    }

    /// Minimum of `field` over the solution and flux points.
    fn min_over_points(&self, field: usize) -> f64 {
        let spts = (0..self.n_spts).map(|i| self.u_spts[(i, field)]);
        let fpts = (0..self.n_fpts).map(|i| self.u_fpts[(i, field)]);
        spts.chain(fpts).fold(f64::INFINITY, f64::min)
    }

    fn blend_toward_avg(&mut self, eps: f64) {
        for k in 0..self.n_fields {
            let avg = self.u_avg[k];
            for spt in 0..self.n_spts {
                self.u_spts[(spt, k)] = (1.0 - eps) * avg + eps * self.u_spts[(spt, k)];
            }
            for fpt in 0..self.n_fpts {
                self.u_fpts[(fpt, k)] = (1.0 - eps) * avg + eps * self.u_fpts[(fpt, k)];
            }
        }
    }

    /// Blend toward the average when any solution- or flux-point density is
    /// negative. Returns whether the element was squeezed.
    ///
    /// Expects `u_fpts` and `u_avg` to be current.
    pub fn squeeze_density(&mut self) -> Result<bool> {
        let min_rho = self.min_over_points(0);
        if min_rho >= 0.0 {
            return Ok(false);
        }
        let avg = self.u_avg[0];
        if avg <= 0.0 {
            return Err(FrError::NonPositiveAverage {
                element: self.id,
                quantity: "density",
                value: avg,
            });
        }
        let eps = (avg - DENSITY_TOL).abs() / (avg - min_rho);
        debug!(element = self.id, min_rho, eps, "density squeeze");
        self.blend_toward_avg(eps);
        Ok(true)
    }

    /// Blend toward the average when `tau = p - exps0 rho^gamma` is negative
    /// anywhere. Returns whether the element was squeezed.
    ///
    /// Runs on the output of [`Element::squeeze_density`].
    pub fn squeeze_entropy(&mut self, ns: &NavierStokes, exps0: f64) -> Result<bool> {
        let tau = |u: &[f64]| ns.pressure(u) - exps0 * u[0].powf(ns.gamma);
        let mut u = [0.0; crate::physics::MAX_FIELDS];
        let mut min_tau = f64::INFINITY;
        for spt in 0..self.n_spts {
            self.gather_u(spt, &mut u);
            min_tau = min_tau.min(tau(&u[..]));
        }
        for fpt in 0..self.n_fpts {
            let uf = self.fpt_state(&self.u_fpts, fpt);
            min_tau = min_tau.min(tau(&uf[..]));
        }
        if min_tau >= 0.0 {
            return Ok(false);
        }

        if self.u_avg[0] <= 0.0 {
            return Err(FrError::NonPositiveAverage {
                element: self.id,
                quantity: "density",
                value: self.u_avg[0],
            });
        }
        let tau_avg = tau(self.u_avg.as_slice());
        if tau_avg < 0.0 {
            return Err(FrError::NonPositiveAverage {
                element: self.id,
                quantity: "entropy bound",
                value: tau_avg,
            });
        }
        // U = Eps U_avg + (1 - Eps) U
        let big_eps = min_tau / (min_tau - tau_avg);
        debug!(element = self.id, min_tau, big_eps, "entropy squeeze");
        self.blend_toward_avg(1.0 - big_eps);
        Ok(true)
    }

    /// Average, then density and entropy squeezes, for Navier-Stokes runs.
    pub fn squeeze(&mut self, ctx: &Context<'_>) -> Result<()> {
        let Some(ns) = ctx.physics.navier_stokes() else {
            return Ok(());
        };
        let ops = &ctx.ops[self.ops];
        self.extrapolate_u(ops);
        self.calc_avg_solution(ops);
        self.squeeze_density()?;
        self.squeeze_entropy(ns, ctx.config.exps0)?;
        Ok(())
    }

    /// Modal shock sensor with filtering above `threshold`; stores the sensor.
    pub fn shock_capture(&mut self, ops: &Operators, threshold: f64) {
        self.sensor = ops.shock_capture(&mut self.u_spts, threshold);
    }
}
