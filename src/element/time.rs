//! Explicit update kernels and the CFL time step.

use super::{Context, Element};
use crate::error::Result;
use crate::physics::{Physics, MAX_FIELDS};
use crate::polynomial::cfl_limit;

/// Guard against division by a vanishing wave speed.
const WAVE_SPEED_EPS: f64 = 1e-10;

impl Element {
    /// Characteristic speed at each flux point divided by the face area
    /// scale `dA`. Collapsed faces (`dA = 0`) get zero.
    pub fn calc_wave_speed(&mut self, ctx: &Context<'_>) {
        let mut u = [0.0; MAX_FIELDS];
        for f in 0..self.n_fpts {
            for k in 0..self.n_fields {
                u[k] = self.u_fpts[(f, k)];
            }
            let da = self.da_fpts[f];
            self.wave_sp_fpts[f] = if da > 0.0 {
                ctx.physics
                    .cfl_wave_speed(&u, &self.norm_fpts[f], &self.grid_vel_fpts[f])
                    / da
            } else {
                0.0
            };
        }
    }

    /// CFL-limited time step from the last wave speeds; stores and returns it.
    ///
    /// Flux points on collapsed faces are skipped.
    pub fn calc_dt(&mut self, cfl: f64) -> Result<f64> {
        let limit = cfl_limit(self.order)?;
        let max_speed = self
            .wave_sp_fpts
            .iter()
            .zip(&self.da_fpts)
            .filter(|(_, &da)| da > 0.0)
            .map(|(&w, _)| w)
            .fold(0.0_f64, f64::max);
        self.dt = cfl * limit * 2.0 / (max_speed + WAVE_SPEED_EPS);
        Ok(self.dt)
    }

    /// Intermediate stage: `U = U0 - coeff dt R_stage / det J`.
    ///
    /// With `use_source` the p-multigrid source is added to the residual.
    pub fn time_step_a(&mut self, stage: usize, coeff: f64, use_source: bool) {
        let dt = self.dt;
        for spt in 0..self.n_spts {
            let scale = coeff * dt / self.transform_spts[spt].det;
            for k in 0..self.n_fields {
                let r = self.residual_at(stage, spt, k, use_source);
                self.u_spts[(spt, k)] = self.u0[(spt, k)] - scale * r;
            }
        }
    }

    /// Final-stage accumulation: `U -= coeff dt R_stage / det J`.
    pub fn time_step_b(&mut self, stage: usize, coeff: f64, use_source: bool) {
        let dt = self.dt;
        for spt in 0..self.n_spts {
            let scale = coeff * dt / self.transform_spts[spt].det;
            for k in 0..self.n_fields {
                let r = self.residual_at(stage, spt, k, use_source);
                self.u_spts[(spt, k)] -= scale * r;
            }
        }
    }

    #[inline]
    fn residual_at(&self, stage: usize, spt: usize, k: usize, use_source: bool) -> f64 {
        let src = match &self.src_spts {
            Some(s) if use_source => s[(spt, k)],
            _ => 0.0,
        };
        self.div_f_spts[stage][(spt, k)] + src
    }

    /// Save the solution at the start of the step.
    pub fn copy_u_to_u0(&mut self) {
        self.u0.clone_from(&self.u_spts);
    }

    /// Restore the solution saved by [`Element::copy_u_to_u0`].
    pub fn copy_u0_to_u(&mut self) {
        self.u_spts.clone_from(&self.u0);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::{Equation, SolverConfig};
    use crate::geometry::Point;
    use crate::operators::OperatorLibrary;
    use crate::physics::Equations;
    use approx::assert_relative_eq;

    #[test]
    fn test_dt_from_wave_speed() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2)
            .with_advection([1.0, 0.0, 0.0], 0.0);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 2.0), &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.calc_wave_speed(&ctx);
        let dt = ele.calc_dt(1.0).unwrap();
        // unit square metric, speed 1 on the x faces
        let expected = cfl_limit(2).unwrap() * 2.0 / (1.0 + 1e-10);
        assert_relative_eq!(dt, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_advection_uses_speed_magnitude() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2)
            .with_advection([1.0, 1.0, 0.0], 0.0);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 2.0), &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.calc_wave_speed(&ctx);
        let dt = ele.calc_dt(1.0).unwrap();
        let expected = cfl_limit(2).unwrap() * 2.0 / (2f64.sqrt() + 1e-10);
        assert_relative_eq!(dt, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_hex_dt_scales_with_face_area() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 3, 2)
            .with_advection([1.0, 0.0, 0.0], 0.0);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let nodes = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];
        let mut ele = build(nodes, &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.calc_wave_speed(&ctx);
        // dA = det J |J^-T n| = 0.125 * 2 on every face
        for &da in &ele.da_fpts {
            assert_relative_eq!(da, 0.25, epsilon = 1e-14);
        }
        let dt = ele.calc_dt(1.0).unwrap();
        let expected = cfl_limit(2).unwrap() * 2.0 / (4.0 + 1e-10);
        assert_relative_eq!(dt, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_dt_rejects_unsupported_order() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 6);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 1.0), &config, &mut lib);
        assert!(ele.calc_dt(0.5).is_err());
    }

    #[test]
    fn test_step_a_and_b() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 1);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 2.0), &config, &mut lib);
        ele.dt = 0.1;
        for spt in 0..ele.n_spts {
            ele.u_spts[(spt, 0)] = 1.0;
            ele.div_f_spts[0][(spt, 0)] = 2.0;
        }
        ele.copy_u_to_u0();
        ele.time_step_a(0, 0.5, false);
        assert_relative_eq!(ele.u_spts[(0, 0)], 0.9, epsilon = 1e-14);
        ele.copy_u0_to_u();
        ele.time_step_b(0, 1.0, false);
        ele.time_step_b(0, 1.0, false);
        assert_relative_eq!(ele.u_spts[(0, 0)], 0.6, epsilon = 1e-14);
    }

    #[test]
    fn test_step_with_source() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 1)
            .with_pmg(crate::config::PmgConfig::default());
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 1.0), &config, &mut lib);
        ele.dt = 0.1;
        for spt in 0..ele.n_spts {
            ele.u_spts[(spt, 0)] = 1.0;
            ele.div_f_spts[0][(spt, 0)] = 1.0;
        }
        if let Some(src) = ele.src_spts.as_mut() {
            for spt in 0..ele.n_spts {
                src[(spt, 0)] = 3.0;
            }
        }
        ele.copy_u_to_u0();
        // det J = 1/4 on a unit square
        ele.time_step_a(0, 1.0, true);
        assert_relative_eq!(ele.u_spts[(0, 0)], 1.0 - 0.1 * 4.0 * 4.0, epsilon = 1e-13);
        ele.time_step_a(0, 1.0, false);
        assert_relative_eq!(ele.u_spts[(0, 0)], 1.0 - 0.1 * 4.0, epsilon = 1e-13);
    }
}
