//! Primitives, residual and error norms, initial data, plot data and
//! restart loading.

use faer::Mat;

use super::{Context, Element};
use crate::config::{ErrorNorm, ResidualNorm};
use crate::error::{FrError, Result};
use crate::geometry::Point;
use crate::io::RestartPiece;
use crate::operators::{quadrature_rule, Operators};
use crate::physics::{exact_solution, initial_state, Equations, NavierStokes, State, MAX_FIELDS};

/// Element values on its `(p+3)^d` plot grid.
#[derive(Clone, Debug, Default)]
pub struct PlotData {
    /// Spatial dimension
    pub n_dims: usize,
    /// Polynomial order (the grid has `order + 3` points per direction)
    pub order: usize,
    /// Physical positions (x fastest)
    pub points: Vec<Point>,
    /// Density (or the transported scalar)
    pub density: Vec<f64>,
    /// Velocity (advection velocity for scalar equations)
    pub velocity: Vec<[f64; 3]>,
    /// Pressure (zero for scalar equations)
    pub pressure: Vec<f64>,
    /// Entropy-error sensor
    pub entropy_err: Vec<f64>,
}

impl Element {
    /// Primitive variables at a solution point.
    pub fn primitives(&self, ns: &NavierStokes, spt: usize) -> State {
        let mut u = [0.0; MAX_FIELDS];
        self.gather_u(spt, &mut u);
        ns.primitives(&u)
    }

    /// Primitive variables at a flux point.
    pub fn primitives_fpt(&self, ns: &NavierStokes, fpt: usize) -> State {
        ns.primitives(&self.fpt_state(&self.u_fpts, fpt))
    }

    /// Entropy variables at a solution point.
    pub fn entropy_variables(&self, ns: &NavierStokes, spt: usize) -> State {
        let mut u = [0.0; MAX_FIELDS];
        self.gather_u(spt, &mut u);
        ns.entropy_variables(&u)
    }

    /// Entropy production `v · ∇·F` at the solution points, from the
    /// stage-0 divergence.
    pub fn calc_entropy_error(&mut self, ns: &NavierStokes) {
        for spt in 0..self.n_spts {
            let v = self.entropy_variables(ns, spt);
            let s: f64 = (0..self.n_fields)
                .map(|k| v[k] * self.div_f_spts[0][(spt, k)])
                .sum();
            self.entropy_err_spts[spt] = s / self.transform_spts[spt].det;
        }
    }

    /// Per-field norm of the stage-0 residual.
    pub fn norm_residual(&self, ops: &Operators, norm: ResidualNorm) -> Vec<f64> {
        let mut res = vec![0.0f64; self.n_fields];
        let div = &self.div_f_spts[0];
        for spt in 0..self.n_spts {
            let w = ops.weights_spts[spt];
            let det = self.transform_spts[spt].det;
            for (k, r) in res.iter_mut().enumerate() {
                let val = div[(spt, k)];
                match norm {
                    ResidualNorm::L1 => *r += val.abs() * w,
                    ResidualNorm::L2 => *r += val * val / det * w,
                    ResidualNorm::Max => *r = r.max(val.abs() / det),
                }
            }
        }
        res
    }

    /// Integral of `U` over the element.
    pub fn total_conserved(&self, ops: &Operators) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_fields];
        for spt in 0..self.n_spts {
            let w = ops.weights_spts[spt] * self.transform_spts[spt].det;
            for (k, s) in sum.iter_mut().enumerate() {
                *s += w * self.u_spts[(spt, k)];
            }
        }
        sum
    }

    /// Integral of `|U - U_exact|` (L1) or `(U - U_exact)^2` (L2) over the
    /// element with a Gauss rule of `quad_order` points per direction.
    ///
    /// L2 values are not square-rooted; the caller sums over elements first.
    pub fn calc_error(&self, ctx: &Context<'_>, time: f64) -> Vec<f64> {
        let ops = &ctx.ops[self.ops];
        let (locs, weights) = quadrature_rule(self.n_dims, ctx.config.quad_order.max(1));
        let u_q = ops.interpolate_spts_to_points(&self.u_spts, &locs);
        let geo = self.geometry();

        let mut err = vec![0.0; self.n_fields];
        for (q, loc) in locs.iter().enumerate() {
            let pos = geo.calc_pos(loc);
            let det = geo.transform_at(loc).det;
            let exact = exact_solution(ctx.config, &pos, time);
            for (k, e) in err.iter_mut().enumerate() {
                let diff = u_q[(q, k)] - exact[k];
                let val = match ctx.config.error_norm {
                    ErrorNorm::L1 => diff.abs(),
                    ErrorNorm::L2 => diff * diff,
                };
                *e += val * weights[q] * det;
            }
        }
        err
    }

    /// Apply the configured initial condition at the solution points.
    pub fn set_initial_condition(&mut self, ctx: &Context<'_>) {
        for spt in 0..self.n_spts {
            let u = initial_state(ctx.config, &self.pos_spts[spt]);
            for k in 0..self.n_fields {
                self.u_spts[(spt, k)] = u[k];
            }
        }
    }

    /// Positions, primitives and entropy error on the plot grid.
    pub fn plot_data(&self, ctx: &Context<'_>) -> PlotData {
        let ops = &ctx.ops[self.ops];
        let mut u_ppts = Mat::<f64>::zeros(ops.n_ppts, self.n_fields);
        ops.apply_spts_ppts(&self.u_spts, &mut u_ppts);

        let s_spts = Mat::from_fn(self.n_spts, 1, |i, _| self.entropy_err_spts[i]);
        let mut s_ppts = Mat::<f64>::zeros(ops.n_ppts, 1);
        ops.apply_spts_ppts(&s_spts, &mut s_ppts);

        let geo = self.geometry();
        let mut out = PlotData {
            n_dims: self.n_dims,
            order: self.order,
            points: ops.loc_ppts.iter().map(|l| geo.calc_pos(l)).collect(),
            entropy_err: (0..ops.n_ppts).map(|i| s_ppts[(i, 0)]).collect(),
            ..Default::default()
        };
        for ppt in 0..ops.n_ppts {
            let u = self.fpt_state(&u_ppts, ppt);
            match ctx.physics {
                Equations::NavierStokes(ns) => {
                    let w = ns.primitives(&u);
                    let mut vel = [0.0; 3];
                    vel[..self.n_dims].copy_from_slice(&w[1..=self.n_dims]);
                    out.density.push(w[0]);
                    out.velocity.push(vel);
                    out.pressure.push(w[self.n_dims + 1]);
                }
                Equations::AdvectionDiffusion(ad) => {
                    out.density.push(u[0]);
                    out.velocity.push(ad.velocity);
                    out.pressure.push(0.0);
                }
            }
        }
        out
    }

    /// Load one restart piece (primitive data at the stored order's solution
    /// points), interpolating when the stored order differs.
    pub fn load_restart_piece(&mut self, ctx: &Context<'_>, piece: &RestartPiece) -> Result<()> {
        let ops = &ctx.ops[self.ops];
        let n_src = (piece.order + 1).pow(self.n_dims as u32);
        if piece.density.len() != n_src
            || (ctx.physics.navier_stokes().is_some()
                && (piece.velocity.len() != n_src || piece.pressure.len() != n_src))
        {
            return Err(FrError::RestartMalformed {
                element: self.id,
                reason: format!(
                    "expected {n_src} values per array for order {}",
                    piece.order
                ),
            });
        }

        let n_fields = self.n_fields;
        let src = Mat::from_fn(n_src, n_fields, |i, k| match ctx.physics {
            Equations::NavierStokes(ns) => {
                ns.conserved(piece.density[i], &piece.velocity[i], piece.pressure[i])[k]
            }
            Equations::AdvectionDiffusion(_) => piece.density[i],
        });

        if piece.order == self.order {
            self.u_spts.clone_from(&src);
        } else {
            let interp = ops.order_change_matrix(piece.order);
            self.u_spts = &interp * &src;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::{Equation, InitialCondition, SolverConfig};
    use crate::operators::OperatorLibrary;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_norm_residual_types() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 1);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 4.0), &config, &mut lib);
        for spt in 0..ele.n_spts {
            ele.div_f_spts[0][(spt, 0)] = if spt == 0 { -8.0 } else { 4.0 };
        }
        let ops = &lib[ele.ops];
        // det J = 4, weights are all 1 at order 1
        let l1 = ele.norm_residual(ops, ResidualNorm::L1);
        let l2 = ele.norm_residual(ops, ResidualNorm::L2);
        let max = ele.norm_residual(ops, ResidualNorm::Max);
        assert_relative_eq!(l1[0], 8.0 + 3.0 * 4.0, epsilon = 1e-12);
        assert_relative_eq!(l2[0], (64.0 + 3.0 * 16.0) / 4.0, epsilon = 1e-12);
        assert_relative_eq!(max[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_error_vanishes_for_exact_initial_data() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 4)
            .with_initial_condition(InitialCondition::SineWave);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(-1.0, -1.0, 0.5), &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.set_initial_condition(&ctx);
        let err = ele.calc_error(&ctx, 0.0);
        assert!(err[0] < 1e-8, "error {}", err[0]);
    }

    #[test]
    fn test_vortex_density_at_centre_point() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2)
            .with_initial_condition(InitialCondition::IsentropicVortex);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(-0.5, -0.5, 1.0), &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.set_initial_condition(&ctx);
        // 3x3 points: the middle one sits on the vortex centre
        assert_relative_eq!(ele.pos_spts[4].x, 0.0, epsilon = 1e-14);
        assert_relative_eq!(ele.pos_spts[4].y, 0.0, epsilon = 1e-14);
        let g: f64 = 1.4;
        let eps: f64 = 5.0;
        let rho = (1.0 - eps * eps * (g - 1.0) / (8.0 * g * PI * PI)).powf(1.0 / (g - 1.0) + 1e-5);
        assert_relative_eq!(ele.u_spts[(4, 0)], rho, epsilon = 1e-12);
        // pressure is isentropic, velocity at the centre is the free stream
        let ns = physics.navier_stokes().unwrap();
        let u: Vec<f64> = (0..4).map(|k| ele.u_spts[(4, k)]).collect();
        assert_relative_eq!(u[1] / u[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(u[2] / u[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(ns.pressure(&u), rho.powf(g), epsilon = 1e-12);
    }

    #[test]
    fn test_total_conserved_is_area_times_value() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 3.0), &config, &mut lib);
        for spt in 0..ele.n_spts {
            ele.u_spts[(spt, 0)] = 2.0;
        }
        let total = ele.total_conserved(&lib[ele.ops]);
        assert_relative_eq!(total[0], 18.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropy_error_of_steady_state_is_zero() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2);
        let physics = Equations::from_config(&config);
        let ns = physics.navier_stokes().unwrap();
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 1.0), &config, &mut lib);
        let u = ns.conserved(1.0, &[0.3, 0.0, 0.0], 1.0);
        for spt in 0..ele.n_spts {
            for k in 0..4 {
                ele.u_spts[(spt, k)] = u[k];
            }
        }
        ele.calc_entropy_error(ns);
        assert!(ele.entropy_err_spts.iter().all(|s| s.abs() < 1e-14));
    }

    #[test]
    fn test_plot_data_corners_and_primitives() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2);
        let physics = Equations::from_config(&config);
        let ns = physics.navier_stokes().unwrap();
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(1.0, 1.0, 2.0), &config, &mut lib);
        let u = ns.conserved(1.2, &[0.5, -0.1, 0.0], 0.8);
        for spt in 0..ele.n_spts {
            for k in 0..4 {
                ele.u_spts[(spt, k)] = u[k];
            }
        }
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        let plot = ele.plot_data(&ctx);
        assert_eq!(plot.points.len(), 25);
        assert_relative_eq!(plot.points[0].x, 1.0, epsilon = 1e-14);
        assert_relative_eq!(plot.points[24].y, 3.0, epsilon = 1e-14);
        for i in 0..25 {
            assert_relative_eq!(plot.density[i], 1.2, epsilon = 1e-12);
            assert_relative_eq!(plot.velocity[i][0], 0.5, epsilon = 1e-12);
            assert_relative_eq!(plot.pressure[i], 0.8, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_restart_piece_with_order_change() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 3);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 2.0), &config, &mut lib);
        // Linear data stored at order 1
        let low = lib
            .get_or_build(ele.shape, 1, config.point_set)
            .unwrap();
        let density = lib[low].loc_spts.iter().map(|p| 1.0 + p.x - 0.5 * p.y).collect();
        let piece = RestartPiece {
            order: 1,
            density,
            velocity: Vec::new(),
            pressure: Vec::new(),
        };
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        ele.load_restart_piece(&ctx, &piece).unwrap();
        let ops = &lib[ele.ops];
        for spt in 0..ele.n_spts {
            let p = ops.loc_spts[spt];
            assert_relative_eq!(ele.u_spts[(spt, 0)], 1.0 + p.x - 0.5 * p.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_restart_piece_size_mismatch() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2);
        let physics = Equations::from_config(&config);
        let mut lib = OperatorLibrary::new();
        let mut ele = build(square(0.0, 0.0, 2.0), &config, &mut lib);
        let piece = RestartPiece {
            order: 2,
            density: vec![1.0; 4],
            velocity: Vec::new(),
            pressure: Vec::new(),
        };
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        assert!(matches!(
            ele.load_restart_piece(&ctx, &piece),
            Err(FrError::RestartMalformed { .. })
        ));
    }
}
