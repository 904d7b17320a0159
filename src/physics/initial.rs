//! Initial conditions and exact solutions of the built-in test cases.
//!
//! Travelling solutions are evaluated at the back-tracked position wrapped
//! into the periodic box `[xmin, xmax] x [ymin, ymax]`.

use std::f64::consts::PI;

use super::{NavierStokes, State, MAX_FIELDS};
use crate::config::{InitialCondition, SolverConfig};
use crate::geometry::Point;

/// Strength of the isentropic vortex.
const VORTEX_EPS: f64 = 5.0;

/// Parameters of the Liang-Miyaji vortex.
const LIANG_EPS: f64 = 1.0;
const LIANG_RC: f64 = 1.0;
const LIANG_MACH: f64 = 0.3;

/// Wrap `x` into `[lo, hi)`.
pub fn wrap_periodic(x: f64, lo: f64, hi: f64) -> f64 {
    let len = hi - lo;
    let mut r = (x - lo) % len;
    if r < 0.0 {
        r += len;
    }
    lo + r
}

/// State at `pos` for the configured initial condition.
pub fn initial_state(config: &SolverConfig, pos: &Point) -> State {
    evaluate(config, pos, 0.0)
}

/// Exact solution at `pos` and time `t` for the configured test case.
pub fn exact_solution(config: &SolverConfig, pos: &Point, t: f64) -> State {
    evaluate(config, pos, t)
}

fn evaluate(config: &SolverConfig, pos: &Point, t: f64) -> State {
    let ns = NavierStokes::new(config.n_dims, config.gamma, config.mu, config.prandtl);
    let [xmin, xmax, ymin, ymax] = config.periodic_box;
    let wrap = |p: &Point, shift: [f64; 2]| {
        if t == 0.0 {
            (p.x, p.y)
        } else {
            (
                wrap_periodic(p.x - shift[0] * t, xmin, xmax),
                wrap_periodic(p.y - shift[1] * t, ymin, ymax),
            )
        }
    };

    let mut u = [0.0; MAX_FIELDS];
    match config.ic {
        InitialCondition::FreeStream => {
            let mut v = config.v_ic;
            if config.n_dims == 2 {
                v[2] = 0.0;
            }
            u = ns.conserved(config.rho_ic, &v, config.p_ic);
        }
        InitialCondition::IsentropicVortex => {
            let (x, y) = wrap(pos, [1.0, 1.0]);
            let f = -(x * x + y * y);
            let g = config.gamma;
            let rho = (1.0 - VORTEX_EPS * VORTEX_EPS * (g - 1.0) / (8.0 * g * PI * PI) * f.exp())
                .powf(1.0 / (g - 1.0) + 1e-5)
                .max(1e-3);
            let vx = 1.0 - VORTEX_EPS * y / (2.0 * PI) * (f / 2.0).exp();
            let vy = 1.0 + VORTEX_EPS * x / (2.0 * PI) * (f / 2.0).exp();
            u = ns.conserved(rho, &[vx, vy, 0.0], rho.powf(g));
        }
        InitialCondition::LiangVortex => {
            let theta = 0.5_f64.atan();
            let (x, y) = wrap(pos, [theta.cos(), theta.sin()]);
            let g = config.gamma;
            let p_inf = LIANG_MACH.powi(-2) / g;
            let em = (LIANG_EPS * LIANG_MACH).powi(2);
            let f = -(x * x + y * y) / (LIANG_RC * LIANG_RC);
            let vx = theta.cos() - y * LIANG_EPS / LIANG_RC * (f / 2.0).exp();
            let vy = theta.sin() + x * LIANG_EPS / LIANG_RC * (f / 2.0).exp();
            let base = (1.0 - (g - 1.0) / 2.0 * em * f.exp()).powf(g / (g - 1.0));
            u = ns.conserved(base, &[vx, vy, 0.0], p_inf * base);
        }
        InitialCondition::GaussianBump => {
            let a = config.advect_velocity;
            let (x, y) = wrap(pos, [a[0], a[1]]);
            let z = if config.n_dims == 3 { pos.z } else { 0.0 };
            u[0] = (-(x * x + y * y + z * z)).exp();
        }
        InitialCondition::SineWave => {
            let x = pos.x - config.advect_velocity[0] * t;
            u[0] = 1.0 + (2.0 * PI * (x + 5.0) / 10.0).sin();
        }
        InitialCondition::CosineProduct => {
            let k = 2.0 * PI / 6.0;
            u[0] = (k * pos.x).cos() * (k * pos.y).cos() * (k * pos.z).cos();
        }
    }
    u
}
