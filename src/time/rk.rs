//! Low-storage explicit Runge-Kutta schemes.
//!
//! The solver advances with a two-array scheme: intermediate stages reset to
//! the stage-0 snapshot `U0` and take a single scaled residual step
//! ("A" steps), while the final stage restores `U0` and accumulates every
//! stored stage residual with the quadrature weights ("B" steps). That
//! structure works for any scheme whose Butcher tableau is diagonal below
//! the main diagonal, so a scheme is fully described by its stage
//! fractions `a` and weights `b`.
//!
//! ```text
//! for s in 0..n-1:  U = U0 - a[s+1] dt R(U_s)
//! final:            U = U0 - dt sum_s b[s] R(U_s)
//! ```

// =============================================================================
// IntegratorInfo Trait
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy.
    fn order(&self) -> usize;

    /// Number of residual evaluations per step.
    fn n_stages(&self) -> usize;

    /// Times at which the residual is evaluated relative to the step start.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// RkScheme
// =============================================================================

/// Explicit scheme selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RkScheme {
    /// Single stage, first order
    ForwardEuler,
    /// Explicit midpoint rule
    Midpoint,
    /// Classical four-stage, fourth-order scheme
    #[default]
    ClassicRk4,
}

const EULER_A: [f64; 1] = [0.0];
const EULER_B: [f64; 1] = [1.0];
const MIDPOINT_A: [f64; 2] = [0.0, 0.5];
const MIDPOINT_B: [f64; 2] = [0.0, 1.0];
const RK4_A: [f64; 4] = [0.0, 0.5, 0.5, 1.0];
const RK4_B: [f64; 4] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

impl RkScheme {
    /// Stage time fractions `a[s]` (stage `s` is evaluated at `t + a[s] dt`).
    pub fn stage_fractions(&self) -> &'static [f64] {
        match self {
            RkScheme::ForwardEuler => &EULER_A,
            RkScheme::Midpoint => &MIDPOINT_A,
            RkScheme::ClassicRk4 => &RK4_A,
        }
    }

    /// Final accumulation weights `b[s]`.
    pub fn weights(&self) -> &'static [f64] {
        match self {
            RkScheme::ForwardEuler => &EULER_B,
            RkScheme::Midpoint => &MIDPOINT_B,
            RkScheme::ClassicRk4 => &RK4_B,
        }
    }
}

impl IntegratorInfo for RkScheme {
    fn name(&self) -> &'static str {
        match self {
            RkScheme::ForwardEuler => "Forward Euler",
            RkScheme::Midpoint => "RK2 (midpoint)",
            RkScheme::ClassicRk4 => "RK4 (classical)",
        }
    }

    fn order(&self) -> usize {
        match self {
            RkScheme::ForwardEuler => 1,
            RkScheme::Midpoint => 2,
            RkScheme::ClassicRk4 => 4,
        }
    }

    fn n_stages(&self) -> usize {
        self.stage_fractions().len()
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        self.stage_fractions().iter().map(|a| a * dt).collect()
    }
}
