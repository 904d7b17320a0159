//! Run configuration.
//!
//! [`SolverConfig`] is the single read-only parameter object shared by the
//! solver, its elements and faces. Build it with `Default` plus the `with_*`
//! methods and call [`SolverConfig::validate`] before setup.

use std::path::PathBuf;

use crate::error::{FrError, Result};
use crate::mesh::MeshMotion;
use crate::polynomial::cfl_limit;
use crate::time::RkScheme;

/// Governing equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Equation {
    /// Compressible Euler / Navier-Stokes, ideal gas
    NavierStokes,
    /// Linear scalar advection with optional diffusion
    AdvectionDiffusion,
}

/// 1D point family used for solution and flux points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointSet {
    /// Gauss-Legendre points (interior)
    #[default]
    Legendre,
    /// Gauss-Lobatto points (include the endpoints)
    Lobatto,
}

/// How the time step is chosen each iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeStepMode {
    /// Use `dt` as given
    #[default]
    Fixed,
    /// Global minimum of the per-element CFL bound
    GlobalCfl,
    /// Every element advances with its own CFL bound
    LocalCfl,
}

/// Initial condition (and exact solution for test cases).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialCondition {
    /// Navier-Stokes: uniform free stream from `rho_ic`, `v_ic`, `p_ic`
    FreeStream,
    /// Navier-Stokes: isentropic vortex of strength 5 centred at the origin
    IsentropicVortex,
    /// Navier-Stokes: weak vortex of Liang and Miyaji, advected at atan(1/2)
    LiangVortex,
    /// Advection-diffusion: Gaussian bump exp(-r^2)
    GaussianBump,
    /// Advection-diffusion: 1 + sin(2 pi (x + 5) / 10)
    SineWave,
    /// Advection-diffusion: cos(2 pi x/6) cos(2 pi y/6) cos(2 pi z/6)
    CosineProduct,
}

impl InitialCondition {
    /// Map the classic integer selector onto a condition for `equation`.
    pub fn from_index(equation: Equation, index: usize) -> Result<Self> {
        let ic = match (equation, index) {
            (Equation::NavierStokes, 0) => InitialCondition::FreeStream,
            (Equation::NavierStokes, 1) => InitialCondition::IsentropicVortex,
            (Equation::NavierStokes, 2) => InitialCondition::LiangVortex,
            (Equation::AdvectionDiffusion, 0) => InitialCondition::GaussianBump,
            (Equation::AdvectionDiffusion, 1) => InitialCondition::SineWave,
            (Equation::AdvectionDiffusion, 2) => InitialCondition::CosineProduct,
            _ => {
                return Err(FrError::InvalidConfig(format!(
                    "no initial condition {index} for {equation:?}"
                )))
            }
        };
        Ok(ic)
    }

    fn equation(&self) -> Equation {
        match self {
            InitialCondition::FreeStream
            | InitialCondition::IsentropicVortex
            | InitialCondition::LiangVortex => Equation::NavierStokes,
            _ => Equation::AdvectionDiffusion,
        }
    }
}

/// Norm used when reporting the residual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResidualNorm {
    /// sum of |divF| weighted by quadrature
    #[default]
    L1,
    /// sum of divF^2 / detJ weighted by quadrature
    L2,
    /// max of |divF| / detJ
    Max,
}

/// Norm used for error integration against an exact solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorNorm {
    /// integral of |U - U_exact|
    L1,
    /// sqrt of the integral of (U - U_exact)^2
    #[default]
    L2,
}

/// p-multigrid parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PmgConfig {
    /// Lowest polynomial order in the hierarchy
    pub low_order: usize,
    /// Source-augmented updates per coarse level and cycle
    pub smooth_steps: usize,
}

impl Default for PmgConfig {
    fn default() -> Self {
        Self {
            low_order: 0,
            smooth_steps: 1,
        }
    }
}

/// Solver parameters.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Spatial dimension (2 or 3)
    pub n_dims: usize,
    /// Polynomial order of the solution
    pub order: usize,
    /// Governing equations
    pub equation: Equation,
    /// Include viscous / diffusive terms
    pub viscous: bool,

    /// Ratio of specific heats
    pub gamma: f64,
    /// Prandtl number
    pub prandtl: f64,
    /// Dynamic viscosity
    pub mu: f64,
    /// Advection velocity (advection-diffusion)
    pub advect_velocity: [f64; 3],
    /// Diffusion coefficient (advection-diffusion)
    pub diff_d: f64,

    /// Solution / flux point family
    pub point_set: PointSet,

    /// Time step selection
    pub dt_mode: TimeStepMode,
    /// Fixed time step (also the initial value for CFL modes)
    pub dt: f64,
    /// CFL number multiplying the order-dependent stability limit
    pub cfl: f64,
    /// Runge-Kutta scheme
    pub rk: RkScheme,

    /// Mesh motion law
    pub motion: MeshMotion,

    /// Enable density / entropy squeezing
    pub squeeze: bool,
    /// Minimum entropy bound used by the entropy squeeze
    pub exps0: f64,

    /// Enable modal shock capturing
    pub shock_capture: bool,
    /// Sensor threshold above which the modal filter is applied
    pub shock_threshold: f64,

    /// Initial condition
    pub ic: InitialCondition,
    /// Free-stream density
    pub rho_ic: f64,
    /// Free-stream velocity
    pub v_ic: [f64; 3],
    /// Free-stream pressure
    pub p_ic: f64,
    /// Compare against the exact solution when computing errors
    pub test_case: bool,
    /// Error norm
    pub error_norm: ErrorNorm,
    /// Order of the Gauss rule used for error integration
    pub quad_order: usize,
    /// Periodic box [xmin, xmax, ymin, ymax] used to wrap exact solutions
    pub periodic_box: [f64; 4],

    /// Residual norm
    pub residual_norm: ResidualNorm,
    /// LDG switch parameter for the common solution
    pub ldg_beta: f64,
    /// LDG penalty parameter for the common viscous flux
    pub ldg_tau: f64,
    /// Compute the entropy-error sensor at solution points
    pub entropy_sensor: bool,

    /// p-multigrid settings (None disables PMG)
    pub pmg: Option<PmgConfig>,
    /// Restart from this file instead of applying the initial condition
    pub restart: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            n_dims: 2,
            order: 3,
            equation: Equation::NavierStokes,
            viscous: false,
            gamma: 1.4,
            prandtl: 0.72,
            mu: 1e-3,
            advect_velocity: [1.0, 1.0, 0.0],
            diff_d: 0.1,
            point_set: PointSet::Legendre,
            dt_mode: TimeStepMode::Fixed,
            dt: 1e-3,
            cfl: 0.5,
            rk: RkScheme::ClassicRk4,
            motion: MeshMotion::Static,
            squeeze: false,
            exps0: 0.0,
            shock_capture: false,
            shock_threshold: 1.0,
            ic: InitialCondition::FreeStream,
            rho_ic: 1.0,
            v_ic: [0.2, 0.0, 0.0],
            p_ic: 1.0 / 1.4,
            test_case: false,
            error_norm: ErrorNorm::L2,
            quad_order: 6,
            periodic_box: [-5.0, 5.0, -5.0, 5.0],
            residual_norm: ResidualNorm::L1,
            ldg_beta: 0.5,
            ldg_tau: 1.0,
            entropy_sensor: false,
            pmg: None,
            restart: None,
        }
    }
}

impl SolverConfig {
    /// Create a configuration for `equation` in `n_dims` dimensions at `order`.
    pub fn new(equation: Equation, n_dims: usize, order: usize) -> Self {
        let ic = match equation {
            Equation::NavierStokes => InitialCondition::FreeStream,
            Equation::AdvectionDiffusion => InitialCondition::GaussianBump,
        };
        Self {
            n_dims,
            order,
            equation,
            ic,
            ..Default::default()
        }
    }

    /// Number of conserved fields.
    pub fn n_fields(&self) -> usize {
        match self.equation {
            Equation::NavierStokes => self.n_dims + 2,
            Equation::AdvectionDiffusion => 1,
        }
    }

    /// Whether the mesh moves.
    pub fn is_moving(&self) -> bool {
        !matches!(self.motion, MeshMotion::Static)
    }

    /// Set the polynomial order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Enable or disable viscous terms.
    pub fn with_viscous(mut self, viscous: bool) -> Self {
        self.viscous = viscous;
        self
    }

    /// Set the initial condition.
    pub fn with_initial_condition(mut self, ic: InitialCondition) -> Self {
        self.ic = ic;
        self
    }

    /// Set the free-stream state.
    pub fn with_free_stream(mut self, rho: f64, v: [f64; 3], p: f64) -> Self {
        self.rho_ic = rho;
        self.v_ic = v;
        self.p_ic = p;
        self
    }

    /// Set the time-step mode and its parameters.
    pub fn with_time_step(mut self, mode: TimeStepMode, dt: f64, cfl: f64) -> Self {
        self.dt_mode = mode;
        self.dt = dt;
        self.cfl = cfl;
        self
    }

    /// Set the Runge-Kutta scheme.
    pub fn with_rk(mut self, rk: RkScheme) -> Self {
        self.rk = rk;
        self
    }

    /// Set the mesh motion law.
    pub fn with_motion(mut self, motion: MeshMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Enable squeezing with minimum entropy bound `exps0`.
    pub fn with_squeeze(mut self, exps0: f64) -> Self {
        self.squeeze = true;
        self.exps0 = exps0;
        self
    }

    /// Enable shock capturing above `threshold`.
    pub fn with_shock_capture(mut self, threshold: f64) -> Self {
        self.shock_capture = true;
        self.shock_threshold = threshold;
        self
    }

    /// Set the advection velocity and diffusion coefficient.
    pub fn with_advection(mut self, velocity: [f64; 3], diff_d: f64) -> Self {
        self.advect_velocity = velocity;
        self.diff_d = diff_d;
        self
    }

    /// Set the solution point family.
    pub fn with_point_set(mut self, point_set: PointSet) -> Self {
        self.point_set = point_set;
        self
    }

    /// Enable p-multigrid.
    pub fn with_pmg(mut self, pmg: PmgConfig) -> Self {
        self.pmg = Some(pmg);
        self
    }

    /// Restart from a VTU file.
    pub fn with_restart(mut self, path: impl Into<PathBuf>) -> Self {
        self.restart = Some(path.into());
        self
    }

    /// Reject unsupported or inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        if self.n_dims != 2 && self.n_dims != 3 {
            return Err(FrError::InvalidConfig(format!(
                "n_dims must be 2 or 3, got {}",
                self.n_dims
            )));
        }
        if self.ic.equation() != self.equation {
            return Err(FrError::InvalidConfig(format!(
                "initial condition {:?} does not apply to {:?}",
                self.ic, self.equation
            )));
        }
        if self.dt_mode != TimeStepMode::Fixed {
            cfl_limit(self.order)?;
            if self.cfl <= 0.0 {
                return Err(FrError::InvalidConfig("CFL must be positive".into()));
            }
        } else if self.dt <= 0.0 {
            return Err(FrError::InvalidConfig("dt must be positive".into()));
        }
        if self.equation == Equation::NavierStokes && self.gamma <= 1.0 {
            return Err(FrError::InvalidConfig("gamma must exceed 1".into()));
        }
        if let Some(pmg) = &self.pmg {
            if self.is_moving() {
                return Err(FrError::InvalidConfig(
                    "p-multigrid requires a static mesh".into(),
                ));
            }
            if self.point_set == PointSet::Lobatto && pmg.low_order == 0 {
                return Err(FrError::InvalidConfig(
                    "Lobatto points need a PMG low order >= 1".into(),
                ));
            }
            if pmg.low_order >= self.order {
                return Err(FrError::InvalidConfig(format!(
                    "PMG low order {} must be below the run order {}",
                    pmg.low_order, self.order
                )));
            }
        }
        if self.point_set == PointSet::Lobatto && self.order == 0 {
            return Err(FrError::InvalidConfig(
                "Lobatto points need order >= 1".into(),
            ));
        }
        Ok(())
    }
}
