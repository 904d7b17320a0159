//! Solver orchestration.
//!
//! [`Solver`] owns the mesh, the elements, the faces and the operator
//! library of one polynomial order, and drives them through the residual
//! pipeline and the explicit Runge-Kutta update:
//!
//! ```text
//! update:   [calc_dt] -> for each stage: move_mesh -> calc_residual -> step A
//!           final stage: move_mesh -> calc_residual -> restore U0 -> step B (all stages)
//! residual: shock capture -> extrapolate U -> squeeze -> ∇U_ref
//!           -> inviscid flux -> [common U -> corrected ∇U -> viscous flux]
//!           -> common flux -> divergence -> correction
//! ```
//!
//! Global reductions (time step, diagnostics) go through a
//! [`Communicator`].

mod diagnostics;
mod parallel;
mod residual;
mod stepping;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::comm::{Communicator, SerialCommunicator};
use crate::config::{SolverConfig, TimeStepMode};
use crate::element::{Context, Element};
use crate::error::Result;
use crate::face::Face;
use crate::io::read_restart_file;
use crate::mesh::{BoundaryTag, CellStatus, Mesh};
use crate::operators::OperatorLibrary;
use crate::physics::{Equations, Physics};
use crate::time::IntegratorInfo;
use parallel::for_each_element;

/// Value written to every field of an element missing from a restart file.
pub const RESTART_PLACEHOLDER: f64 = 100.0;

/// Flux reconstruction solver at one polynomial order.
pub struct Solver {
    /// Run configuration (`config.order` is this solver's order)
    pub config: SolverConfig,
    /// Equation set
    pub physics: Equations,
    /// Operators shared by all elements
    pub ops: OperatorLibrary,
    /// Mesh at the current time
    pub mesh: Mesh,
    /// One element per mesh cell
    pub elements: Vec<Element>,
    /// Interior, periodic and boundary faces
    pub faces: Vec<Face>,
    /// Simulation time at the start of the current step
    pub time: f64,
    /// Time of the current Runge-Kutta stage
    pub rk_time: f64,
    /// Current (global) time step
    pub dt: f64,
    /// Completed steps
    pub iter: usize,
    comm: Arc<dyn Communicator>,
}

impl Solver {
    /// Validate `config` and build a single-partition solver on `mesh`.
    pub fn setup(config: SolverConfig, mesh: Mesh) -> Result<Self> {
        Self::setup_with_comm(config, mesh, Arc::new(SerialCommunicator))
    }

    /// Validate `config` and build a solver that reduces through `comm`.
    pub fn setup_with_comm(
        config: SolverConfig,
        mesh: Mesh,
        comm: Arc<dyn Communicator>,
    ) -> Result<Self> {
        config.validate()?;
        Self::build(config, mesh, comm)
    }

    /// Build without validation (coarse multigrid levels reuse a validated
    /// configuration at a lower order).
    pub(crate) fn build(
        config: SolverConfig,
        mut mesh: Mesh,
        comm: Arc<dyn Communicator>,
    ) -> Result<Self> {
        let physics = Equations::from_config(&config);
        if comm.is_root() {
            info!(
                equation = physics.name(),
                order = config.order,
                rk = config.rk.name(),
                n_dims = config.n_dims,
                n_cells = mesh.n_cells(),
                "setting up elements and faces"
            );
        }
        mesh.motion = config.motion;

        let mut ops = OperatorLibrary::new();
        let mut elements = Vec::with_capacity(mesh.n_cells());
        for (k, cell) in mesh.cells.iter().enumerate() {
            let mut ele = Element::new(
                k,
                cell.shape,
                mesh.cell_nodes(k),
                mesh.cell_node_velocities(k),
                config.order,
                &mut ops,
                &config,
            )?;
            ele.status = mesh.cell_status[k];
            elements.push(ele);
        }

        let faces = {
            let ctx = Context {
                config: &config,
                physics: &physics,
                ops: &ops,
            };
            Face::build_all(&mesh, &elements, &ctx)?
        };
        info!(
            n_elements = elements.len(),
            n_faces = faces.len(),
            n_operator_sets = ops.len(),
            "solver ready"
        );

        Ok(Self {
            dt: config.dt,
            config,
            physics,
            ops,
            mesh,
            elements,
            faces,
            time: 0.0,
            rk_time: 0.0,
            iter: 0,
            comm,
        })
    }

    /// Polynomial order of this solver.
    pub fn order(&self) -> usize {
        self.config.order
    }

    /// Number of Runge-Kutta stages per step.
    pub fn n_stages(&self) -> usize {
        self.config.rk.stage_fractions().len()
    }

    pub fn comm(&self) -> &Arc<dyn Communicator> {
        &self.comm
    }

    /// Whether any cell is blanked or any face receives overset data.
    pub fn is_overset(&self) -> bool {
        self.mesh.cell_status.iter().any(|s| *s != CellStatus::Normal)
            || self
                .mesh
                .faces
                .iter()
                .any(|f| f.boundary_tag == Some(BoundaryTag::Overset))
    }

    /// Apply the initial condition, or load the configured restart file.
    ///
    /// In CFL modes the wave speeds for the first time step are computed
    /// as well.
    pub fn initialize_solution(&mut self) -> Result<()> {
        if let Some(path) = self.config.restart.clone() {
            self.read_restart(&path)?;
        } else {
            if self.config.is_moving() {
                self.move_mesh(0)?;
            }
            let ctx = Context {
                config: &self.config,
                physics: &self.physics,
                ops: &self.ops,
            };
            for_each_element(&mut self.elements, |e| e.set_initial_condition(&ctx));
        }

        if self.config.dt_mode != TimeStepMode::Fixed {
            let ctx = Context {
                config: &self.config,
                physics: &self.physics,
                ops: &self.ops,
            };
            for_each_element(&mut self.elements, |e| {
                e.extrapolate_u(&ctx.ops[e.ops]);
                e.calc_wave_speed(&ctx);
            });
        }
        info!(time = self.time, "solution initialized");
        Ok(())
    }

    /// Load the solution (and time and iblank data) from a restart file.
    pub fn read_restart(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "restarting");
        let data = read_restart_file(path, self.config.n_dims, self.config.equation)?;
        if let Some(t) = data.time {
            self.time = t;
            self.rk_time = t;
        }

        let overset = self.is_overset();
        match data.iblank {
            Some(iblank) if iblank.len() == self.elements.len() => {
                for (ele, status) in self.elements.iter_mut().zip(&iblank) {
                    ele.status = *status;
                }
                self.mesh.cell_status = iblank;
            }
            Some(iblank) => warn!(
                expected = self.elements.len(),
                got = iblank.len(),
                "ignoring IBLANK_CELL data of the wrong length"
            ),
            None if overset => warn!("restart file has no IBLANK_CELL data"),
            None => {}
        }

        // geometry at the restart time
        self.move_mesh(0)?;

        let ctx = Context {
            config: &self.config,
            physics: &self.physics,
            ops: &self.ops,
        };
        for ele in self.elements.iter_mut() {
            if ele.status != CellStatus::Normal {
                continue;
            }
            match data.pieces.get(ele.id) {
                Some(piece) => ele.load_restart_piece(&ctx, piece)?,
                None => {
                    warn!(element = ele.id, "restart file has no data for element");
                    for spt in 0..ele.n_spts {
                        for k in 0..ele.n_fields {
                            ele.u_spts[(spt, k)] = RESTART_PLACEHOLDER;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Context for element and face kernels.
    pub fn context(&self) -> Context<'_> {
        Context {
            config: &self.config,
            physics: &self.physics,
            ops: &self.ops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Equation, InitialCondition};
    use crate::error::FrError;
    use approx::assert_relative_eq;

    fn free_stream_solver() -> Solver {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2)
            .with_free_stream(1.0, [0.3, 0.1, 0.0], 1.0);
        let mesh = Mesh::periodic_quad(0.0, 1.0, 0.0, 1.0, 3, 3).unwrap();
        let mut solver = Solver::setup(config, mesh).unwrap();
        solver.initialize_solution().unwrap();
        solver
    }

    fn bump_solver() -> Solver {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2)
            .with_initial_condition(InitialCondition::GaussianBump)
            .with_advection([1.0, 0.5, 0.0], 0.0)
            .with_time_step(TimeStepMode::Fixed, 1e-2, 0.5);
        let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 4, 4).unwrap();
        let mut solver = Solver::setup(config, mesh).unwrap();
        solver.initialize_solution().unwrap();
        solver
    }

    #[test]
    fn test_setup_builds_elements_and_faces() {
        let solver = free_stream_solver();
        assert_eq!(solver.elements.len(), 9);
        // 2 * 3 * 3 faces on a doubly periodic grid
        assert_eq!(solver.faces.len(), 18);
        assert_eq!(solver.n_stages(), 4);
        assert!(!solver.is_overset());
    }

    #[test]
    fn test_free_stream_residual_vanishes() {
        let mut solver = free_stream_solver();
        solver.calc_residual(0).unwrap();
        for r in solver.residual_norm() {
            assert!(r.abs() < 1e-10, "residual {r}");
        }
    }

    #[test]
    fn test_free_stream_preserved_by_update() {
        let mut solver = free_stream_solver();
        let before: Vec<Vec<f64>> = solver.elements.iter().map(|e| e.u_spts_flat()).collect();
        solver.update(false).unwrap();
        assert_relative_eq!(solver.time, solver.config.dt);
        for (e, b) in solver.elements.iter().zip(&before) {
            for (x, y) in e.u_spts_flat().iter().zip(b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_update_conserves_scalar() {
        let mut solver = bump_solver();
        let before = solver.total_conserved();
        for _ in 0..3 {
            solver.update(false).unwrap();
        }
        let after = solver.total_conserved();
        assert_relative_eq!(before[0], after[0], epsilon = 1e-10);
        assert_eq!(solver.iter, 3);
    }

    #[test]
    fn test_periodic_mesh_has_no_wall_force_or_boundary_flux() {
        let mut solver = free_stream_solver();
        solver.calc_residual(0).unwrap();
        assert_eq!(solver.wall_force(), crate::face::WallForce::default());
        assert_eq!(solver.mass_flux(), 0.0);
    }

    #[test]
    fn test_global_cfl_sets_uniform_dt() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 2)
            .with_time_step(TimeStepMode::GlobalCfl, 0.0, 0.5);
        let mesh = Mesh::periodic_quad(0.0, 2.0, 0.0, 1.0, 4, 2).unwrap();
        let mut solver = Solver::setup(config, mesh).unwrap();
        solver.initialize_solution().unwrap();
        let dt = solver.calc_dt().unwrap();
        assert!(dt > 0.0 && dt.is_finite());
        for e in &solver.elements {
            assert_eq!(e.dt, dt);
        }
    }

    #[test]
    fn test_error_of_initial_condition_is_small() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 4)
            .with_initial_condition(InitialCondition::SineWave);
        let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 4, 4).unwrap();
        let mut solver = Solver::setup(config, mesh).unwrap();
        solver.initialize_solution().unwrap();
        let err = solver.integrate_error();
        assert_eq!(err.len(), 1);
        assert!(err[0] < 1e-2, "error {}", err[0]);
    }

    #[test]
    fn test_missing_restart_file() {
        let config = SolverConfig::new(Equation::NavierStokes, 2, 1)
            .with_restart("/nonexistent/fr-rs/restart.vtu");
        let mesh = Mesh::periodic_quad(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
        let mut solver = Solver::setup(config, mesh).unwrap();
        let err = solver.initialize_solution().unwrap_err();
        assert!(matches!(err, FrError::RestartFileMissing { .. }));
    }
}
