//! p-multigrid acceleration.
//!
//! Full-approximation-storage V-cycle over a hierarchy of solvers that share
//! the mesh and differ only in polynomial order:
//!
//! ```text
//! fine (p)     R ──────────────────────────────────────── + P(ΔU)
//!   p-1          restrict U, r -> src -> smooth ──── + P(ΔU)
//!   ...                                      ...
//!   low_order                    restrict -> src -> smooth
//! ```
//!
//! On each coarse level the source `src = R(r_fine) - r_coarse(R U_fine)`
//! makes the restricted fine solution a fixed point of the source-augmented
//! update, so smoothing only changes it by the coarse-grid correction.

use std::collections::HashMap;
use std::sync::Arc;

use faer::linalg::matmul::matmul;
use faer::{Accum, Mat, Par};
use tracing::{debug, info};

use crate::comm::Communicator;
use crate::config::SolverConfig;
use crate::element::Element;
use crate::error::{FrError, Result};
use crate::geometry::ElementShape;
use crate::mesh::{CellStatus, Mesh};
use crate::operators::OperatorLibrary;
use crate::solver::Solver;

/// Transfer matrices between one level and the next finer one.
struct Transfer {
    /// finer spts -> coarse spts
    restrict: Mat<f64>,
    /// coarse spts -> finer spts
    prolong: Mat<f64>,
}

struct Level {
    solver: Solver,
    transfer: HashMap<ElementShape, Transfer>,
    /// Solution right after restriction
    u_init: Vec<Mat<f64>>,
}

/// Hierarchy of coarse solvers below a fine solver.
pub struct MultiGrid {
    order: usize,
    smooth_steps: usize,
    levels: Vec<Level>,
}

impl MultiGrid {
    /// Build coarse solvers for orders `order - 1` down to the configured
    /// low order on copies of `mesh`.
    pub fn setup(order: usize, config: &SolverConfig, mesh: &Mesh) -> Result<Self> {
        Self::setup_with_comm(order, config, mesh, Arc::new(crate::comm::SerialCommunicator))
    }

    /// As [`MultiGrid::setup`], reducing through `comm`.
    pub fn setup_with_comm(
        order: usize,
        config: &SolverConfig,
        mesh: &Mesh,
        comm: Arc<dyn Communicator>,
    ) -> Result<Self> {
        let pmg = config
            .pmg
            .clone()
            .ok_or_else(|| FrError::InvalidConfig("p-multigrid is not enabled".into()))?;
        if pmg.low_order >= order {
            return Err(FrError::InvalidConfig(format!(
                "PMG low order {} must be below the run order {order}",
                pmg.low_order
            )));
        }
        info!(order, low_order = pmg.low_order, "setting up p-multigrid");

        let mut shapes: Vec<ElementShape> = mesh.cells.iter().map(|c| c.shape).collect();
        shapes.sort();
        shapes.dedup();

        let mut fine_ops = OperatorLibrary::new();
        for &shape in &shapes {
            fine_ops.get_or_build(shape, order, config.point_set)?;
        }

        let mut levels: Vec<Level> = Vec::with_capacity(order - pmg.low_order);
        for p in (pmg.low_order..order).rev() {
            let solver = Solver::build(config.clone().with_order(p), mesh.clone(), comm.clone())?;
            let finer = levels.last().map_or(&fine_ops, |l| &l.solver.ops);
            let mut transfer = HashMap::new();
            for &shape in &shapes {
                let (Some(f), Some(c)) = (
                    finer.find(shape, p + 1, config.point_set),
                    solver.ops.find(shape, p, config.point_set),
                ) else {
                    return Err(FrError::UnsupportedElement {
                        shape,
                        n_nodes: 0,
                        reason: "no operators for multigrid transfer",
                    });
                };
                transfer.insert(
                    shape,
                    Transfer {
                        restrict: f.restriction_to(c),
                        prolong: f.prolongation_from(c),
                    },
                );
            }
            let u_init = solver.elements.iter().map(|e| e.u_spts.clone()).collect();
            levels.push(Level {
                solver,
                transfer,
                u_init,
            });
        }

        Ok(Self {
            order,
            smooth_steps: pmg.smooth_steps,
            levels,
        })
    }

    /// Order of the fine solver this hierarchy serves.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of coarse levels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Orders of the coarse levels, finest first.
    pub fn level_orders(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.solver.order()).collect()
    }

    /// One V-cycle correcting the solution of `fine`.
    pub fn cycle(&mut self, fine: &mut Solver) -> Result<()> {
        if fine.order() != self.order {
            return Err(FrError::InvalidConfig(format!(
                "multigrid built for order {} but the fine solver has order {}",
                self.order,
                fine.order()
            )));
        }
        fine.calc_residual(0)?;

        for i in 0..self.levels.len() {
            let (done, rest) = self.levels.split_at_mut(i);
            let level = &mut rest[0];
            let (finer_elements, finer_time, with_src) = match done.last() {
                Some(prev) => (&prev.solver.elements, prev.solver.time, true),
                None => (&fine.elements, fine.time, false),
            };
            level.restrict(finer_elements, with_src);
            level.solver.time = finer_time;
            level.solver.rk_time = finer_time;

            level.solver.calc_residual(0)?;
            level.compute_source();
            for _ in 0..self.smooth_steps {
                level.solver.update(true)?;
            }
            level.solver.time = finer_time;
            debug!(order = level.solver.order(), "coarse level smoothed");
        }

        for i in (0..self.levels.len()).rev() {
            let (done, rest) = self.levels.split_at_mut(i);
            let level = &rest[0];
            let finer_elements = match done.last_mut() {
                Some(prev) => &mut prev.solver.elements,
                None => &mut fine.elements,
            };
            level.prolong_correction(finer_elements);
        }
        Ok(())
    }
}

impl Level {
    /// Restrict solution and physical residual from the next finer level.
    ///
    /// The finer residual includes its own source when it is a coarse level.
    fn restrict(&mut self, finer: &[Element], with_src: bool) {
        for ((ec, ef), u0) in self
            .solver
            .elements
            .iter_mut()
            .zip(finer)
            .zip(self.u_init.iter_mut())
        {
            let Some(t) = self.transfer.get(&ec.shape) else {
                continue;
            };
            apply(&t.restrict, &ef.u_spts, &mut ec.u_spts);
            u0.clone_from(&ec.u_spts);

            let mut r_f = ef.div_f_spts[0].clone();
            for spt in 0..ef.n_spts {
                let det = ef.transform_spts[spt].det;
                for k in 0..ef.n_fields {
                    let src = match (&ef.src_spts, with_src) {
                        (Some(s), true) => s[(spt, k)],
                        _ => 0.0,
                    };
                    r_f[(spt, k)] = (r_f[(spt, k)] + src) / det;
                }
            }
            if let Some(src) = ec.src_spts.as_mut() {
                apply(&t.restrict, &r_f, src);
            } else {
                let mut src = Mat::zeros(ec.n_spts, ec.n_fields);
                apply(&t.restrict, &r_f, &mut src);
                ec.src_spts = Some(src);
            }
        }
    }

    /// `src = det * R(r_finer) - r_coarse` at every solution point.
    fn compute_source(&mut self) {
        for e in self.solver.elements.iter_mut() {
            let Some(src) = e.src_spts.as_mut() else {
                continue;
            };
            for spt in 0..e.n_spts {
                let det = e.transform_spts[spt].det;
                for k in 0..e.n_fields {
                    src[(spt, k)] = src[(spt, k)] * det - e.div_f_spts[0][(spt, k)];
                }
            }
        }
    }

    /// `U_finer += P (U - U_init)` on cells the time integrator updates.
    fn prolong_correction(&self, finer: &mut [Element]) {
        for ((ec, ef), u0) in self.solver.elements.iter().zip(finer).zip(&self.u_init) {
            if ef.status != CellStatus::Normal {
                continue;
            }
            let Some(t) = self.transfer.get(&ec.shape) else {
                continue;
            };
            let du = &ec.u_spts - u0;
            matmul(
                ef.u_spts.as_mut(),
                Accum::Add,
                t.prolong.as_ref(),
                du.as_ref(),
                1.0,
                Par::Seq,
            );
        }
    }
}

fn apply(m: &Mat<f64>, src: &Mat<f64>, dst: &mut Mat<f64>) {
    matmul(dst.as_mut(), Accum::Replace, m.as_ref(), src.as_ref(), 1.0, Par::Seq);
}
