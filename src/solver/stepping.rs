//! Runge-Kutta driver, time step and mesh motion.

use tracing::debug;

use super::parallel::{for_each_element, min_over_elements, try_for_each_element};
use super::Solver;
use crate::config::TimeStepMode;
use crate::element::Element;
use crate::error::Result;
use crate::mesh::CellStatus;

impl Solver {
    /// Advance one time step.
    ///
    /// With `use_source` every stage adds the p-multigrid source term.
    pub fn update(&mut self, use_source: bool) -> Result<()> {
        self.iter += 1;
        if self.config.dt_mode != TimeStepMode::Fixed {
            self.calc_dt()?;
        }

        let a = self.config.rk.stage_fractions();
        let b = self.config.rk.weights();
        let n = a.len();

        for stage in 0..n - 1 {
            self.rk_time = self.time + a[stage] * self.dt;
            self.move_mesh(stage)?;
            if stage == 0 {
                for_each_element(&mut self.elements, Element::copy_u_to_u0);
            }
            self.calc_residual(stage)?;
            let coeff = a[stage + 1];
            for_each_normal(&mut self.elements, |e| e.time_step_a(stage, coeff, use_source));
        }

        self.rk_time = self.time + a[n - 1] * self.dt;
        self.move_mesh(n - 1)?;
        self.calc_residual(n - 1)?;
        if n > 1 {
            for_each_element(&mut self.elements, Element::copy_u0_to_u);
        }
        for_each_normal(&mut self.elements, |e| {
            for (stage, &w) in b.iter().enumerate() {
                e.time_step_b(stage, w, use_source);
            }
        });

        self.time += self.dt;
        debug!(iter = self.iter, time = self.time, dt = self.dt, "step complete");
        Ok(())
    }

    /// CFL time step from the last wave speeds, reduced over all partitions.
    ///
    /// `GlobalCfl` gives every element the global minimum; `LocalCfl` keeps
    /// each element's own bound and reports the minimum.
    pub fn calc_dt(&mut self) -> Result<f64> {
        let cfl = self.config.cfl;
        let local = min_over_elements(&mut self.elements, |e| e.calc_dt(cfl))?;
        let dt = self.comm.all_reduce_min(local);
        if self.config.dt_mode == TimeStepMode::GlobalCfl {
            for_each_element(&mut self.elements, |e| e.dt = dt);
        }
        self.dt = dt;
        Ok(dt)
    }

    /// Move the mesh to the time of `stage` and rebuild element transforms.
    pub fn move_mesh(&mut self, stage: usize) -> Result<()> {
        if !self.config.is_moving() {
            return Ok(());
        }
        let t = self.time + self.config.rk.stage_fractions()[stage] * self.dt;
        self.mesh.move_to(t);
        let mesh = &self.mesh;
        let ops = &self.ops;
        try_for_each_element(&mut self.elements, |e| {
            let nodes = mesh.cell_nodes(e.id);
            let vel = mesh.cell_node_velocities(e.id);
            e.move_nodes(&ops[e.ops], &nodes, &vel)
        })
    }
}

/// Apply `f` to cells the time integrator updates.
fn for_each_normal<F>(elements: &mut [Element], f: F)
where
    F: Fn(&mut Element) + Send + Sync,
{
    for_each_element(elements, |e| {
        if e.status == CellStatus::Normal {
            f(e);
        }
    });
}
