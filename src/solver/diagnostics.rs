//! Global diagnostics and plot output.

use std::path::Path;

use super::parallel::{for_each_element, sum_over_elements};
use super::Solver;
use crate::config::{ErrorNorm, ResidualNorm};
use crate::element::{Context, PlotData};
use crate::error::Result;
use crate::face::{Face, WallForce};
use crate::io::write_vtu_file;
use crate::mesh::CellStatus;

impl Solver {
    /// Error against the exact solution, integrated over the domain and
    /// reduced over all partitions (square-rooted for the L2 norm).
    pub fn integrate_error(&self) -> Vec<f64> {
        let ctx = self.context();
        let time = self.time;
        let mut err = sum_over_elements(&self.elements, self.config.n_fields(), |e| {
            e.calc_error(&ctx, time)
        });
        self.comm.all_reduce_sum(&mut err);
        if self.config.error_norm == ErrorNorm::L2 {
            for v in err.iter_mut() {
                *v = v.abs().sqrt();
            }
        }
        err
    }

    /// Norm of the stage-0 residual over normal cells and all partitions.
    pub fn residual_norm(&self) -> Vec<f64> {
        let norm = self.config.residual_norm;
        let n_fields = self.config.n_fields();
        let normal = self
            .elements
            .iter()
            .filter(|e| e.status == CellStatus::Normal);
        let mut res = vec![0.0f64; n_fields];
        for e in normal {
            let r = e.norm_residual(&self.ops[e.ops], norm);
            for (acc, v) in res.iter_mut().zip(r) {
                match norm {
                    ResidualNorm::Max => *acc = acc.max(v),
                    _ => *acc += v,
                }
            }
        }
        match norm {
            ResidualNorm::Max => {
                for v in res.iter_mut() {
                    *v = -self.comm.all_reduce_min(-*v);
                }
            }
            ResidualNorm::L1 => self.comm.all_reduce_sum(&mut res),
            ResidualNorm::L2 => {
                self.comm.all_reduce_sum(&mut res);
                for v in res.iter_mut() {
                    *v = v.sqrt();
                }
            }
        }
        res
    }

    /// Domain integral of every conserved field.
    pub fn total_conserved(&self) -> Vec<f64> {
        let ops = &self.ops;
        let mut sum = sum_over_elements(&self.elements, self.config.n_fields(), |e| {
            e.total_conserved(&ops[e.ops])
        });
        self.comm.all_reduce_sum(&mut sum);
        sum
    }

    /// Pressure and viscous force on all wall boundaries.
    pub fn wall_force(&self) -> WallForce {
        let ctx = self.context();
        let mut force = WallForce::default();
        for face in &self.faces {
            if let Face::Boundary(f) = face {
                force += f.wall_force(&self.elements, &ctx);
            }
        }
        let mut buf = [
            force.inviscid[0],
            force.inviscid[1],
            force.inviscid[2],
            force.viscous[0],
            force.viscous[1],
            force.viscous[2],
        ];
        self.comm.all_reduce_sum(&mut buf);
        WallForce {
            inviscid: [buf[0], buf[1], buf[2]],
            viscous: [buf[3], buf[4], buf[5]],
        }
    }

    /// Net mass (or scalar) flux out through the boundary faces, from the
    /// common fluxes of the last residual.
    pub fn mass_flux(&self) -> f64 {
        let ctx = self.context();
        let mut flux = [self
            .faces
            .iter()
            .filter_map(|f| match f {
                Face::Boundary(b) => Some(b.mass_flux(&self.elements, &ctx)),
                Face::Interior(_) => None,
            })
            .sum::<f64>()];
        self.comm.all_reduce_sum(&mut flux);
        flux[0]
    }

    /// Entropy-error sensor at every solution point (Navier-Stokes only).
    pub fn calc_entropy_error(&mut self) {
        let Some(ns) = self.physics.navier_stokes() else {
            return;
        };
        for_each_element(&mut self.elements, |e| e.calc_entropy_error(ns));
    }

    /// Plot-grid data of every element.
    pub fn plot_data(&self) -> Vec<PlotData> {
        let ctx: Context<'_> = self.context();
        self.elements.iter().map(|e| e.plot_data(&ctx)).collect()
    }

    /// Write the solution as a VTU file, with iblank data on overset meshes.
    pub fn write_plot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.config.entropy_sensor {
            self.calc_entropy_error();
        }
        let plots = self.plot_data();
        let iblank = self.is_overset().then_some(self.mesh.cell_status.as_slice());
        write_vtu_file(path, &plots, self.time, iblank)
    }
}
