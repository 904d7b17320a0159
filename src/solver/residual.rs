//! The residual pipeline.

use super::parallel::{for_each_element, for_each_face, try_for_each_element};
use super::Solver;
use crate::config::TimeStepMode;
use crate::element::Context;
use crate::error::Result;

impl Solver {
    /// Flux divergence of the current solution into RK stage `stage`.
    pub fn calc_residual(&mut self, stage: usize) -> Result<()> {
        let ctx = Context {
            config: &self.config,
            physics: &self.physics,
            ops: &self.ops,
        };
        let config = ctx.config;
        let need_grad = config.viscous || config.is_moving();
        let cfl_mode = config.dt_mode != TimeStepMode::Fixed;

        try_for_each_element(&mut self.elements, |e| {
            let ops = &ctx.ops[e.ops];
            if config.shock_capture {
                e.shock_capture(ops, config.shock_threshold);
            }
            e.extrapolate_u(ops);
            if config.squeeze {
                e.squeeze(&ctx)?;
            }
            if need_grad {
                e.calc_grad_u_ref(ops);
            }
            e.calc_inviscid_flux(&ctx);
            if cfl_mode {
                e.calc_wave_speed(&ctx);
            }
            Ok(())
        })?;

        if config.viscous {
            {
                let elements = &self.elements;
                for_each_face(&mut self.faces, |f| f.calc_common_solution(elements, &ctx));
            }
            for face in &self.faces {
                face.scatter_common_solution(&mut self.elements);
            }
            for_each_element(&mut self.elements, |e| {
                let ops = &ctx.ops[e.ops];
                e.calc_delta_uc();
                e.correct_grad_u(ops);
                e.extrapolate_grad_u(ops);
                e.calc_viscous_flux(&ctx);
            });
        }

        {
            let elements = &self.elements;
            for_each_face(&mut self.faces, |f| f.calc_common_flux(elements, &ctx));
        }
        for face in &self.faces {
            face.scatter_common_flux(&mut self.elements);
        }

        for_each_element(&mut self.elements, |e| {
            let ops = &ctx.ops[e.ops];
            if !e.moving {
                e.transform_flux_to_reference();
            }
            e.calc_div_f_spts(ops, stage);
            e.extrapolate_normal_flux(ops);
            e.calc_delta_fn();
            e.correct_div_flux(ops, stage);
        });
        Ok(())
    }
}
