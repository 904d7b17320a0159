//! Boundary faces and their ghost states.
//!
//! | Tag                              | Ghost `U_R`                    | `Uc`           | viscous flux        |
//! |----------------------------------|--------------------------------|----------------|---------------------|
//! | `Farfield`                       | free stream / initial state    | `U_R`          | `Fv_L·n + τ(U_L-U_R)` |
//! | `SlipWall`                       | mirrored relative velocity     | `½(U_L+U_R)`   | `Fv_L·n`            |
//! | `Extrapolate`, `Overset`, others | `U_L`                          | `U_L`          | `Fv_L·n`            |

use faer::Mat;

use super::{face_fpts, row, viscous_normal_flux, WallForce};
use crate::element::{Context, Element};
use crate::geometry::Point;
use crate::mesh::{BoundaryTag, ElementFace};
use crate::physics::{initial_state, NumericalFlux, Rusanov, State, MAX_FIELDS};

/// Face on the domain boundary.
#[derive(Clone, Debug)]
pub struct BoundaryFace {
    /// Owning element face
    pub left: ElementFace,
    /// Boundary condition selector
    pub tag: BoundaryTag,
    /// Flux points of the owning face
    pub fpts: Vec<usize>,
    uc: Mat<f64>,
    fn_l: Mat<f64>,
}

impl BoundaryFace {
    pub fn new(left: ElementFace, tag: BoundaryTag, elements: &[Element], ctx: &Context<'_>) -> Self {
        let ele = &elements[left.element];
        let fpts = face_fpts(ctx.ops[ele.ops].n_fpts_per_face(), left.face);
        let n = fpts.len();
        Self {
            left,
            tag,
            fpts,
            uc: Mat::zeros(n, ele.n_fields),
            fn_l: Mat::zeros(n, ele.n_fields),
        }
    }

    /// Ghost state at flux point `fpt` of the owning element.
    pub fn ghost_state(&self, ele: &Element, fpt: usize, ctx: &Context<'_>) -> State {
        let nf = ele.n_fields;
        let u_l = row(&ele.u_fpts, fpt, nf);
        match (self.tag, ctx.physics.navier_stokes()) {
            (BoundaryTag::Farfield, Some(ns)) => {
                ns.conserved(ctx.config.rho_ic, &ctx.config.v_ic, ctx.config.p_ic)
            }
            (BoundaryTag::Farfield, None) => initial_state(ctx.config, &ele.pos_fpts[fpt]),
            (BoundaryTag::SlipWall, Some(ns)) => {
                let nd = ele.n_dims;
                let n = ele.norm_fpts[fpt];
                let vg = ele.grid_vel_fpts[fpt];
                let rho = u_l[0];
                let p = ns.pressure(&u_l[..nf]);
                let mut vel = [0.0; 3];
                for d in 0..nd {
                    vel[d] = u_l[d + 1] / rho;
                }
                let vn: f64 = (0..nd).map(|d| (vel[d] - vg[d]) * n[d]).sum();
                for d in 0..nd {
                    vel[d] -= 2.0 * vn * n[d];
                }
                ns.conserved(rho, &vel, p)
            }
            _ => u_l,
        }
    }

    pub(super) fn calc_common_solution(&mut self, elements: &[Element], ctx: &Context<'_>) {
        let ele = &elements[self.left.element];
        let nf = ele.n_fields;
        for (i, &fpt) in self.fpts.iter().enumerate() {
            let u_l = row(&ele.u_fpts, fpt, nf);
            let u_r = self.ghost_state(ele, fpt, ctx);
            for k in 0..nf {
                self.uc[(i, k)] = match self.tag {
                    BoundaryTag::Farfield => u_r[k],
                    BoundaryTag::SlipWall => 0.5 * (u_l[k] + u_r[k]),
                    _ => u_l[k],
                };
            }
        }
    }

    pub(super) fn calc_common_flux(&mut self, elements: &[Element], ctx: &Context<'_>) {
        let ele = &elements[self.left.element];
        let nf = ele.n_fields;
        let mut fn_ = [0.0; MAX_FIELDS];
        for (i, &fpt) in self.fpts.iter().enumerate() {
            let u_l = row(&ele.u_fpts, fpt, nf);
            let u_r = self.ghost_state(ele, fpt, ctx);
            let normal = ele.norm_fpts[fpt];
            Rusanov.compute(ctx.physics, &u_l, &u_r, &normal, &ele.grid_vel_fpts[fpt], &mut fn_);

            if ctx.config.viscous {
                let fv = viscous_normal_flux(ele, ctx.physics, fpt, &normal);
                let penalty = if self.tag == BoundaryTag::Farfield {
                    ctx.config.ldg_tau
                } else {
                    0.0
                };
                for k in 0..nf {
                    fn_[k] += fv[k] + penalty * (u_l[k] - u_r[k]);
                }
            }

            let da = ele.da_fpts[fpt];
            for k in 0..nf {
                self.fn_l[(i, k)] = fn_[k] * da;
            }
        }
    }

    pub(super) fn scatter_common_solution(&self, elements: &mut [Element]) {
        let ele = &mut elements[self.left.element];
        for (i, &fpt) in self.fpts.iter().enumerate() {
            for k in 0..self.uc.ncols() {
                ele.uc_fpts[(fpt, k)] = self.uc[(i, k)];
            }
        }
    }

    pub(super) fn scatter_common_flux(&self, elements: &mut [Element]) {
        let ele = &mut elements[self.left.element];
        for (i, &fpt) in self.fpts.iter().enumerate() {
            for k in 0..self.fn_l.ncols() {
                ele.fn_fpts[(fpt, k)] = self.fn_l[(i, k)];
            }
        }
    }

    /// Pressure and viscous force exerted on this face if it is a wall.
    pub fn wall_force(&self, elements: &[Element], ctx: &Context<'_>) -> WallForce {
        let mut force = WallForce::default();
        let Some(ns) = ctx.physics.navier_stokes() else {
            return force;
        };
        if !self.tag.is_wall() {
            return force;
        }
        let ele = &elements[self.left.element];
        let ops = &ctx.ops[ele.ops];
        let nd = ele.n_dims;
        for &fpt in &self.fpts {
            let w = ops.weights_fpts[fpt] * ele.da_fpts[fpt];
            let n: Point = ele.norm_fpts[fpt];
            let u = row(&ele.u_fpts, fpt, ele.n_fields);
            let p = ns.pressure(&u[..ele.n_fields]);
            for d in 0..nd {
                force.inviscid[d] += w * p * n[d];
            }
            if ctx.config.viscous {
                let fv = viscous_normal_flux(ele, ns, fpt, &n);
                for d in 0..nd {
                    force.viscous[d] += w * fv[d + 1];
                }
            }
        }
        force
    }

    /// Integrated common mass (or scalar) flux leaving through this face.
    pub fn mass_flux(&self, elements: &[Element], ctx: &Context<'_>) -> f64 {
        let ops = &ctx.ops[elements[self.left.element].ops];
        self.fpts
            .iter()
            .enumerate()
            .map(|(i, &fpt)| ops.weights_fpts[fpt] * self.fn_l[(i, 0)])
            .sum()
    }
}
