//! Fluxes, gradients and the FR correction.
//!
//! Static meshes carry the flux in reference space,
//! `F̃_d = Σ_j adj(J)(d, j) F_j`, so the divergence is a plain reference
//! derivative. Moving meshes keep the physical flux and apply the chain
//! rule through the adjugate `S` of the space-time Jacobian:
//!
//! ```text
//! det(J) ∇·F - det(J) v_g·∇U = Σ_{a,b} ∂F_b/∂ξ_a S(a, b) + Σ_a ∂U/∂ξ_a S(a, n_dims)
//! ```

use faer::Mat;

use super::{Context, Element};
use crate::geometry::{space_time_jacobian, PointTransform};
use crate::operators::Operators;
use crate::physics::{Physics, Tensor, MAX_FIELDS};

impl Element {
    /// Interpolate the solution to the flux points.
    pub fn extrapolate_u(&mut self, ops: &Operators) {
        ops.apply_spts_fpts(&self.u_spts, &mut self.u_fpts);
    }

    /// Uncorrected reference gradient of the solution.
    pub fn calc_grad_u_ref(&mut self, ops: &Operators) {
        ops.apply_grad_spts(&self.u_spts, &mut self.grad_u_ref);
    }

    /// Jump between the common and the discontinuous solution.
    pub fn calc_delta_uc(&mut self) {
        for f in 0..self.n_fpts {
            for k in 0..self.n_fields {
                self.duc_fpts[(f, k)] = self.uc_fpts[(f, k)] - self.u_fpts[(f, k)];
            }
        }
    }

    /// Physical gradient at the solution points: corrected reference
    /// gradient mapped through `adj(J) / det(J)`.
    ///
    /// `grad_u_ref` is left uncorrected.
    pub fn correct_grad_u(&mut self, ops: &Operators) {
        let nd = self.n_dims;
        for d in 0..nd {
            self.grad_u_spts[d].clone_from(&self.grad_u_ref[d]);
        }
        ops.apply_correct_grad_u(&self.duc_fpts, &mut self.grad_u_spts);

        let mut tmp = [[0.0; MAX_FIELDS]; 3];
        for spt in 0..self.n_spts {
            let t = &self.transform_spts[spt];
            for d in 0..nd {
                for k in 0..self.n_fields {
                    tmp[d][k] = self.grad_u_spts[d][(spt, k)];
                }
            }
            for j in 0..nd {
                for k in 0..self.n_fields {
                    let mut g = 0.0;
                    for d in 0..nd {
                        g += tmp[d][k] * t.adj[(d, j)];
                    }
                    self.grad_u_spts[j][(spt, k)] = g / t.det;
                }
            }
        }
    }

    /// Interpolate the physical gradient to the flux points.
    pub fn extrapolate_grad_u(&mut self, ops: &Operators) {
        for d in 0..self.n_dims {
            ops.apply_spts_fpts(&self.grad_u_spts[d], &mut self.grad_u_fpts[d]);
        }
    }

    /// Physical inviscid flux at the solution points.
    ///
    /// The flux is left in physical space so the viscous part can be added
    /// to it; static elements map the total with
    /// [`Element::transform_flux_to_reference`] once all contributions are in.
    pub fn calc_inviscid_flux(&mut self, ctx: &Context<'_>) {
        let mut u = [0.0; MAX_FIELDS];
        let mut flux: Tensor = [[0.0; MAX_FIELDS]; 3];
        for spt in 0..self.n_spts {
            self.gather_u(spt, &mut u);
            ctx.physics.inviscid_flux(&u, &mut flux);
            for d in 0..self.n_dims {
                for k in 0..self.n_fields {
                    self.f_spts[d][(spt, k)] = flux[d][k];
                }
            }
        }
    }

    /// Add the physical viscous flux at the solution points.
    ///
    /// Needs `grad_u_spts` from [`Element::correct_grad_u`]. Like the
    /// inviscid flux the result stays physical.
    pub fn calc_viscous_flux(&mut self, ctx: &Context<'_>) {
        let mut u = [0.0; MAX_FIELDS];
        let mut grad: Tensor = [[0.0; MAX_FIELDS]; 3];
        for spt in 0..self.n_spts {
            self.gather_u(spt, &mut u);
            for d in 0..self.n_dims {
                for k in 0..self.n_fields {
                    grad[d][k] = self.grad_u_spts[d][(spt, k)];
                }
            }
            let mut flux: Tensor = [[0.0; MAX_FIELDS]; 3];
            ctx.physics.add_viscous_flux(&u, &grad, &mut flux);
            for d in 0..self.n_dims {
                for k in 0..self.n_fields {
                    self.f_spts[d][(spt, k)] += flux[d][k];
                }
            }
        }
    }

    /// Map the flux from physical to reference space in place.
    pub fn transform_flux_to_reference(&mut self) {
        self.map_flux(|t, f, out, nd| {
            for a in 0..nd {
                out[a] = (0..nd).map(|b| t.adj[(a, b)] * f[b]).sum();
            }
        });
    }

    /// Map the flux from reference back to physical space in place.
    pub fn transform_flux_to_physical(&mut self) {
        self.map_flux(|t, f, out, nd| {
            for a in 0..nd {
                out[a] = (0..nd).map(|b| t.jac[(a, b)] * f[b]).sum::<f64>() / t.det;
            }
        });
    }

    fn map_flux(
        &mut self,
        op: impl Fn(&PointTransform, &[f64; 3], &mut [f64; 3], usize),
    ) {
        let nd = self.n_dims;
        let mut f = [0.0; 3];
        let mut out = [0.0; 3];
        for spt in 0..self.n_spts {
            let t = self.transform_spts[spt];
            for k in 0..self.n_fields {
                for d in 0..nd {
                    f[d] = self.f_spts[d][(spt, k)];
                }
                op(&t, &f, &mut out, nd);
                for d in 0..nd {
                    self.f_spts[d][(spt, k)] = out[d];
                }
            }
        }
    }

    /// Flux divergence (times det J) at the solution points into `stage`.
    pub fn calc_div_f_spts(&mut self, ops: &Operators, stage: usize) {
        if !self.moving {
            ops.apply_div_f_spts(&self.f_spts, &mut self.div_f_spts[stage]);
            return;
        }

        let nd = self.n_dims;
        for b in 0..nd {
            ops.apply_grad_spts(&self.f_spts[b], &mut self.df_ref[b * nd..(b + 1) * nd]);
        }
        // df_ref[b * nd + a] now holds ∂F_b/∂ξ_a
        let div = &mut self.div_f_spts[stage];
        for spt in 0..self.n_spts {
            let st = space_time_jacobian(&self.transform_spts[spt].jac, &self.grid_vel_spts[spt]);
            let s = st.adjoint();
            for k in 0..self.n_fields {
                let mut acc = 0.0;
                for a in 0..nd {
                    for b in 0..nd {
                        acc += self.df_ref[b * nd + a][(spt, k)] * s[(a, b)];
                    }
                    acc += self.grad_u_ref[a][(spt, k)] * s[(a, nd)];
                }
                div[(spt, k)] = acc;
            }
        }
    }

    /// Discontinuous normal flux at the flux points (scaled by dA).
    pub fn extrapolate_normal_flux(&mut self, ops: &Operators) {
        if !self.moving {
            ops.apply_extrapolate_fn(&self.f_spts, &ops.tnorm_fpts, None, &mut self.disfn_fpts);
            return;
        }
        ops.apply_extrapolate_fn(
            &self.f_spts,
            &self.norm_fpts,
            Some(self.da_fpts.as_slice()),
            &mut self.disfn_fpts,
        );
        for f in 0..self.n_fpts {
            let vgn: f64 = (0..self.n_dims)
                .map(|d| self.grid_vel_fpts[f][d] * self.norm_fpts[f][d])
                .sum::<f64>()
                * self.da_fpts[f];
            for k in 0..self.n_fields {
                self.disfn_fpts[(f, k)] -= vgn * self.u_fpts[(f, k)];
            }
        }
    }

    /// Jump between the common and the discontinuous normal flux.
    pub fn calc_delta_fn(&mut self) {
        for f in 0..self.n_fpts {
            for k in 0..self.n_fields {
                self.dfn_fpts[(f, k)] = self.fn_fpts[(f, k)] - self.disfn_fpts[(f, k)];
            }
        }
    }

    /// Add the correction-function contribution of the flux jump.
    pub fn correct_div_flux(&mut self, ops: &Operators, stage: usize) {
        ops.apply_correct_div_f(&self.dfn_fpts, &mut self.div_f_spts[stage]);
    }

    /// Physical flux divergence at one solution point (divides by det J).
    pub fn div_f_physical(&self, stage: usize, spt: usize, field: usize) -> f64 {
        self.div_f_spts[stage][(spt, field)] / self.transform_spts[spt].det
    }

    #[inline]
    pub(super) fn gather_u(&self, spt: usize, u: &mut [f64; MAX_FIELDS]) {
        for k in 0..self.n_fields {
            u[k] = self.u_spts[(spt, k)];
        }
    }

    #[inline]
    pub(crate) fn fpt_state(&self, m: &Mat<f64>, fpt: usize) -> [f64; MAX_FIELDS] {
        let mut out = [0.0; MAX_FIELDS];
        for k in 0..self.n_fields {
            out[k] = m[(fpt, k)];
        }
        out
    }
}
