//! Faces shared by two elements, including periodic pairs.

use faer::Mat;

use super::{face_fpts, row, viscous_normal_flux};
use crate::element::{Context, Element};
use crate::error::{FrError, Result};
use crate::geometry::Point;
use crate::mesh::ElementFace;
use crate::physics::{ldg_common_solution, ldg_common_viscous_flux, NumericalFlux, Rusanov, MAX_FIELDS};

/// Relative distance below which two flux points are the same point.
const MATCH_TOL: f64 = 1e-6;

/// Face between a left (owner) and a right element.
#[derive(Clone, Debug)]
pub struct InteriorFace {
    /// Owner side
    pub left: ElementFace,
    /// Neighbour side
    pub right: ElementFace,
    /// Left flux points
    pub fpts_l: Vec<usize>,
    /// Right flux points matching `fpts_l` pairwise
    pub fpts_r: Vec<usize>,
    /// Translation from the left face to the right one (zero unless periodic)
    pub offset: Point,
    uc: Mat<f64>,
    fn_l: Mat<f64>,
    fn_r: Mat<f64>,
}

impl InteriorFace {
    /// Pair the flux points of both sides by physical position.
    pub fn new(
        left: ElementFace,
        right: ElementFace,
        offset: Point,
        elements: &[Element],
        ctx: &Context<'_>,
    ) -> Result<Self> {
        let el = &elements[left.element];
        let er = &elements[right.element];
        let nfp_l = ctx.ops[el.ops].n_fpts_per_face();
        let nfp_r = ctx.ops[er.ops].n_fpts_per_face();
        if nfp_l != nfp_r {
            return Err(FrError::MeshConnectivity(format!(
                "elements {} and {} have different face resolutions",
                left.element, right.element
            )));
        }

        let fpts_l = face_fpts(nfp_l, left.face);
        let candidates = face_fpts(nfp_r, right.face);
        let tol = MATCH_TOL * el.geometry().min_extent().max(f64::MIN_POSITIVE);
        // shared vertices summed in different orders
        let offset = if offset.norm() <= tol { Point::zero() } else { offset };
        let mut fpts_r = Vec::with_capacity(nfp_l);
        for &fl in &fpts_l {
            let target = el.pos_fpts[fl] + offset;
            let (best, dist) = candidates
                .iter()
                .map(|&fr| (fr, er.pos_fpts[fr].distance(&target)))
                .fold((usize::MAX, f64::INFINITY), |a, b| if b.1 < a.1 { b } else { a });
            if dist > tol {
                return Err(FrError::MeshConnectivity(format!(
                    "no flux point of element {} face {} matches element {} fpt {fl} (distance {dist:e})",
                    right.element, right.face, left.element
                )));
            }
            fpts_r.push(best);
        }

        let n = fpts_l.len();
        let nf = el.n_fields;
        Ok(Self {
            left,
            right,
            fpts_l,
            fpts_r,
            offset,
            uc: Mat::zeros(n, nf),
            fn_l: Mat::zeros(n, nf),
            fn_r: Mat::zeros(n, nf),
        })
    }

    /// Whether the face joins two periodic images.
    pub fn is_periodic(&self) -> bool {
        self.offset.norm() > 0.0
    }

    pub(super) fn calc_common_solution(&mut self, elements: &[Element], ctx: &Context<'_>) {
        let el = &elements[self.left.element];
        let er = &elements[self.right.element];
        let nf = el.n_fields;
        let mut uc = [0.0; MAX_FIELDS];
        for (i, (&fl, &fr)) in self.fpts_l.iter().zip(&self.fpts_r).enumerate() {
            let u_l = row(&el.u_fpts, fl, nf);
            let u_r = row(&er.u_fpts, fr, nf);
            ldg_common_solution(&u_l[..nf], &u_r[..nf], ctx.config.ldg_beta, &mut uc[..nf]);
            for k in 0..nf {
                self.uc[(i, k)] = uc[k];
            }
        }
    }

    pub(super) fn calc_common_flux(&mut self, elements: &[Element], ctx: &Context<'_>) {
        let el = &elements[self.left.element];
        let er = &elements[self.right.element];
        let nf = el.n_fields;
        let mut fn_ = [0.0; MAX_FIELDS];
        let mut fv = [0.0; MAX_FIELDS];
        for (i, (&fl, &fr)) in self.fpts_l.iter().zip(&self.fpts_r).enumerate() {
            let u_l = row(&el.u_fpts, fl, nf);
            let u_r = row(&er.u_fpts, fr, nf);
            let normal = el.norm_fpts[fl];
            Rusanov.compute(ctx.physics, &u_l, &u_r, &normal, &el.grid_vel_fpts[fl], &mut fn_);

            if ctx.config.viscous {
                let fv_l = viscous_normal_flux(el, ctx.physics, fl, &normal);
                let fv_r = viscous_normal_flux(er, ctx.physics, fr, &normal);
                ldg_common_viscous_flux(
                    &fv_l[..nf],
                    &fv_r[..nf],
                    &u_l[..nf],
                    &u_r[..nf],
                    ctx.config.ldg_beta,
                    ctx.config.ldg_tau,
                    &mut fv[..nf],
                );
                for k in 0..nf {
                    fn_[k] += fv[k];
                }
            }

            let da_l = el.da_fpts[fl];
            let da_r = er.da_fpts[fr];
            for k in 0..nf {
                self.fn_l[(i, k)] = fn_[k] * da_l;
                self.fn_r[(i, k)] = -fn_[k] * da_r;
            }
        }
    }

    pub(super) fn scatter_common_solution(&self, elements: &mut [Element]) {
        for (i, (&fl, &fr)) in self.fpts_l.iter().zip(&self.fpts_r).enumerate() {
            for k in 0..self.uc.ncols() {
                elements[self.left.element].uc_fpts[(fl, k)] = self.uc[(i, k)];
                elements[self.right.element].uc_fpts[(fr, k)] = self.uc[(i, k)];
            }
        }
    }

    pub(super) fn scatter_common_flux(&self, elements: &mut [Element]) {
        for (i, (&fl, &fr)) in self.fpts_l.iter().zip(&self.fpts_r).enumerate() {
            for k in 0..self.fn_l.ncols() {
                elements[self.left.element].fn_fpts[(fl, k)] = self.fn_l[(i, k)];
                elements[self.right.element].fn_fpts[(fr, k)] = self.fn_r[(i, k)];
            }
        }
    }

    /// Common normal flux on the left side (scaled by the left face metric).
    pub fn common_flux_left(&self) -> &Mat<f64> {
        &self.fn_l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Equation, SolverConfig};
    use crate::face::Face;
    use crate::geometry::ElementShape;
    use crate::mesh::Mesh;
    use crate::operators::OperatorLibrary;
    use crate::physics::Equations;
    use approx::assert_relative_eq;

    fn elements(mesh: &Mesh, config: &SolverConfig, lib: &mut OperatorLibrary) -> Vec<Element> {
        (0..mesh.n_cells())
            .map(|k| {
                Element::new(
                    k,
                    ElementShape::Quad,
                    mesh.cell_nodes(k),
                    mesh.cell_node_velocities(k),
                    config.order,
                    lib,
                    config,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_flux_points_pair_up() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 3);
        let physics = Equations::from_config(&config);
        let mesh = Mesh::periodic_quad(0.0, 2.0, 0.0, 2.0, 2, 2).unwrap();
        let mut lib = OperatorLibrary::new();
        let eles = elements(&mesh, &config, &mut lib);
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        let faces = Face::build_all(&mesh, &eles, &ctx).unwrap();
        assert_eq!(faces.len(), 8);
        let mut n_periodic = 0;
        for face in &faces {
            let Face::Interior(f) = face else {
                panic!("periodic mesh has no boundary faces");
            };
            if f.is_periodic() {
                n_periodic += 1;
            }
            for (&fl, &fr) in f.fpts_l.iter().zip(&f.fpts_r) {
                let pl = eles[f.left.element].pos_fpts[fl] + f.offset;
                let pr = eles[f.right.element].pos_fpts[fr];
                assert!(pl.distance(&pr) < 1e-12);
                // opposite normals
                let nl = eles[f.left.element].norm_fpts[fl];
                let nr = eles[f.right.element].norm_fpts[fr];
                assert_relative_eq!(nl.dot(&nr), -1.0, epsilon = 1e-12);
            }
        }
        assert_eq!(n_periodic, 4);
    }

    #[test]
    fn test_common_flux_is_conservative() {
        let config = SolverConfig::new(Equation::AdvectionDiffusion, 2, 2)
            .with_advection([1.0, 0.3, 0.0], 0.0);
        let physics = Equations::from_config(&config);
        let mesh = Mesh::periodic_quad(0.0, 2.0, 0.0, 1.0, 2, 1).unwrap();
        let mut lib = OperatorLibrary::new();
        let mut eles = elements(&mesh, &config, &mut lib);
        for (k, e) in eles.iter_mut().enumerate() {
            for f in 0..e.n_fpts {
                e.u_fpts[(f, 0)] = 1.0 + k as f64 + 0.1 * f as f64;
            }
        }
        let ctx = Context {
            config: &config,
            physics: &physics,
            ops: &lib,
        };
        let mut faces = Face::build_all(&mesh, &eles, &ctx).unwrap();
        for face in faces.iter_mut() {
            face.calc_common_flux(&eles, &ctx);
        }
        for face in &faces {
            face.scatter_common_flux(&mut eles);
        }
        for face in &faces {
            let Face::Interior(f) = face else { continue };
            for (&fl, &fr) in f.fpts_l.iter().zip(&f.fpts_r) {
                let sum = eles[f.left.element].fn_fpts[(fl, 0)] + eles[f.right.element].fn_fpts[(fr, 0)];
                assert!(sum.abs() < 1e-13);
            }
        }
    }
}
