//! Compressible Navier-Stokes equations for a calorically perfect gas.
//!
//! Conserved variables are `[ρ, ρu, ρv, (ρw), E]` with
//! `p = (γ-1)(E - ½ρ|v|²)`. The viscous flux uses constant dynamic viscosity
//! and a heat flux `(μγ/Pr) ∇e` on the specific internal energy.

use super::{Physics, State, Tensor, MAX_FIELDS};
use crate::geometry::Point;

/// Ideal-gas Navier-Stokes (Euler when used without viscous terms).
#[derive(Clone, Debug)]
pub struct NavierStokes {
    /// Spatial dimension
    pub n_dims: usize,
    /// Ratio of specific heats
    pub gamma: f64,
    /// Dynamic viscosity
    pub mu: f64,
    /// Prandtl number
    pub prandtl: f64,
}

impl NavierStokes {
    /// Create the equation set.
    pub fn new(n_dims: usize, gamma: f64, mu: f64, prandtl: f64) -> Self {
        Self {
            n_dims,
            gamma,
            mu,
            prandtl,
        }
    }

    /// Pressure from the conserved state.
    #[inline]
    pub fn pressure(&self, u: &[f64]) -> f64 {
        let rho = u[0];
        let mom2: f64 = (1..=self.n_dims).map(|d| u[d] * u[d]).sum();
        (self.gamma - 1.0) * (u[self.n_dims + 1] - 0.5 * mom2 / rho)
    }

    /// Primitive variables `[ρ, u, v, (w), p]`.
    pub fn primitives(&self, u: &[f64]) -> State {
        let mut w = [0.0; MAX_FIELDS];
        w[0] = u[0];
        for d in 1..=self.n_dims {
            w[d] = u[d] / u[0];
        }
        w[self.n_dims + 1] = self.pressure(u);
        w
    }

    /// Conserved state from `ρ`, velocity and `p`.
    pub fn conserved(&self, rho: f64, vel: &[f64; 3], p: f64) -> State {
        let mut u = [0.0; MAX_FIELDS];
        u[0] = rho;
        let mut v2 = 0.0;
        for d in 0..self.n_dims {
            u[d + 1] = rho * vel[d];
            v2 += vel[d] * vel[d];
        }
        u[self.n_dims + 1] = p / (self.gamma - 1.0) + 0.5 * rho * v2;
        u
    }

    /// Speed of sound.
    #[inline]
    pub fn sound_speed(&self, u: &[f64]) -> f64 {
        (self.gamma * self.pressure(u) / u[0]).max(0.0).sqrt()
    }

    /// Entropy variables `∂S/∂U` for the entropy `S = -ρ s / (γ-1)`.
    pub fn entropy_variables(&self, u: &[f64]) -> State {
        let g = self.gamma;
        let w = self.primitives(u);
        let rho = w[0];
        let p = w[self.n_dims + 1];
        let s = p.ln() - g * rho.ln();
        let v2: f64 = (1..=self.n_dims).map(|d| w[d] * w[d]).sum();

        let mut v = [0.0; MAX_FIELDS];
        v[0] = (g - s) / (g - 1.0) - 0.5 * rho * v2 / p;
        for d in 1..=self.n_dims {
            v[d] = rho * w[d] / p;
        }
        v[self.n_dims + 1] = -rho / p;
        v
    }
}

impl Physics for NavierStokes {
    fn name(&self) -> &'static str {
        "Navier-Stokes"
    }

    fn n_fields(&self) -> usize {
        self.n_dims + 2
    }

    fn n_dims(&self) -> usize {
        self.n_dims
    }

    fn inviscid_flux(&self, u: &[f64], flux: &mut Tensor) {
        let nd = self.n_dims;
        let rho = u[0];
        let p = self.pressure(u);
        let e = u[nd + 1];
        for d in 0..nd {
            let vd = u[d + 1] / rho;
            flux[d][0] = u[d + 1];
            for i in 0..nd {
                flux[d][i + 1] = u[i + 1] * vd;
            }
            flux[d][d + 1] += p;
            flux[d][nd + 1] = vd * (e + p);
        }
    }

    fn add_viscous_flux(&self, u: &[f64], grad: &Tensor, flux: &mut Tensor) {
        let nd = self.n_dims;
        let rho = u[0];
        let e_tot = u[nd + 1];

        let mut vel = [0.0; 3];
        for i in 0..nd {
            vel[i] = u[i + 1] / rho;
        }

        // dv[i][j] = ∂v_i/∂x_j
        let mut dv = [[0.0; 3]; 3];
        for j in 0..nd {
            for i in 0..nd {
                dv[i][j] = (grad[j][i + 1] - vel[i] * grad[j][0]) / rho;
            }
        }
        let div_v: f64 = (0..nd).map(|i| dv[i][i]).sum();

        // Gradient of specific internal energy e = E/ρ - ½|v|²
        let mut de = [0.0; 3];
        for j in 0..nd {
            let d_etot = (grad[j][nd + 1] - e_tot / rho * grad[j][0]) / rho;
            let ke: f64 = (0..nd).map(|i| vel[i] * dv[i][j]).sum();
            de[j] = d_etot - ke;
        }

        let kappa = self.mu * self.gamma / self.prandtl;
        for j in 0..nd {
            let mut work = 0.0;
            for i in 0..nd {
                let mut tau = self.mu * (dv[i][j] + dv[j][i]);
                if i == j {
                    tau -= 2.0 / 3.0 * self.mu * div_v;
                }
                flux[j][i + 1] -= tau;
                work += vel[i] * tau;
            }
            flux[j][nd + 1] -= work + kappa * de[j];
        }
    }

    fn wave_speed(&self, u: &[f64], normal: &Point, grid_vel: &Point) -> f64 {
        let rho = u[0];
        let vn: f64 = (0..self.n_dims)
            .map(|d| (u[d + 1] / rho - grid_vel[d]) * normal[d])
            .sum();
        vn.abs() + self.sound_speed(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ns2d() -> NavierStokes {
        NavierStokes::new(2, 1.4, 0.01, 0.72)
    }

    #[test]
    fn test_primitive_round_trip() {
        let ns = NavierStokes::new(3, 1.4, 0.0, 0.72);
        let u = ns.conserved(1.2, &[0.3, -0.2, 0.5], 0.9);
        let w = ns.primitives(&u);
        assert_relative_eq!(w[0], 1.2);
        assert_relative_eq!(w[1], 0.3, epsilon = 1e-14);
        assert_relative_eq!(w[3], 0.5, epsilon = 1e-14);
        assert_relative_eq!(w[4], 0.9, epsilon = 1e-14);
    }

    #[test]
    fn test_inviscid_flux_uniform_flow() {
        let ns = ns2d();
        let u = ns.conserved(1.0, &[2.0, 0.0, 0.0], 1.0);
        let mut f = [[0.0; MAX_FIELDS]; 3];
        ns.inviscid_flux(&u, &mut f);
        assert_relative_eq!(f[0][0], 2.0);
        assert_relative_eq!(f[0][1], 4.0 + 1.0, epsilon = 1e-14);
        assert_relative_eq!(f[1][2], 1.0, epsilon = 1e-14);
        assert_relative_eq!(f[1][0], 0.0);
        // E = 1/0.4 + 2 = 4.5, (E + p) u = 11
        assert_relative_eq!(f[0][3], 11.0, epsilon = 1e-13);
    }

    #[test]
    fn test_viscous_flux_vanishes_for_uniform_state() {
        let ns = ns2d();
        let u = ns.conserved(1.0, &[0.5, 0.1, 0.0], 1.0);
        let mut f = [[0.0; MAX_FIELDS]; 3];
        ns.add_viscous_flux(&u, &[[0.0; MAX_FIELDS]; 3], &mut f);
        for row in &f {
            for v in row {
                assert_eq!(*v, 0.0);
            }
        }
    }

    #[test]
    fn test_viscous_shear_stress() {
        // u = y with uniform density and energy gradient consistent with constant p
        let ns = ns2d();
        let u = ns.conserved(1.0, &[0.0, 0.0, 0.0], 1.0);
        let mut grad = [[0.0; MAX_FIELDS]; 3];
        grad[1][1] = 1.0; // ∂(ρu)/∂y
        let mut f = [[0.0; MAX_FIELDS]; 3];
        ns.add_viscous_flux(&u, &grad, &mut f);
        // τ_xy = μ
        assert_relative_eq!(f[1][1], -0.01, epsilon = 1e-15);
        assert_relative_eq!(f[0][2], -0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_wave_speed_relative_to_grid() {
        let ns = ns2d();
        let u = ns.conserved(1.4, &[1.0, 0.0, 0.0], 1.0);
        let c = 1.0;
        let n = Point::new_2d(1.0, 0.0);
        assert_relative_eq!(ns.wave_speed(&u, &n, &Point::zero()), 1.0 + c, epsilon = 1e-14);
        let vg = Point::new_2d(1.0, 0.0);
        assert_relative_eq!(ns.wave_speed(&u, &n, &vg), c, epsilon = 1e-14);
    }

    #[test]
    fn test_entropy_variables_of_rest_state() {
        let ns = ns2d();
        let u = ns.conserved(1.0, &[0.0, 0.0, 0.0], 1.0);
        let v = ns.entropy_variables(&u);
        assert_relative_eq!(v[0], 1.4 / 0.4, epsilon = 1e-14);
        assert_relative_eq!(v[3], -1.0);
    }
}
