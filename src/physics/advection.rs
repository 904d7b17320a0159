//! Linear advection-diffusion.
//!
//! ∂u/∂t + ∇ · (a u - D ∇u) = 0
//!
//! with constant advection velocity `a` and diffusivity `D`.

use super::{Physics, Tensor};
use crate::geometry::Point;

/// Scalar advection-diffusion equation.
#[derive(Clone, Debug)]
pub struct AdvectionDiffusion {
    /// Spatial dimension
    pub n_dims: usize,
    /// Advection velocity
    pub velocity: [f64; 3],
    /// Diffusion coefficient
    pub diffusivity: f64,
}

impl AdvectionDiffusion {
    /// Create the equation.
    pub fn new(n_dims: usize, velocity: [f64; 3], diffusivity: f64) -> Self {
        Self {
            n_dims,
            velocity,
            diffusivity,
        }
    }
}

impl Physics for AdvectionDiffusion {
    fn name(&self) -> &'static str {
        "advection-diffusion"
    }

    fn n_fields(&self) -> usize {
        1
    }

    fn n_dims(&self) -> usize {
        self.n_dims
    }

    #[inline]
    fn inviscid_flux(&self, u: &[f64], flux: &mut Tensor) {
        for d in 0..self.n_dims {
            flux[d][0] = self.velocity[d] * u[0];
        }
    }

    #[inline]
    fn add_viscous_flux(&self, _u: &[f64], grad: &Tensor, flux: &mut Tensor) {
        for d in 0..self.n_dims {
            flux[d][0] -= self.diffusivity * grad[d][0];
        }
    }

    #[inline]
    fn wave_speed(&self, _u: &[f64], normal: &Point, grid_vel: &Point) -> f64 {
        (0..self.n_dims)
            .map(|d| (self.velocity[d] - grid_vel[d]) * normal[d])
            .sum::<f64>()
            .abs()
    }

    /// Magnitude of the advection velocity relative to the grid.
    #[inline]
    fn cfl_wave_speed(&self, _u: &[f64], _normal: &Point, grid_vel: &Point) -> f64 {
        (0..self.n_dims)
            .map(|d| (self.velocity[d] - grid_vel[d]).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MAX_FIELDS;
    use approx::assert_relative_eq;

    #[test]
    fn test_flux_and_diffusion() {
        let ad = AdvectionDiffusion::new(2, [1.0, 2.0, 0.0], 0.1);
        let mut f = [[0.0; MAX_FIELDS]; 3];
        ad.inviscid_flux(&[3.0], &mut f);
        assert_relative_eq!(f[0][0], 3.0);
        assert_relative_eq!(f[1][0], 6.0);

        let mut grad = [[0.0; MAX_FIELDS]; 3];
        grad[0][0] = 10.0;
        ad.add_viscous_flux(&[3.0], &grad, &mut f);
        assert_relative_eq!(f[0][0], 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_wave_speed() {
        let ad = AdvectionDiffusion::new(2, [1.0, -2.0, 0.0], 0.0);
        let n = Point::new_2d(0.0, 1.0);
        assert_relative_eq!(ad.wave_speed(&[0.0], &n, &Point::zero()), 2.0);
        assert_relative_eq!(ad.wave_speed(&[0.0], &n, &Point::new_2d(0.0, -2.0)), 0.0);
    }

    #[test]
    fn test_cfl_wave_speed_ignores_normal() {
        let ad = AdvectionDiffusion::new(2, [1.0, 1.0, 0.0], 0.0);
        let n = Point::new_2d(1.0, 0.0);
        assert_relative_eq!(ad.cfl_wave_speed(&[0.0], &n, &Point::zero()), 2f64.sqrt());
        let vg = Point::new_2d(1.0, 0.0);
        assert_relative_eq!(ad.cfl_wave_speed(&[0.0], &n, &vg), 1.0);
    }
}
