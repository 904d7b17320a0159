//! Prescribed mesh motion.
//!
//! Vertex positions are a closed-form function of the initial positions and
//! time, so grid velocities are exact derivatives rather than finite
//! differences.

use std::f64::consts::PI;

use crate::geometry::Point;

/// Mesh motion law.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MeshMotion {
    /// Fixed mesh
    #[default]
    Static,
    /// Deforming mesh: every coordinate is displaced by
    /// `A sin(π x0/L) sin(π y0/L) [sin(π z0/L)] sin(2π t/T)`.
    Perturbation {
        amplitude: f64,
        length: f64,
        period: f64,
    },
    /// Rigid translation `x = x0 + v t`.
    RigidTranslation { velocity: [f64; 3] },
}

impl MeshMotion {
    /// Position and velocity at time `t` of the vertex that started at `x0`.
    pub fn evaluate(&self, x0: &Point, n_dims: usize, t: f64) -> (Point, Point) {
        match *self {
            MeshMotion::Static => (*x0, Point::zero()),
            MeshMotion::Perturbation {
                amplitude,
                length,
                period,
            } => {
                let mut shape = amplitude;
                for d in 0..n_dims {
                    shape *= (PI * x0[d] / length).sin();
                }
                let omega = 2.0 * PI / period;
                let disp = shape * (omega * t).sin();
                let speed = shape * omega * (omega * t).cos();
                let mut pos = *x0;
                let mut vel = Point::zero();
                for d in 0..n_dims {
                    pos[d] += disp;
                    vel[d] = speed;
                }
                (pos, vel)
            }
            MeshMotion::RigidTranslation { velocity } => {
                let mut pos = *x0;
                let mut vel = Point::zero();
                for d in 0..n_dims {
                    pos[d] += velocity[d] * t;
                    vel[d] = velocity[d];
                }
                (pos, vel)
            }
        }
    }

    /// Whether the law moves vertices at all.
    pub fn is_moving(&self) -> bool {
        !matches!(self, MeshMotion::Static)
    }
}
