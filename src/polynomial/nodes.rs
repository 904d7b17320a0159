//! 1D point families and quadrature weights.
//!
//! Gauss-Legendre points are the roots of P_n and are the default solution
//! points; Gauss-Lobatto points are the roots of (1-x²)P'_N and include the
//! endpoints. Both are found by Newton iteration from Chebyshev guesses.

use std::f64::consts::PI;

use super::legendre::legendre_and_derivative;
use crate::config::PointSet;

/// Gauss-Legendre nodes for `n_points` points, ascending in [-1, 1].
pub fn gauss_legendre_nodes(n_points: usize) -> Vec<f64> {
    let n = n_points;
    let mut nodes = Vec::with_capacity(n);

    for i in 0..n {
        let mut x = -(PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        nodes.push(x);
    }

    nodes
}

/// Gauss-Legendre weights w_i = 2 / ((1 - x_i²) P'_n(x_i)²).
pub fn gauss_legendre_weights(nodes: &[f64]) -> Vec<f64> {
    let n = nodes.len();
    nodes
        .iter()
        .map(|&x| {
            let (_, dp) = legendre_and_derivative(n, x);
            2.0 / ((1.0 - x * x) * dp * dp)
        })
        .collect()
}

/// Gauss-Lobatto nodes for polynomial order `order` (order + 1 points).
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;
    if n == 0 {
        return vec![0.0];
    }

    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    let nn1 = (n * (n + 1)) as f64;
    for x in nodes.iter_mut().take(n).skip(1) {
        for _ in 0..100 {
            // d/dx[(1-x²)P'_N] = -N(N+1) P_N
            let (p, dp) = legendre_and_derivative(n, *x);
            let update = (1.0 - *x * *x) * dp / (nn1 * p);
            *x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
    }

    nodes
}

/// Gauss-Lobatto weights w_j = 2 / (N(N+1) P_N(x_j)²).
pub fn gauss_lobatto_weights(nodes: &[f64]) -> Vec<f64> {
    let n = nodes.len() - 1;
    if n == 0 {
        return vec![2.0];
    }
    let nn1 = (n * (n + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let (p, _) = legendre_and_derivative(n, x);
            2.0 / (nn1 * p * p)
        })
        .collect()
}

/// The `order + 1` 1D points of a point family.
pub fn points_1d(point_set: PointSet, order: usize) -> Vec<f64> {
    match point_set {
        PointSet::Legendre => gauss_legendre_nodes(order + 1),
        PointSet::Lobatto => gauss_lobatto_nodes(order),
    }
}

/// Quadrature weights matching [`points_1d`].
pub fn weights_1d(point_set: PointSet, order: usize) -> Vec<f64> {
    let nodes = points_1d(point_set, order);
    match point_set {
        PointSet::Legendre => gauss_legendre_weights(&nodes),
        PointSet::Lobatto => gauss_lobatto_weights(&nodes),
    }
}
