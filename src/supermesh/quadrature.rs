//! Quadrature on tetrahedra from collapsed tensor Gauss rules.

use crate::polynomial::{gauss_legendre_nodes, gauss_legendre_weights};

/// Points and weights on the unit reference tet, exact for polynomials of
/// degree `order`. Weights sum to 1/6.
pub fn reference_tet_rule(order: usize) -> (Vec<[f64; 3]>, Vec<f64>) {
    let n = order / 2 + 2;
    let s = gauss_legendre_nodes(n);
    let w = gauss_legendre_weights(&s);
    // [-1, 1] -> [0, 1]
    let x: Vec<f64> = s.iter().map(|v| 0.5 * (v + 1.0)).collect();
    let wx: Vec<f64> = w.iter().map(|v| 0.5 * v).collect();

    let mut pts = Vec::with_capacity(n * n * n);
    let mut wts = Vec::with_capacity(n * n * n);
    for (a, wa) in x.iter().zip(&wx) {
        for (b, wb) in x.iter().zip(&wx) {
            for (c, wc) in x.iter().zip(&wx) {
                let xi1 = a;
                let xi2 = b * (1.0 - a);
                let xi3 = c * (1.0 - a) * (1.0 - b);
                pts.push([*xi1, xi2, xi3]);
                wts.push(wa * wb * wc * (1.0 - a).powi(2) * (1.0 - b));
            }
        }
    }
    (pts, wts)
}
