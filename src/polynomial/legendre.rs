//! Legendre polynomials.
//!
//! P_n(x) is orthogonal on [-1, 1] with ∫ P_m P_n dx = 2/(2n+1) δ_mn.
//! Everything here runs the three-term recurrence
//! (n+1) P_{n+1} = (2n+1) x P_n - n P_{n-1}
//! and derives P'_n from the pair (P_n, P_{n-1}).

/// Evaluate `(P_n(x), P'_n(x))` with a single recurrence sweep.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    match n {
        0 => return (1.0, 0.0),
        1 => return (x, 1.0),
        _ => {}
    }

    let mut p_prev = 1.0;
    let mut p = x;
    for k in 1..n {
        let kf = k as f64;
        let next = ((2.0 * kf + 1.0) * x * p - kf * p_prev) / (kf + 1.0);
        p_prev = p;
        p = next;
    }

    let nf = n as f64;
    let dp = if (x.abs() - 1.0).abs() < 1e-14 {
        // P'_n(±1) = (±1)^{n+1} n(n+1)/2
        let end = 0.5 * nf * (nf + 1.0);
        if x > 0.0 || n % 2 == 1 {
            end
        } else {
            -end
        }
    } else {
        nf * (x * p - p_prev) / (x * x - 1.0)
    };

    (p, dp)
}

/// Evaluate P_n(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).0
}

/// Evaluate P'_n(x).
pub fn legendre_derivative(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).1
}

/// L2 norm squared of P_n on [-1, 1].
pub fn legendre_norm_sq(n: usize) -> f64 {
    2.0 / (2 * n + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_forms() {
        for &x in &[-0.8, -0.3, 0.0, 0.45, 0.9] {
            assert!((legendre(2, x) - 0.5 * (3.0 * x * x - 1.0)).abs() < 1e-14);
            assert!((legendre(3, x) - 0.5 * (5.0 * x * x * x - 3.0 * x)).abs() < 1e-14);
            assert!((legendre_derivative(2, x) - 3.0 * x).abs() < 1e-14);
            assert!((legendre_derivative(3, x) - 0.5 * (15.0 * x * x - 3.0)).abs() < 1e-13);
        }
    }

    #[test]
    fn test_endpoint_values() {
        for n in 0..=7 {
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!((legendre(n, 1.0) - 1.0).abs() < 1e-14);
            assert!((legendre(n, -1.0) - sign).abs() < 1e-14);

            let end = (n * (n + 1)) as f64 / 2.0;
            assert!((legendre_derivative(n, 1.0) - end).abs() < 1e-12);
            assert!((legendre_derivative(n, -1.0) + sign * end).abs() < 1e-12);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        for n in 1..=6 {
            for &x in &[-0.7, -0.1, 0.33, 0.8] {
                let fd = (legendre(n, x + h) - legendre(n, x - h)) / (2.0 * h);
                assert!((fd - legendre_derivative(n, x)).abs() < 1e-7);
            }
        }
    }
}
