//! Lagrange interpolation on a 1D node set.

/// Value of the `j`-th Lagrange basis polynomial on `nodes` at `x`.
pub fn lagrange(nodes: &[f64], x: f64, j: usize) -> f64 {
    nodes
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != j)
        .fold(1.0, |acc, (_, &xi)| acc * (x - xi) / (nodes[j] - xi))
}

/// Derivative of the `j`-th Lagrange basis polynomial on `nodes` at `x`.
pub fn lagrange_derivative(nodes: &[f64], x: f64, j: usize) -> f64 {
    let n = nodes.len();
    let mut total = 0.0;
    for k in 0..n {
        if k == j {
            continue;
        }
        let mut term = 1.0 / (nodes[j] - nodes[k]);
        for (i, &xi) in nodes.iter().enumerate() {
            if i != j && i != k {
                term *= (x - xi) / (nodes[j] - xi);
            }
        }
        total += term;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_property() {
        let nodes = [-0.9, -0.2, 0.4, 1.0];
        for j in 0..nodes.len() {
            for (i, &x) in nodes.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((lagrange(&nodes, x, j) - expected).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_reproduces_polynomials() {
        let nodes = [-1.0, -0.3, 0.5, 0.8];
        let f = |x: f64| 2.0 * x * x * x - x + 0.25;
        let df = |x: f64| 6.0 * x * x - 1.0;
        for &x in &[-0.77, 0.0, 0.61] {
            let interp: f64 = (0..4).map(|j| f(nodes[j]) * lagrange(&nodes, x, j)).sum();
            let deriv: f64 = (0..4)
                .map(|j| f(nodes[j]) * lagrange_derivative(&nodes, x, j))
                .sum();
            assert!((interp - f(x)).abs() < 1e-13);
            assert!((deriv - df(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_node() {
        assert_eq!(lagrange(&[0.0], 0.7, 0), 1.0);
        assert_eq!(lagrange_derivative(&[0.0], 0.7, 0), 0.0);
    }
}
