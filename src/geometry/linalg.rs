//! Small dense matrices for per-point Jacobians.
//!
//! Jacobians are at most 4x4 (3D space-time), so they live on the stack
//! with closed-form determinants and adjugates instead of going through an
//! LU factorisation.

use std::ops::{Index, IndexMut};

/// Square matrix of dimension `n <= 4` stored in a fixed 4x4 array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmallMatrix {
    n: usize,
    m: [[f64; 4]; 4],
}

impl Default for SmallMatrix {
    fn default() -> Self {
        Self::zeros(0)
    }
}

impl SmallMatrix {
    /// Zero matrix of dimension `n`.
    pub fn zeros(n: usize) -> Self {
        debug_assert!(n <= 4);
        Self { n, m: [[0.0; 4]; 4] }
    }

    /// Identity of dimension `n`.
    pub fn identity(n: usize) -> Self {
        let mut out = Self::zeros(n);
        for i in 0..n {
            out.m[i][i] = 1.0;
        }
        out
    }

    /// Build from rows.
    pub fn from_rows<const N: usize>(rows: [[f64; N]; N]) -> Self {
        let mut out = Self::zeros(N);
        for (i, row) in rows.iter().enumerate() {
            out.m[i][..N].copy_from_slice(row);
        }
        out
    }

    /// Dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Determinant.
    pub fn determinant(&self) -> f64 {
        let a = &self.m;
        match self.n {
            0 => 1.0,
            1 => a[0][0],
            2 => a[0][0] * a[1][1] - a[1][0] * a[0][1],
            3 => {
                a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
                    - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
                    + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
            }
            _ => (0..self.n)
                .map(|j| {
                    let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a[0][j] * self.minor(0, j).determinant()
                })
                .sum(),
        }
    }

    /// Matrix with row `row` and column `col` removed.
    pub fn minor(&self, row: usize, col: usize) -> Self {
        let mut out = Self::zeros(self.n - 1);
        let mut r = 0;
        for i in 0..self.n {
            if i == row {
                continue;
            }
            let mut c = 0;
            for j in 0..self.n {
                if j == col {
                    continue;
                }
                out.m[r][c] = self.m[i][j];
                c += 1;
            }
            r += 1;
        }
        out
    }

    /// Adjugate: `adj(A) A = A adj(A) = det(A) I`.
    pub fn adjoint(&self) -> Self {
        let a = &self.m;
        let mut out = Self::zeros(self.n);
        match self.n {
            1 => out.m[0][0] = 1.0,
            2 => {
                out.m[0][0] = a[1][1];
                out.m[0][1] = -a[0][1];
                out.m[1][0] = -a[1][0];
                out.m[1][1] = a[0][0];
            }
            3 => {
                let (xr, xs, xt) = (a[0][0], a[0][1], a[0][2]);
                let (yr, ys, yt) = (a[1][0], a[1][1], a[1][2]);
                let (zr, zs, zt) = (a[2][0], a[2][1], a[2][2]);
                out.m[0][0] = ys * zt - yt * zs;
                out.m[0][1] = xt * zs - xs * zt;
                out.m[0][2] = xs * yt - xt * ys;
                out.m[1][0] = yt * zr - yr * zt;
                out.m[1][1] = xr * zt - xt * zr;
                out.m[1][2] = xt * yr - xr * yt;
                out.m[2][0] = yr * zs - ys * zr;
                out.m[2][1] = xs * zr - xr * zs;
                out.m[2][2] = xr * ys - xs * yr;
            }
            _ => {
                for i in 0..self.n {
                    for j in 0..self.n {
                        let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                        out.m[i][j] = sign * self.minor(j, i).determinant();
                    }
                }
            }
        }
        out
    }

    /// Matrix product.
    pub fn matmul(&self, other: &Self) -> Self {
        let mut out = Self::zeros(self.n);
        for i in 0..self.n {
            for j in 0..self.n {
                out.m[i][j] = (0..self.n).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        out
    }

    /// `A x` for the leading `n` entries of `x`.
    pub fn mul_vec(&self, x: &[f64]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for i in 0..self.n {
            out[i] = (0..self.n).map(|k| self.m[i][k] * x[k]).sum();
        }
        out
    }

    /// `A^T x` for the leading `n` entries of `x`.
    pub fn transpose_mul_vec(&self, x: &[f64]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for i in 0..self.n {
            out[i] = (0..self.n).map(|k| self.m[k][i] * x[k]).sum();
        }
        out
    }
}

impl Index<(usize, usize)> for SmallMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.m[i][j]
    }
}

impl IndexMut<(usize, usize)> for SmallMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.m[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_adjugate(a: &SmallMatrix) {
        let det = a.determinant();
        let prod = a.adjoint().matmul(a);
        for i in 0..a.dim() {
            for j in 0..a.dim() {
                let expected = if i == j { det } else { 0.0 };
                assert!((prod[(i, j)] - expected).abs() < 1e-12, "({i},{j})");
            }
        }
    }

    #[test]
    fn test_2x2() {
        let a = SmallMatrix::from_rows([[2.0, 1.0], [0.5, 3.0]]);
        assert!((a.determinant() - 5.5).abs() < 1e-15);
        check_adjugate(&a);
    }

    #[test]
    fn test_3x3() {
        let a = SmallMatrix::from_rows([[1.0, 2.0, 0.5], [0.0, 1.5, -1.0], [2.0, 0.3, 1.0]]);
        check_adjugate(&a);
        let expected = 1.0 * (1.5 - 0.3 * -1.0) - 2.0 * (0.0 + 2.0) + 0.5 * (0.0 - 3.0);
        assert!((a.determinant() - expected).abs() < 1e-14);
    }

    #[test]
    fn test_4x4_space_time_block() {
        // [[J, v], [0, 1]] has det(J) as determinant
        let mut a = SmallMatrix::zeros(4);
        let j = [[0.5, 0.1, 0.0], [0.0, 0.6, 0.2], [0.1, 0.0, 0.4]];
        for r in 0..3 {
            for c in 0..3 {
                a[(r, c)] = j[r][c];
            }
            a[(r, 3)] = 0.3 * (r as f64 + 1.0);
        }
        a[(3, 3)] = 1.0;
        let sub = SmallMatrix::from_rows(j);
        assert!((a.determinant() - sub.determinant()).abs() < 1e-14);
        check_adjugate(&a);
    }
}
