//! Reference-to-physical transforms.
//!
//! For a mapping x(ξ) = Σ_i N_i(ξ) x_i the Jacobian is
//! `J(d1, d2) = ∂x_d1/∂ξ_d2 = Σ_i ∂N_i/∂ξ_d2 x_i[d1]`. Fluxes and normals are
//! carried through the adjugate `adj(J) = det(J) J^{-1}`, which stays finite
//! on collapsed elements.
//!
//! Under mesh motion the transform is embedded in space-time,
//!
//! ```text
//!     | J   v_g |
//! S = |         |     v_g = Σ_i N_i(ξ) v_i   (grid velocity)
//!     | 0    1  |
//! ```
//!
//! whose adjugate supplies the grid-velocity terms of the moving-frame flux.

use super::{ElementShape, Point, SmallMatrix};

/// Faces whose area scale falls below this are treated as collapsed.
pub const DEGENERATE_FACE_TOL: f64 = 1e-10;

/// Jacobian, its adjugate and determinant at one point.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointTransform {
    /// `J(d1, d2) = ∂x_d1/∂ξ_d2`
    pub jac: SmallMatrix,
    /// `det(J) J^{-1}`
    pub adj: SmallMatrix,
    /// `det(J)`
    pub det: f64,
}

impl PointTransform {
    /// Compute adjugate and determinant of `jac`.
    pub fn from_jacobian(jac: SmallMatrix) -> Self {
        Self {
            jac,
            adj: jac.adjoint(),
            det: jac.determinant(),
        }
    }
}

/// Assemble the spatial Jacobian from parametric shape derivatives.
pub fn jacobian(nodes: &[Point], dshape: &[[f64; 3]], n_dims: usize) -> SmallMatrix {
    let mut jac = SmallMatrix::zeros(n_dims);
    for (node, dn) in nodes.iter().zip(dshape) {
        for d1 in 0..n_dims {
            for d2 in 0..n_dims {
                jac[(d1, d2)] += dn[d2] * node[d1];
            }
        }
    }
    jac
}

/// Embed a spatial Jacobian and the local grid velocity in the
/// `(n_dims+1)²` space-time Jacobian.
pub fn space_time_jacobian(jac: &SmallMatrix, grid_vel: &Point) -> SmallMatrix {
    let n = jac.dim();
    let mut st = SmallMatrix::zeros(n + 1);
    for d1 in 0..n {
        for d2 in 0..n {
            st[(d1, d2)] = jac[(d1, d2)];
        }
        st[(d1, n)] = grid_vel[d1];
    }
    st[(n, n)] = 1.0;
    st
}

/// Map a reference normal to physical space.
///
/// Returns the unit outward normal and the face-area scale `dA = |adj^T n̂|`.
/// Collapsed faces (`dA < 1e-10`) return a zero normal and `dA = 0`.
pub fn transformed_normal(adj: &SmallMatrix, ref_normal: &Point, n_dims: usize) -> (Point, f64) {
    let mut norm = Point::zero();
    for d1 in 0..n_dims {
        for d2 in 0..n_dims {
            norm[d1] += adj[(d2, d1)] * ref_normal[d2];
        }
    }
    let da = norm.norm();
    if da.abs() < DEGENERATE_FACE_TOL {
        (Point::zero(), 0.0)
    } else {
        (norm * (1.0 / da), da)
    }
}

/// Shape-function evaluation and geometric queries on one element's nodes.
#[derive(Clone, Copy, Debug)]
pub struct ElementGeometry<'a> {
    pub shape: ElementShape,
    pub nodes: &'a [Point],
}

impl<'a> ElementGeometry<'a> {
    /// Wrap a node list.
    pub fn new(shape: ElementShape, nodes: &'a [Point]) -> Self {
        Self { shape, nodes }
    }

    /// Spatial dimension.
    pub fn n_dims(&self) -> usize {
        self.shape.n_dims()
    }

    /// Physical position of reference location `loc`.
    pub fn calc_pos(&self, loc: &Point) -> Point {
        let mut n = Vec::with_capacity(self.nodes.len());
        self.shape.shape(self.nodes.len(), loc, &mut n);
        self.nodes
            .iter()
            .zip(&n)
            .fold(Point::zero(), |acc, (x, w)| acc + *x * *w)
    }

    /// Jacobian transform at reference location `loc`.
    pub fn transform_at(&self, loc: &Point) -> PointTransform {
        let mut dn = Vec::with_capacity(self.nodes.len());
        self.shape.dshape(self.nodes.len(), loc, &mut dn);
        PointTransform::from_jacobian(jacobian(self.nodes, &dn, self.n_dims()))
    }

    /// Axis-aligned bounding box `(min, max)` of the nodes.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut lo = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.nodes {
            for d in 0..3 {
                lo[d] = lo[d].min(p[d]);
                hi[d] = hi[d].max(p[d]);
            }
        }
        (lo, hi)
    }

    /// Smallest bounding-box extent over the active dimensions.
    pub fn min_extent(&self) -> f64 {
        let (lo, hi) = self.bounding_box();
        (0..self.n_dims())
            .map(|d| hi[d] - lo[d])
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed_quad() -> Vec<Point> {
        vec![
            Point::new_2d(0.0, 0.0),
            Point::new_2d(2.0, 0.2),
            Point::new_2d(2.3, 1.7),
            Point::new_2d(-0.1, 1.5),
        ]
    }

    #[test]
    fn test_unit_square_jacobian() {
        // [0,1]^2 maps with J = I/2
        let nodes = vec![
            Point::new_2d(0.0, 0.0),
            Point::new_2d(1.0, 0.0),
            Point::new_2d(1.0, 1.0),
            Point::new_2d(0.0, 1.0),
        ];
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let t = geo.transform_at(&Point::new_2d(0.3, -0.4));
        assert!((t.jac[(0, 0)] - 0.5).abs() < 1e-14);
        assert!(t.jac[(0, 1)].abs() < 1e-14);
        assert!((t.det - 0.25).abs() < 1e-14);
        assert!((t.adj[(1, 1)] - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_calc_pos_reproduces_nodes() {
        let nodes = skewed_quad();
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let p = geo.calc_pos(&Point::new_2d(1.0, 1.0));
        assert!((p - nodes[2]).norm() < 1e-14);
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let nodes = skewed_quad();
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let loc = Point::new_2d(0.2, -0.35);
        let t = geo.transform_at(&loc);
        let h = 1e-6;
        for d2 in 0..2 {
            let mut lp = loc;
            let mut lm = loc;
            lp[d2] += h;
            lm[d2] -= h;
            let dx = (geo.calc_pos(&lp) - geo.calc_pos(&lm)) * (0.5 / h);
            for d1 in 0..2 {
                assert!((dx[d1] - t.jac[(d1, d2)]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_normals_of_unit_square() {
        let nodes = vec![
            Point::new_2d(0.0, 0.0),
            Point::new_2d(1.0, 0.0),
            Point::new_2d(1.0, 1.0),
            Point::new_2d(0.0, 1.0),
        ];
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let t = geo.transform_at(&Point::new_2d(1.0, 0.0));
        let (n, da) = transformed_normal(&t.adj, &ElementShape::Quad.ref_normal(1), 2);
        assert!((n.x - 1.0).abs() < 1e-14 && n.y.abs() < 1e-14);
        assert!((da - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_collapsed_face_is_zeroed() {
        // Top edge collapsed to a point
        let nodes = vec![
            Point::new_2d(0.0, 0.0),
            Point::new_2d(1.0, 0.0),
            Point::new_2d(0.5, 1.0),
            Point::new_2d(0.5, 1.0),
        ];
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let t = geo.transform_at(&Point::new_2d(0.2, 1.0));
        let (n, da) = transformed_normal(&t.adj, &ElementShape::Quad.ref_normal(2), 2);
        assert_eq!(da, 0.0);
        assert_eq!(n, Point::zero());
    }

    #[test]
    fn test_space_time_jacobian_determinant() {
        let nodes = skewed_quad();
        let geo = ElementGeometry::new(ElementShape::Quad, &nodes);
        let t = geo.transform_at(&Point::new_2d(0.1, 0.1));
        let st = space_time_jacobian(&t.jac, &Point::new_2d(0.7, -0.4));
        assert_eq!(st.dim(), 3);
        assert!((st.determinant() - t.det).abs() < 1e-13);
    }
}
