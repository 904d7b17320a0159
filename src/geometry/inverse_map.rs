//! Physical-to-reference inverse mapping.
//!
//! Newton iteration is tried first; it rejects points outside the element's
//! bounding box, clamps every iterate to the reference domain and gives up
//! after [`NEWTON_MAX_ITERS`] iterations. Nelder-Mead minimisation of the
//! position mismatch (plus a steep penalty outside the reference domain) is
//! the slower fallback for degenerate or strongly curved elements.

use super::{ElementGeometry, Point};

/// Newton iteration budget.
pub const NEWTON_MAX_ITERS: usize = 20;
/// Nelder-Mead iteration budget.
pub const NELDER_MEAD_MAX_ITERS: usize = 300;

const BBOX_EPS: f64 = 1e-10;
const SIMPLEX_SCALE: f64 = 0.75;

impl ElementGeometry<'_> {
    /// Whether `pos` lies inside the node bounding box (with a small slack).
    pub fn in_bounding_box(&self, pos: &Point) -> bool {
        let (lo, hi) = self.bounding_box();
        (0..self.n_dims()).all(|d| pos[d] >= lo[d] - BBOX_EPS && pos[d] <= hi[d] + BBOX_EPS)
    }

    /// Newton inverse map. Returns `None` outside the bounding box or when
    /// the iteration budget is exhausted.
    pub fn ref_loc_newton(&self, pos: &Point) -> Option<Point> {
        if !self.in_bounding_box(pos) {
            return None;
        }

        let n_dims = self.n_dims();
        let tol = 1e-12 * self.min_extent();
        let mut loc = Point::zero();
        if !self.shape.has_fr_operators() {
            // Simplex centroid
            loc = Point::new(0.25, 0.25, 0.25);
            if n_dims == 2 {
                loc = Point::new_2d(1.0 / 3.0, 1.0 / 3.0);
            }
        }

        for _ in 0..NEWTON_MAX_ITERS {
            let t = self.transform_at(&loc);
            let dx = *pos - self.calc_pos(&loc);
            let dx_arr = dx.to_array();
            let delta = t.adj.mul_vec(&dx_arr[..n_dims]);

            let mut norm = 0.0;
            for d in 0..n_dims {
                loc[d] += delta[d] / t.det;
                norm += dx[d] * dx[d];
            }
            self.shape.clamp_ref(&mut loc);

            if norm.sqrt() <= tol {
                return Some(loc);
            }
        }

        None
    }

    /// Position-mismatch objective with an exp((|ξ|-1)^4) penalty outside
    /// the reference domain.
    fn nelder_mead_objective(&self, loc: &Point, pos: &Point) -> f64 {
        let mut f = (self.calc_pos(loc) - *pos).norm();
        for d in 0..self.n_dims() {
            let a = loc[d].abs();
            if a > 1.0 {
                f += ((a - 1.0).powi(2)).powi(2).exp() - 1.0;
            }
        }
        f
    }

    /// Nelder-Mead inverse map. Succeeds when the minimiser lies inside the
    /// reference domain (to 1e-6).
    pub fn ref_loc_nelder_mead(&self, pos: &Point) -> Option<Point> {
        let n_dims = self.n_dims();
        let n_pts = n_dims + 1;
        let tol = 1e-10 * self.min_extent();
        let l = SIMPLEX_SCALE;

        let seeds: Vec<Point> = if n_dims == 3 {
            vec![
                Point::new(-0.5 * l, -0.43301 * l, -0.375 * l),
                Point::new(0.5 * l, -0.43301 * l, -0.375 * l),
                Point::new(0.0, 0.43301 * l, -0.375 * l),
                Point::new(0.0, 0.0, 0.375 * l),
            ]
        } else {
            vec![
                Point::new_2d(-0.5 * l, -0.43301 * l),
                Point::new_2d(0.5 * l, -0.43301 * l),
                Point::new_2d(0.0, 0.43301 * l),
            ]
        };

        let mut simplex: Vec<(f64, Point)> = seeds
            .into_iter()
            .map(|p| (self.nelder_mead_objective(&p, pos), p))
            .collect();

        for _ in 0..NELDER_MEAD_MAX_ITERS {
            simplex.sort_by(|a, b| a.0.total_cmp(&b.0));
            if simplex[0].0 < tol {
                break;
            }

            let worst = simplex[n_pts - 1];
            let centroid = simplex[..n_pts - 1]
                .iter()
                .fold(Point::zero(), |acc, (_, p)| acc + *p)
                * (1.0 / (n_pts - 1) as f64);

            let reflected = centroid + (centroid - worst.1);
            let f_r = self.nelder_mead_objective(&reflected, pos);

            if f_r < simplex[0].0 {
                let expanded = centroid + (reflected - centroid) * 2.0;
                let f_e = self.nelder_mead_objective(&expanded, pos);
                simplex[n_pts - 1] = if f_e < f_r {
                    (f_e, expanded)
                } else {
                    (f_r, reflected)
                };
            } else if f_r < simplex[n_pts - 2].0 {
                simplex[n_pts - 1] = (f_r, reflected);
            } else {
                let contracted = if f_r < worst.0 {
                    centroid + (reflected - centroid) * 0.5
                } else {
                    centroid + (worst.1 - centroid) * 0.5
                };
                let f_c = self.nelder_mead_objective(&contracted, pos);
                if f_c < worst.0.min(f_r) {
                    simplex[n_pts - 1] = (f_c, contracted);
                } else {
                    let best = simplex[0].1;
                    for entry in simplex.iter_mut().skip(1) {
                        let p = best + (entry.1 - best) * 0.5;
                        *entry = (self.nelder_mead_objective(&p, pos), p);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.0.total_cmp(&b.0));
        let loc = simplex[0].1;
        let inside = (0..n_dims).all(|d| loc[d].abs() - 1e-6 <= 1.0);
        (inside && !loc.is_nan()).then_some(loc)
    }

    /// Newton first, Nelder-Mead when Newton fails inside the bounding box.
    pub fn ref_loc(&self, pos: &Point) -> Option<Point> {
        if !self.in_bounding_box(pos) {
            return None;
        }
        self.ref_loc_newton(pos)
            .or_else(|| self.ref_loc_nelder_mead(pos))
    }
}
