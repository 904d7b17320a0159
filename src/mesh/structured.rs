//! Structured quad and hex builders.

use super::{BoundaryTag, Cell, Mesh};
use crate::error::{FrError, Result};
use crate::geometry::{ElementShape, Point};

fn check_counts(counts: &[usize], bounds: &[f64]) -> Result<()> {
    if counts.iter().any(|&n| n == 0) {
        return Err(FrError::MeshConnectivity(
            "need at least one element in each direction".into(),
        ));
    }
    if bounds.chunks(2).any(|b| b[1] <= b[0]) {
        return Err(FrError::MeshConnectivity("invalid domain bounds".into()));
    }
    Ok(())
}

/// Tag for the side a boundary face centroid lies on, `sides` ordered
/// `[min, max]` per axis.
fn side_tag(p: &Point, bounds: &[f64], sides: &[BoundaryTag]) -> BoundaryTag {
    let mut best = (f64::INFINITY, BoundaryTag::default());
    for (axis, b) in bounds.chunks(2).enumerate() {
        let extent = b[1] - b[0];
        for (s, &edge) in b.iter().enumerate() {
            let dist = (p[axis] - edge).abs() / extent;
            if dist < best.0 {
                best = (dist, sides[2 * axis + s]);
            }
        }
    }
    best.1
}

impl Mesh {
    /// Uniform quad mesh of `[x0, x1] x [y0, y1]`.
    ///
    /// `tags` are `[south, east, north, west]`; opposite sides both tagged
    /// periodic are joined.
    pub fn structured_quad(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        tags: [BoundaryTag; 4],
    ) -> Result<Self> {
        check_counts(&[nx, ny], &[x0, x1, y0, y1])?;
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        let periodic_x = tags[1].is_periodic() && tags[3].is_periodic();
        let periodic_y = tags[0].is_periodic() && tags[2].is_periodic();

        let vid = |i: usize, j: usize| j * (nx + 1) + i;
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        let mut canonical = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(Point::new_2d(x0 + i as f64 * dx, y0 + j as f64 * dy));
                let ci = if periodic_x && i == nx { 0 } else { i };
                let cj = if periodic_y && j == ny { 0 } else { j };
                canonical.push(vid(ci, cj));
            }
        }

        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = vid(i, j);
                cells.push(Cell {
                    shape: ElementShape::Quad,
                    nodes: vec![v0, v0 + 1, v0 + 1 + (nx + 1), v0 + (nx + 1)],
                });
            }
        }

        // [south, east, north, west] -> [xmin, xmax, ymin, ymax]
        let sides = [tags[3], tags[1], tags[0], tags[2]];
        let bounds = [x0, x1, y0, y1];
        Mesh::from_cells(2, vertices, cells, &canonical, |p| {
            side_tag(p, &bounds, &sides)
        })
    }

    /// Fully periodic quad mesh.
    pub fn periodic_quad(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Result<Self> {
        Self::structured_quad(x0, x1, y0, y1, nx, ny, [BoundaryTag::Periodic(0); 4])
    }

    /// Uniform hex mesh of the box `bounds = [xmin, xmax, ymin, ymax, zmin, zmax]`.
    ///
    /// `tags` are ordered like `bounds`; opposite sides both tagged periodic
    /// are joined.
    pub fn structured_hex(bounds: [f64; 6], n: [usize; 3], tags: [BoundaryTag; 6]) -> Result<Self> {
        check_counts(&n, &bounds)?;
        let [nx, ny, nz] = n;
        let h: Vec<f64> = (0..3)
            .map(|d| (bounds[2 * d + 1] - bounds[2 * d]) / n[d] as f64)
            .collect();
        let periodic: Vec<bool> = (0..3)
            .map(|d| tags[2 * d].is_periodic() && tags[2 * d + 1].is_periodic())
            .collect();

        let vid = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
        let n_verts = (nx + 1) * (ny + 1) * (nz + 1);
        let mut vertices = Vec::with_capacity(n_verts);
        let mut canonical = Vec::with_capacity(n_verts);
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    vertices.push(Point::new(
                        bounds[0] + i as f64 * h[0],
                        bounds[2] + j as f64 * h[1],
                        bounds[4] + k as f64 * h[2],
                    ));
                    let wrap = |idx: usize, max: usize, d: usize| {
                        if periodic[d] && idx == max {
                            0
                        } else {
                            idx
                        }
                    };
                    canonical.push(vid(wrap(i, nx, 0), wrap(j, ny, 1), wrap(k, nz, 2)));
                }
            }
        }

        let mut cells = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    cells.push(Cell {
                        shape: ElementShape::Hex,
                        nodes: vec![
                            vid(i, j, k),
                            vid(i + 1, j, k),
                            vid(i + 1, j + 1, k),
                            vid(i, j + 1, k),
                            vid(i, j, k + 1),
                            vid(i + 1, j, k + 1),
                            vid(i + 1, j + 1, k + 1),
                            vid(i, j + 1, k + 1),
                        ],
                    });
                }
            }
        }

        Mesh::from_cells(3, vertices, cells, &canonical, |p| side_tag(p, &bounds, &tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_counts() {
        let mesh = Mesh::structured_quad(0.0, 2.0, 0.0, 1.0, 4, 2, [BoundaryTag::SlipWall; 4]).unwrap();
        assert_eq!(mesh.n_cells(), 8);
        let n_boundary = mesh.faces.iter().filter(|f| f.is_boundary()).count();
        assert_eq!(n_boundary, 12);
        assert_eq!(mesh.faces.len(), 4 * 3 + 5 * 2);
    }

    #[test]
    fn test_side_tags() {
        let tags = [
            BoundaryTag::SlipWall,
            BoundaryTag::Extrapolate,
            BoundaryTag::SlipWall,
            BoundaryTag::Farfield,
        ];
        let mesh = Mesh::structured_quad(0.0, 1.0, 0.0, 1.0, 2, 2, tags).unwrap();
        for face in mesh.faces.iter().filter(|f| f.is_boundary()) {
            let c = mesh.face_centroid(face.left);
            let expected = if c.x == 0.0 {
                BoundaryTag::Farfield
            } else if c.x == 1.0 {
                BoundaryTag::Extrapolate
            } else {
                BoundaryTag::SlipWall
            };
            assert_eq!(face.boundary_tag, Some(expected));
        }
    }

    #[test]
    fn test_periodic_quad_has_no_boundary() {
        let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 3, 3).unwrap();
        assert!(mesh.faces.iter().all(|f| f.is_interior()));
        assert_eq!(mesh.faces.len(), 18);
    }

    #[test]
    fn test_hex_channel() {
        let tags = [
            BoundaryTag::Periodic(0),
            BoundaryTag::Periodic(0),
            BoundaryTag::SlipWall,
            BoundaryTag::SlipWall,
            BoundaryTag::Farfield,
            BoundaryTag::Farfield,
        ];
        let mesh = Mesh::structured_hex([0.0, 1.0, 0.0, 1.0, 0.0, 1.0], [2, 2, 1], tags).unwrap();
        assert_eq!(mesh.n_cells(), 4);
        let n_boundary = mesh.faces.iter().filter(|f| f.is_boundary()).count();
        // y sides: 2 x 2, z sides: 4 x 2
        assert_eq!(n_boundary, 4 + 8);
    }

    /// Partners sit on opposite sides of their cells and line up in every
    /// direction except the face normal.
    fn assert_pairs_are_opposite(mesh: &Mesh) {
        for face in mesh.faces.iter().filter(|f| f.is_interior()) {
            let (l, r) = (face.left, face.right.unwrap());
            let (axis_l, axis_r) = match mesh.n_dims {
                2 => (l.face % 2, r.face % 2),
                _ => (l.face / 2, r.face / 2),
            };
            assert_eq!(axis_l, axis_r, "{l:?} paired with {r:?}");
            assert_ne!(l.face, r.face, "{l:?} paired with {r:?}");
            let cl = mesh.face_centroid(l);
            let cr = mesh.face_centroid(r);
            // quads: faces 0/2 have y normals; hexes: z, x, y
            let normal_axis = match mesh.n_dims {
                2 => 1 - axis_l,
                _ => [2, 0, 1][axis_l],
            };
            for d in (0..mesh.n_dims).filter(|&d| d != normal_axis) {
                assert!((cl[d] - cr[d]).abs() < 1e-12, "{l:?} paired with {r:?}");
            }
        }
    }

    #[test]
    fn test_two_cell_periodic_quad_pairs_opposite_faces() {
        let mesh = Mesh::periodic_quad(0.0, 2.0, 0.0, 2.0, 2, 2).unwrap();
        assert_eq!(mesh.faces.len(), 8);
        assert!(mesh.faces.iter().all(|f| f.is_interior()));
        assert_pairs_are_opposite(&mesh);
    }

    #[test]
    fn test_single_cell_periodic_direction() {
        let tags = [
            BoundaryTag::SlipWall,
            BoundaryTag::Periodic(0),
            BoundaryTag::SlipWall,
            BoundaryTag::Periodic(0),
        ];
        let mesh = Mesh::structured_quad(0.0, 1.0, 0.0, 1.0, 1, 3, tags).unwrap();
        let n_boundary = mesh.faces.iter().filter(|f| f.is_boundary()).count();
        assert_eq!(n_boundary, 2);
        assert_pairs_are_opposite(&mesh);
    }

    #[test]
    fn test_two_cell_periodic_hex_pairs_opposite_faces() {
        let mesh = Mesh::structured_hex(
            [0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            [2, 2, 2],
            [BoundaryTag::Periodic(0); 6],
        )
        .unwrap();
        assert_eq!(mesh.faces.len(), 24);
        assert!(mesh.faces.iter().all(|f| f.is_interior()));
        assert_pairs_are_opposite(&mesh);

        let tags = [
            BoundaryTag::Periodic(0),
            BoundaryTag::Periodic(0),
            BoundaryTag::SlipWall,
            BoundaryTag::SlipWall,
            BoundaryTag::Farfield,
            BoundaryTag::Farfield,
        ];
        let channel = Mesh::structured_hex([0.0, 1.0, 0.0, 1.0, 0.0, 1.0], [2, 2, 1], tags).unwrap();
        assert_pairs_are_opposite(&channel);
    }

    #[test]
    fn test_zero_cells_rejected() {
        assert!(Mesh::structured_quad(0.0, 1.0, 0.0, 1.0, 0, 1, [BoundaryTag::SlipWall; 4]).is_err());
    }
}
