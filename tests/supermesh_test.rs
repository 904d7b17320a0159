//! Supermesh construction against randomly shifted donor grids.

use approx::assert_relative_eq;
use fr_rs::{Point, SuperMesh};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cube(x0: f64, y0: f64, z0: f64, h: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0, z0),
        Point::new(x0 + h, y0, z0),
        Point::new(x0 + h, y0 + h, z0),
        Point::new(x0, y0 + h, z0),
        Point::new(x0, y0, z0 + h),
        Point::new(x0 + h, y0, z0 + h),
        Point::new(x0 + h, y0 + h, z0 + h),
        Point::new(x0, y0 + h, z0 + h),
    ]
}

/// 2x2x2 unit donors shifted by `s`, covering the unit target.
fn shifted_donors(s: [f64; 3]) -> Vec<Vec<Point>> {
    let mut donors = Vec::new();
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..2 {
                donors.push(cube(i as f64 - s[0], j as f64 - s[1], k as f64 - s[2], 1.0));
            }
        }
    }
    donors
}

#[test]
fn test_covering_donors_reproduce_target_volume() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..10 {
        let s = [
            rng.gen_range(0.05..0.95),
            rng.gen_range(0.05..0.95),
            rng.gen_range(0.05..0.95),
        ];
        let mut sm = SuperMesh::new(cube(0.0, 0.0, 0.0, 1.0), shifted_donors(s), 4).unwrap();
        sm.build();
        assert_relative_eq!(sm.volume(), 1.0, epsilon = 1e-10);
        assert!(sm.tets().iter().all(|t| t.signed_volume() > 0.0));
    }
}

#[test]
fn test_integrates_polynomials_exactly() {
    let mut sm = SuperMesh::new(cube(0.0, 0.0, 0.0, 1.0), shifted_donors([0.3, 0.6, 0.45]), 4)
        .unwrap();
    sm.build();
    assert_relative_eq!(sm.integrate_fn(|p| p.x), 0.5, epsilon = 1e-10);
    assert_relative_eq!(sm.integrate_fn(|p| p.x * p.y * p.z), 0.125, epsilon = 1e-10);
    assert_relative_eq!(sm.integrate_fn(|p| p.z * p.z), 1.0 / 3.0, epsilon = 1e-10);
}

#[test]
fn test_donor_volumes_partition_the_overlap() {
    let s = [0.25, 0.5, 0.75];
    let target = cube(0.0, 0.0, 0.0, 1.0);
    let mut total = 0.0;
    for donor in shifted_donors(s) {
        let mut sm = SuperMesh::new(target.clone(), vec![donor], 2).unwrap();
        sm.build();
        total += sm.volume();
    }
    assert_relative_eq!(total, 1.0, epsilon = 1e-10);
}

#[test]
fn test_integrate_data_at_quadrature_points() {
    let mut sm = SuperMesh::new(cube(0.0, 0.0, 0.0, 2.0), vec![cube(1.0, 1.0, 1.0, 2.0)], 3)
        .unwrap();
    sm.build();
    let data: Vec<f64> = sm.quadrature_points().iter().map(|_| 2.0).collect();
    assert_relative_eq!(sm.integrate(&data).unwrap(), 2.0, epsilon = 1e-10);
    assert!(sm.integrate(&data[1..]).is_err());
}
