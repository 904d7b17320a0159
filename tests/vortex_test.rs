//! Isentropic vortex advection on a periodic box.

use approx::assert_relative_eq;
use std::f64::consts::PI;
use fr_rs::{
    Equation, InitialCondition, Mesh, MeshMotion, RkScheme, Solver, SolverConfig, TimeStepMode,
};

fn vortex_config(order: usize) -> SolverConfig {
    SolverConfig::new(Equation::NavierStokes, 2, order)
        .with_initial_condition(InitialCondition::IsentropicVortex)
        .with_time_step(TimeStepMode::Fixed, 5e-3, 0.5)
        .with_rk(RkScheme::ClassicRk4)
}

#[test]
fn test_vortex_centre_density() {
    // odd cell count puts an order-2 centre point on the origin
    let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 5, 5).unwrap();
    let mut solver = Solver::setup(vortex_config(2), mesh).unwrap();
    solver.initialize_solution().unwrap();

    let g: f64 = 1.4;
    let eps: f64 = 5.0;
    let expected = (1.0 - eps * eps * (g - 1.0) / (8.0 * g * PI * PI)).powf(1.0 / (g - 1.0) + 1e-5);
    let centre = solver
        .elements
        .iter()
        .flat_map(|e| (0..e.n_spts).map(move |i| (e.pos_spts[i], e.u_spts[(i, 0)])))
        .find(|(p, _)| p.x.abs() < 1e-12 && p.y.abs() < 1e-12)
        .map(|(_, rho)| rho)
        .unwrap();
    assert_relative_eq!(centre, expected, epsilon = 1e-12);

    let rho_min = solver
        .elements
        .iter()
        .flat_map(|e| (0..e.n_spts).map(move |i| e.u_spts[(i, 0)]))
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(rho_min, expected, epsilon = 1e-12);
}

#[test]
fn test_vortex_mass_conserved_and_error_small() {
    let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 8, 8).unwrap();
    let mut solver = Solver::setup(vortex_config(3), mesh).unwrap();
    solver.initialize_solution().unwrap();
    let before = solver.total_conserved();

    for _ in 0..20 {
        solver.update(false).unwrap();
    }
    assert_relative_eq!(solver.time, 0.1, epsilon = 1e-12);

    let after = solver.total_conserved();
    for (a, b) in before.iter().zip(&after) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
    let err = solver.integrate_error();
    assert_eq!(err.len(), 4);
    for e in err {
        assert!(e.is_finite() && e < 0.1, "error {e}");
    }
}

/// The perturbation vanishes on the box edges, so periodic faces stay matched.
#[test]
fn test_free_stream_on_moving_mesh() {
    let config = SolverConfig::new(Equation::NavierStokes, 2, 3)
        .with_free_stream(1.0, [0.5, 0.0, 0.0], 1.0)
        .with_time_step(TimeStepMode::Fixed, 1e-3, 0.5)
        .with_motion(MeshMotion::Perturbation {
            amplitude: 0.1,
            length: 1.0,
            period: 4.0,
        });
    let mesh = Mesh::periodic_quad(-1.0, 1.0, -1.0, 1.0, 4, 4).unwrap();
    let mut solver = Solver::setup(config, mesh).unwrap();
    solver.initialize_solution().unwrap();
    for _ in 0..5 {
        solver.update(false).unwrap();
    }
    for e in &solver.elements {
        for i in 0..e.n_spts {
            assert_relative_eq!(e.u_spts[(i, 0)], 1.0, epsilon = 1e-8);
            assert_relative_eq!(e.u_spts[(i, 1)], 0.5, epsilon = 1e-8);
        }
    }
}
