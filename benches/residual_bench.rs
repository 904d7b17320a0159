//! Benchmarks for the residual pipeline and a full time step.
//!
//! Run with: `cargo bench --bench residual_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fr_rs::{Equation, InitialCondition, Mesh, Solver, SolverConfig};

/// Isentropic vortex on an `n x n` periodic box.
fn setup_vortex(n: usize, order: usize, viscous: bool) -> Solver {
    let config = SolverConfig::new(Equation::NavierStokes, 2, order)
        .with_initial_condition(InitialCondition::IsentropicVortex)
        .with_viscous(viscous);
    let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, n, n).expect("mesh");
    let mut solver = Solver::setup(config, mesh).expect("setup");
    solver.initialize_solution().expect("initial condition");
    solver
}

/// Residual cost at different mesh sizes.
fn bench_residual_mesh_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("residual_mesh_size");
    group.sample_size(30);

    for n in [4, 8, 16, 32] {
        let mut solver = setup_vortex(n, 3, false);
        group.bench_with_input(BenchmarkId::new("euler_p3", n * n), &n, |b, _| {
            b.iter(|| solver.calc_residual(black_box(0)).expect("residual"));
        });
    }

    group.finish();
}

/// Residual cost at different polynomial orders, inviscid and viscous.
fn bench_residual_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("residual_order");
    group.sample_size(30);

    for order in [1, 2, 3, 4, 5] {
        for viscous in [false, true] {
            let mut solver = setup_vortex(10, order, viscous);
            let name = if viscous { "navier_stokes" } else { "euler" };
            group.bench_with_input(BenchmarkId::new(name, order), &order, |b, _| {
                b.iter(|| solver.calc_residual(black_box(0)).expect("residual"));
            });
        }
    }

    group.finish();
}

/// One RK4 step.
fn bench_update(c: &mut Criterion) {
    let mut solver = setup_vortex(16, 3, false);
    c.bench_function("update_rk4_16x16_p3", |b| {
        b.iter(|| solver.update(black_box(false)).expect("update"));
    });
}

criterion_group!(
    benches,
    bench_residual_mesh_size,
    bench_residual_order,
    bench_update
);
criterion_main!(benches);
