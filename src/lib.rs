//! # fr-rs
//!
//! A high-order Flux Reconstruction solver for the compressible
//! Euler/Navier-Stokes equations and scalar advection-diffusion.
//!
//! This crate provides:
//! - Polynomial machinery (Legendre, Lagrange, Gauss points, FR correction functions)
//! - Element geometry (shape functions, Jacobians, inverse mapping)
//! - Per-(shape, order) operator matrices shared through a registry
//! - Elements with positivity and entropy squeezing and modal shock capture
//! - Interior, periodic and boundary faces with Rusanov and LDG fluxes
//! - Explicit Runge-Kutta time stepping with CFL control and moving meshes
//! - p-multigrid acceleration
//! - Hex/hex supermesh construction with tetrahedral quadrature
//! - VTU output and restart
//!
//! ```no_run
//! use fr_rs::{Equation, InitialCondition, Mesh, Solver, SolverConfig};
//!
//! let config = SolverConfig::new(Equation::NavierStokes, 2, 3)
//!     .with_initial_condition(InitialCondition::IsentropicVortex);
//! let mesh = Mesh::periodic_quad(-5.0, 5.0, -5.0, 5.0, 8, 8)?;
//! let mut solver = Solver::setup(config, mesh)?;
//! solver.initialize_solution()?;
//! for _ in 0..100 {
//!     solver.update(false)?;
//! }
//! solver.write_plot("vortex.vtu")?;
//! # Ok::<(), fr_rs::FrError>(())
//! ```

pub mod comm;
pub mod config;
pub mod element;
pub mod error;
pub mod face;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod multigrid;
pub mod operators;
pub mod physics;
pub mod polynomial;
pub mod solver;
pub mod supermesh;
pub mod time;

// Configuration and errors
pub use config::{
    Equation, ErrorNorm, InitialCondition, PmgConfig, PointSet, ResidualNorm, SolverConfig,
    TimeStepMode,
};
pub use error::{FrError, PointKind, Result};

// Geometry and mesh
pub use geometry::{ElementShape, Point};
pub use mesh::{BoundaryTag, CellStatus, Mesh, MeshMotion};

// Discretization
pub use element::{Context, Element, PlotData};
pub use face::{BoundaryFace, Face, InteriorFace, WallForce};
pub use operators::{OperatorKey, OperatorLibrary, Operators};
pub use physics::{AdvectionDiffusion, Equations, NavierStokes, Physics};
pub use time::RkScheme;

// Drivers
pub use comm::{Communicator, SerialCommunicator};
pub use multigrid::MultiGrid;
pub use solver::{Solver, RESTART_PLACEHOLDER};
pub use supermesh::{clip_tet, split_hex_into_tets, SuperMesh, Tetra};

// I/O
pub use io::{read_restart_file, write_vtu_file, RestartData, RestartPiece};
