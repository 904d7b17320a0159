//! Error types for the solver.
//!
//! Geometry, setup and restart failures are fatal for a run and surface as
//! [`FrError`] values. Local numerical events (squeezing, Newton
//! non-convergence) are recovered in place and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::ElementShape;

/// Where a Jacobian was evaluated when it turned out to be invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// Interior solution point
    Solution,
    /// Flux point on the element boundary
    Flux,
    /// Arbitrary reference location (inverse mapping, quadrature)
    Other,
}

impl std::fmt::Display for PointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointKind::Solution => write!(f, "solution"),
            PointKind::Flux => write!(f, "flux"),
            PointKind::Other => write!(f, "reference"),
        }
    }
}

/// Errors raised by setup, geometry, I/O and configuration.
#[derive(Debug, Error)]
pub enum FrError {
    /// The element mapping is inverted at a point.
    #[error("negative Jacobian at {point_kind} point {point} of element {element} (det = {det:e})")]
    NegativeJacobian {
        element: usize,
        point_kind: PointKind,
        point: usize,
        det: f64,
    },

    /// Shape has no solver implementation (or wrong node count).
    #[error("unsupported element: {shape:?} with {n_nodes} nodes ({reason})")]
    UnsupportedElement {
        shape: ElementShape,
        n_nodes: usize,
        reason: &'static str,
    },

    /// Polynomial order outside the supported range.
    #[error("unsupported polynomial order {order}: {reason}")]
    UnsupportedOrder { order: usize, reason: &'static str },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Squeezing cannot blend toward a non-admissible element average.
    #[error("element {element} has non-positive average {quantity} ({value:e}); cannot squeeze")]
    NonPositiveAverage {
        element: usize,
        quantity: &'static str,
        value: f64,
    },

    /// Face matching or cell connectivity failed.
    #[error("mesh connectivity error: {0}")]
    MeshConnectivity(String),

    /// Restart file could not be opened.
    #[error("cannot open restart file {path}: {source}")]
    RestartFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required tag or array is absent from the restart file.
    #[error("restart file is missing required tag {0}")]
    RestartMissingTag(&'static str),

    /// A restart piece could not be parsed.
    #[error("malformed restart data for element {element}: {reason}")]
    RestartMalformed { element: usize, reason: String },

    /// Data passed to a quadrature rule does not match its nodes.
    #[error("quadrature data has {got} values but the rule has {expected} points")]
    QuadratureMismatch { expected: usize, got: usize },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FrError>;
