//! Reductions across mesh partitions.
//!
//! Every explicit step reduces the time step (and diagnostics) over all
//! partitions. The solver only talks to partitions through [`Communicator`];
//! a single-process run uses [`SerialCommunicator`].

/// Collective operations used by the solver.
///
/// Calls are blocking and must be made by every rank in the same order.
pub trait Communicator: Send + Sync {
    /// Index of this partition.
    fn rank(&self) -> usize;

    /// Number of partitions.
    fn size(&self) -> usize;

    /// Minimum of `value` over all ranks.
    fn all_reduce_min(&self, value: f64) -> f64;

    /// Element-wise sum of `values` over all ranks, in place.
    fn all_reduce_sum(&self, values: &mut [f64]);

    /// Whether this rank reports global diagnostics.
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// Single-partition communicator; every reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_min(&self, value: f64) -> f64 {
        value
    }

    fn all_reduce_sum(&self, _values: &mut [f64]) {}
}
