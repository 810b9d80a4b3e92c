//! Benchmark parameter types.

use std::fmt;

/// Parameters for a threshold-merge benchmark run.
#[derive(Clone, Debug)]
pub struct ComponentsBenchParams {
    /// Number of nodes in the spanning tree.
    pub node_count: usize,
    /// Threshold the tree is cut at. Weights are drawn from `[0, 1)`.
    pub threshold: f64,
}

impl fmt::Display for ComponentsBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},t={}", self.node_count, self.threshold)
    }
}
