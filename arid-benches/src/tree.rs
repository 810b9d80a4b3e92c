//! Synthetic weight-sorted spanning trees.
//!
//! Each node after the first attaches to a uniformly chosen earlier node with a
//! weight drawn from `[0, 1)`, and the edges are then sorted by weight. Node
//! identifiers are shuffled so roots are not biased towards low indices.

use arid_core::MstEdge;
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

use crate::error::BenchSetupError;

/// Configuration for [`SyntheticTree::generate`].
#[derive(Clone, Copy, Debug)]
pub struct SyntheticTreeConfig {
    /// Number of nodes in the tree.
    pub node_count: usize,
    /// Seed for the random number generator.
    pub seed: u64,
}

/// A random spanning tree with edges in non-decreasing weight order.
#[derive(Clone, Debug)]
pub struct SyntheticTree {
    node_count: usize,
    edges: Vec<MstEdge>,
}

impl SyntheticTree {
    /// Generates a tree from `config`.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::ZeroValue`] when `node_count` is zero.
    pub fn generate(config: &SyntheticTreeConfig) -> Result<Self, BenchSetupError> {
        if config.node_count == 0 {
            return Err(BenchSetupError::ZeroValue {
                context: "node_count",
            });
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut ids: Vec<usize> = (0..config.node_count).collect();
        ids.shuffle(&mut rng);

        let mut edges: Vec<MstEdge> = ids
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(position, &child)| {
                let parent = ids.get(rng.gen_range(0..position)).copied()?;
                Some(MstEdge::new(parent, child, rng.gen_range(0.0..1.0)))
            })
            .collect();
        edges.sort_by(|left, right| left.weight().total_cmp(&right.weight()));

        Ok(Self {
            node_count: config.node_count,
            edges,
        })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Edges sorted by weight.
    #[must_use]
    pub fn edges(&self) -> &[MstEdge] {
        &self.edges
    }

    /// Encodes the edges as a flat `(u, v, weight)` buffer.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "node indices in benchmark trees stay far below 2^53"
    )]
    pub fn to_flat(&self) -> Vec<f64> {
        self.edges
            .iter()
            .flat_map(|edge| [edge.source() as f64, edge.target() as f64, edge.weight()])
            .collect()
    }
}
