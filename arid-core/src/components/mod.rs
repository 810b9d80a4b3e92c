//! Connected components of an MST cut at a distance threshold.
//!
//! Removing every MST edge heavier than the threshold leaves a forest whose
//! trees are the clusters. Because the edges arrive in non-decreasing weight
//! order, the merge scans them once with a disjoint set and stops at the first
//! edge above the threshold: no later edge can be lighter.
//!
//! The threshold is inclusive. An edge whose weight equals the threshold joins
//! its endpoints.
//!
//! Labels are the raw indices of the disjoint-set roots once scanning ends. A
//! tied union makes its second argument the root, so for a given edge order
//! the labels are fully determined. Use
//! [`crate::ComponentLabels::to_clustering`] for contiguous identifiers.

use tracing::{Span, debug, field, instrument};

use crate::{
    disjoint_set::{DisjointSet, SetElement},
    error::{MergeError, Result},
    labels::ComponentLabels,
};

/// A weighted MST edge between two node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    target: usize,
    weight: f64,
}

impl MstEdge {
    /// Creates an edge between `source` and `target`.
    #[must_use]
    pub const fn new(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }

    /// Returns the first endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the second endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> usize { self.target }

    /// Returns the edge weight.
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> f64 { self.weight }
}

impl From<(usize, usize, f64)> for MstEdge {
    fn from((source, target, weight): (usize, usize, f64)) -> Self {
        Self::new(source, target, weight)
    }
}

/// Bookkeeping reported by a merge pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MergeSummary {
    merged_edges: usize,
    cut_at: Option<usize>,
    component_count: usize,
}

impl MergeSummary {
    /// Number of edges at or below the threshold that were merged.
    #[must_use]
    #[rustfmt::skip]
    pub const fn merged_edges(&self) -> usize { self.merged_edges }

    /// Position of the first edge above the threshold, when one stopped the
    /// scan before the edge list was exhausted.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cut_at(&self) -> Option<usize> { self.cut_at }

    /// Number of components in the resulting labelling.
    #[must_use]
    #[rustfmt::skip]
    pub const fn component_count(&self) -> usize { self.component_count }
}

/// Cuts a sorted MST at a fixed threshold.
///
/// A merger holds no per-run state; every call builds and discards its own
/// disjoint set, so one merger can be shared freely between threads.
///
/// # Examples
/// ```
/// use arid_core::{ClusterMerger, MstEdge};
///
/// let merger = ClusterMerger::new(5.0)?;
/// let edges = [MstEdge::new(0, 1, 5.0), MstEdge::new(1, 2, 5.0)];
/// let labels = merger.compute_components(3, &edges)?;
/// assert_eq!(labels.component_count(), 1);
/// # Ok::<(), arid_core::MergeError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterMerger {
    threshold: f64,
}

impl ClusterMerger {
    /// Creates a merger that keeps edges with weight `<= threshold`.
    ///
    /// Infinite thresholds are allowed: `f64::INFINITY` keeps every edge and
    /// `f64::NEG_INFINITY` keeps none.
    ///
    /// # Errors
    /// Returns [`MergeError::InvalidThreshold`] when `threshold` is NaN.
    pub fn new(threshold: f64) -> Result<Self> {
        if threshold.is_nan() {
            return Err(MergeError::InvalidThreshold);
        }
        Ok(Self { threshold })
    }

    /// Returns the configured threshold.
    #[must_use]
    #[rustfmt::skip]
    pub const fn threshold(&self) -> f64 { self.threshold }

    /// Labels `node_count` nodes by the component they fall into once every
    /// edge heavier than the threshold is removed.
    ///
    /// `edges` must be sorted by non-decreasing weight and form a spanning
    /// tree (or forest) over the nodes. Sorting is not checked.
    ///
    /// # Errors
    /// Returns [`MergeError::AllocationFailed`] when no label buffer can be
    /// allocated for `node_count` nodes, [`MergeError::TooManyEdges`] when
    /// more than `node_count - 1` edges are supplied,
    /// [`MergeError::InvalidNodeId`] for an endpoint outside `0..node_count`,
    /// [`MergeError::InvalidWeight`] for a NaN weight before the cut, and
    /// [`MergeError::CycleDetected`] when an edge joins two nodes that are
    /// already connected.
    pub fn compute_components(
        &self,
        node_count: usize,
        edges: &[MstEdge],
    ) -> Result<ComponentLabels> {
        let mut labels = Vec::new();
        labels
            .try_reserve_exact(node_count)
            .map_err(|_| MergeError::AllocationFailed { node_count })?;
        labels.resize(node_count, 0_usize);
        let summary = self.compute_components_into(edges, &mut labels)?;
        Ok(ComponentLabels::new(labels, summary.component_count()))
    }

    /// Like [`Self::compute_components`], but overwrites a caller-provided
    /// buffer with one label per node. The buffer length is the node count.
    ///
    /// Labels may be stored as `usize`, `u32` or `u64`.
    ///
    /// # Errors
    /// As for [`Self::compute_components`], plus
    /// [`MergeError::DisjointSet`] when the label type cannot index every
    /// node or the disjoint set cannot be allocated. The buffer contents are
    /// unspecified after an error.
    ///
    /// # Examples
    /// ```
    /// use arid_core::{ClusterMerger, MstEdge};
    ///
    /// let merger = ClusterMerger::new(f64::NEG_INFINITY)?;
    /// let mut labels = [9_u32; 3];
    /// let summary = merger.compute_components_into(
    ///     &[MstEdge::new(0, 1, 0.0), MstEdge::new(1, 2, 0.0)],
    ///     &mut labels,
    /// )?;
    /// assert_eq!(labels, [0, 1, 2]);
    /// assert_eq!(summary.cut_at(), Some(0));
    /// # Ok::<(), arid_core::MergeError>(())
    /// ```
    #[instrument(
        name = "merge.compute_components",
        err,
        skip(self, edges, labels),
        fields(
            node_count = labels.len(),
            edges = edges.len(),
            threshold = self.threshold,
            merged = field::Empty,
            components = field::Empty,
        ),
    )]
    pub fn compute_components_into<L: SetElement>(
        &self,
        edges: &[MstEdge],
        labels: &mut [L],
    ) -> Result<MergeSummary> {
        let node_count = labels.len();
        if edges.len() > node_count.saturating_sub(1) {
            return Err(MergeError::TooManyEdges {
                edges: edges.len(),
                node_count,
            });
        }

        let mut sets = DisjointSet::<L>::try_new(node_count)?;
        let mut summary = MergeSummary::default();

        for (position, edge) in edges.iter().enumerate() {
            if edge.weight().is_nan() {
                return Err(MergeError::InvalidWeight { position });
            }
            if edge.weight() > self.threshold {
                debug!(position, weight = edge.weight(), "threshold reached");
                summary.cut_at = Some(position);
                break;
            }

            let left = sets.find(endpoint::<L>(edge.source(), position, node_count)?);
            let right = sets.find(endpoint::<L>(edge.target(), position, node_count)?);
            if left == right {
                return Err(MergeError::CycleDetected {
                    position,
                    source_node: edge.source(),
                    target_node: edge.target(),
                    representative: left.to_index(),
                });
            }
            sets.union(left, right)?;
            summary.merged_edges += 1;
        }

        for (node, label) in labels.iter_mut().enumerate() {
            *label = sets.find(L::from_index(node));
        }
        summary.component_count = sets.set_count();

        let span = Span::current();
        span.record("merged", summary.merged_edges);
        span.record("components", summary.component_count);
        Ok(summary)
    }
}

fn endpoint<L: SetElement>(node: usize, position: usize, node_count: usize) -> Result<L> {
    if node >= node_count {
        return Err(MergeError::InvalidNodeId {
            position,
            node,
            node_count,
        });
    }
    Ok(L::from_index(node))
}

/// Labels the components of `edges` cut at `threshold`.
///
/// Shorthand for [`ClusterMerger::new`] followed by
/// [`ClusterMerger::compute_components`].
///
/// # Errors
/// Returns [`MergeError::InvalidThreshold`] for a NaN threshold and otherwise
/// the errors documented on [`ClusterMerger::compute_components`].
///
/// # Examples
/// ```
/// use arid_core::compute_components;
///
/// let labels = compute_components(1, &[], 0.0)?;
/// assert_eq!(labels.as_slice(), &[0]);
/// # Ok::<(), arid_core::MergeError>(())
/// ```
pub fn compute_components(
    node_count: usize,
    edges: &[MstEdge],
    threshold: f64,
) -> Result<ComponentLabels> {
    ClusterMerger::new(threshold)?.compute_components(node_count, edges)
}


#[cfg(test)]
mod property;
