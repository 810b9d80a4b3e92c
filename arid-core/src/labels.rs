//! Labelling produced by a threshold cut.
//!
//! [`ComponentLabels`] holds the raw output of the merge: each node maps to
//! the index of its component's representative node. Those values are stable
//! but sparse. [`Clustering`] is the compacted form with identifiers
//! `0..cluster_count` assigned in order of first appearance.

/// Per-node representative labels returned by
/// [`crate::ClusterMerger::compute_components`].
///
/// # Examples
/// ```
/// use arid_core::{MstEdge, compute_components};
///
/// let edges = [MstEdge::new(0, 1, 1.0), MstEdge::new(1, 2, 4.0)];
/// let labels = compute_components(3, &edges, 2.0)?;
/// assert!(labels.same_component(0, 1));
/// assert!(!labels.same_component(1, 2));
/// assert_eq!(labels.component_count(), 2);
/// # Ok::<(), arid_core::MergeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLabels {
    labels: Vec<usize>,
    component_count: usize,
}

impl ComponentLabels {
    pub(crate) fn new(labels: Vec<usize>, component_count: usize) -> Self {
        Self {
            labels,
            component_count,
        }
    }

    /// Returns the representative of every node, indexed by node.
    #[must_use]
    #[rustfmt::skip]
    pub fn as_slice(&self) -> &[usize] { &self.labels }

    /// Consumes the labelling and returns the raw representative vector.
    #[must_use]
    #[rustfmt::skip]
    pub fn into_vec(self) -> Vec<usize> { self.labels }

    /// Number of labelled nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.labels.len() }

    /// Returns `true` when no nodes were labelled.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Number of distinct components.
    #[must_use]
    #[rustfmt::skip]
    pub fn component_count(&self) -> usize { self.component_count }

    /// Returns the representative of `node`, or `None` when it is out of range.
    #[must_use]
    pub fn label(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied()
    }

    /// Returns `true` when both nodes exist and share a component.
    #[must_use]
    pub fn same_component(&self, left: usize, right: usize) -> bool {
        match (self.label(left), self.label(right)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    /// Remaps representatives to contiguous cluster identifiers, numbering
    /// components in the order their first node appears.
    ///
    /// # Examples
    /// ```
    /// use arid_core::{MstEdge, compute_components};
    ///
    /// let edges = [MstEdge::new(0, 1, 1.0), MstEdge::new(1, 2, 2.0), MstEdge::new(2, 3, 3.0)];
    /// let labels = compute_components(4, &edges, 2.0)?;
    /// assert_eq!(labels.as_slice(), &[1, 1, 1, 3]);
    ///
    /// let clustering = labels.to_clustering();
    /// let ids: Vec<u64> = clustering.assignments().iter().map(|id| id.get()).collect();
    /// assert_eq!(ids, vec![0, 0, 0, 1]);
    /// # Ok::<(), arid_core::MergeError>(())
    /// ```
    #[must_use]
    pub fn to_clustering(&self) -> Clustering {
        let mut ids: Vec<Option<ClusterId>> = vec![None; self.labels.len()];
        let mut next = 0_u64;
        let assignments = self
            .labels
            .iter()
            .map(|&representative| {
                *ids[representative].get_or_insert_with(|| {
                    let id = ClusterId::new(next);
                    next += 1;
                    id
                })
            })
            .collect();
        Clustering {
            assignments,
            cluster_count: self.component_count,
        }
    }
}

/// Contiguous cluster assignments derived from [`ComponentLabels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    assignments: Vec<ClusterId>,
    cluster_count: usize,
}

impl Clustering {
    /// Returns the assignments in node order.
    #[must_use]
    pub fn assignments(&self) -> &[ClusterId] {
        &self.assignments
    }

    /// Number of distinct clusters; identifiers run from `0` to this value.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use arid_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}
