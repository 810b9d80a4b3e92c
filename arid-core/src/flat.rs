//! Flat `(u, v, weight)` interchange buffers.
//!
//! MST producers commonly hand over a single `f64` buffer holding
//! `3 * (node_count - 1)` values, one triple per edge in ascending weight
//! order. [`FlatMst`] decodes that layout into [`MstEdge`] values and
//! [`compute_components_flat`] runs the threshold cut straight into a `u64`
//! label buffer owned by the caller.

use thiserror::Error;
use tracing::instrument;

use crate::{
    components::{ClusterMerger, MergeSummary, MstEdge},
    error::{MergeError, define_error_codes},
};

/// Errors raised while decoding a flat MST buffer.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum FlatMstError {
    /// The buffer length is not a multiple of three.
    #[error("flat MST buffer has {len} values, which is not a whole number of (u, v, weight) triples")]
    RaggedBuffer {
        /// Number of values in the buffer.
        len: usize,
    },
    /// The buffer holds more triples than a spanning tree can have.
    #[error("flat MST buffer holds {triples} edges but {node_count} nodes allow at most {max}", max = .node_count.saturating_sub(1))]
    TooManyTriples {
        /// Number of triples in the buffer.
        triples: usize,
        /// Number of nodes in the tree.
        node_count: usize,
    },
    /// A node entry was not an integral index below `node_count`.
    #[error("edge {triple} has endpoint {value}, which is not a node index below {node_count}")]
    InvalidEndpoint {
        /// Position of the offending triple.
        triple: usize,
        /// The raw endpoint value.
        value: f64,
        /// Number of nodes in the tree.
        node_count: usize,
    },
    /// A weight entry was NaN.
    #[error("edge {triple} has a NaN weight")]
    InvalidWeight {
        /// Position of the offending triple.
        triple: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`FlatMstError`] variants.
    enum FlatMstErrorCode for FlatMstError {
        /// The buffer length is not a multiple of three.
        RaggedBuffer => RaggedBuffer { .. } => "FLAT_MST_RAGGED_BUFFER",
        /// The buffer holds too many triples.
        TooManyTriples => TooManyTriples { .. } => "FLAT_MST_TOO_MANY_TRIPLES",
        /// A node entry was not a valid index.
        InvalidEndpoint => InvalidEndpoint { .. } => "FLAT_MST_INVALID_ENDPOINT",
        /// A weight entry was NaN.
        InvalidWeight => InvalidWeight { .. } => "FLAT_MST_INVALID_WEIGHT",
    }
}

/// An MST decoded from a flat triple buffer.
///
/// # Examples
/// ```
/// use arid_core::FlatMst;
///
/// let mst = FlatMst::from_slice(3, &[0.0, 1.0, 0.5, 1.0, 2.0, 0.75])?;
/// assert_eq!(mst.edges().len(), 2);
/// assert_eq!(mst.edges()[1].target(), 2);
/// # Ok::<(), arid_core::FlatMstError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlatMst {
    node_count: usize,
    edges: Vec<MstEdge>,
}

impl FlatMst {
    /// Decodes `values` as `(u, v, weight)` triples over `node_count` nodes.
    ///
    /// Weights may be any non-NaN value, infinities included; ordering is
    /// not checked.
    ///
    /// # Errors
    /// Returns [`FlatMstError`] when the buffer is ragged, holds more than
    /// `node_count - 1` triples, contains an endpoint that is not an
    /// integral index below `node_count`, or contains a NaN weight.
    pub fn from_slice(node_count: usize, values: &[f64]) -> Result<Self, FlatMstError> {
        let (triples, rest) = values.as_chunks::<3>();
        if !rest.is_empty() {
            return Err(FlatMstError::RaggedBuffer { len: values.len() });
        }
        if triples.len() > node_count.saturating_sub(1) {
            return Err(FlatMstError::TooManyTriples {
                triples: triples.len(),
                node_count,
            });
        }

        let edges = triples
            .iter()
            .enumerate()
            .map(|(triple, &[source, target, weight])| {
                if weight.is_nan() {
                    return Err(FlatMstError::InvalidWeight { triple });
                }
                Ok(MstEdge::new(
                    decode_endpoint(triple, source, node_count)?,
                    decode_endpoint(triple, target, node_count)?,
                    weight,
                ))
            })
            .collect::<Result<Vec<_>, FlatMstError>>()?;

        Ok(Self { node_count, edges })
    }

    /// Number of nodes the tree spans.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Decoded edges in buffer order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[MstEdge] { &self.edges }

    /// Consumes the tree and returns its edges.
    #[must_use]
    #[rustfmt::skip]
    pub fn into_edges(self) -> Vec<MstEdge> { self.edges }
}

fn decode_endpoint(triple: usize, value: f64, node_count: usize) -> Result<usize, FlatMstError> {
    let valid = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
    if valid && value < node_count as f64 {
        return Ok(value as usize);
    }
    Err(FlatMstError::InvalidEndpoint {
        triple,
        value,
        node_count,
    })
}

/// Cuts a flat MST buffer at `threshold` and writes one representative per
/// node into `labels`, whose length is the node count.
///
/// # Errors
/// Returns [`MergeError::Flat`] when the buffer cannot be decoded and the
/// other [`MergeError`] variants under the same conditions as
/// [`ClusterMerger::compute_components_into`].
///
/// # Examples
/// ```
/// use arid_core::compute_components_flat;
///
/// let mst = [0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0];
/// let mut labels = [0_u64; 4];
/// compute_components_flat(&mst, 2.0, &mut labels)?;
/// assert_eq!(labels, [1, 1, 1, 3]);
/// # Ok::<(), arid_core::MergeError>(())
/// ```
#[instrument(
    name = "merge.compute_components_flat",
    err,
    skip(values, labels),
    fields(node_count = labels.len(), values = values.len()),
)]
pub fn compute_components_flat(
    values: &[f64],
    threshold: f64,
    labels: &mut [u64],
) -> Result<MergeSummary, MergeError> {
    let merger = ClusterMerger::new(threshold)?;
    let mst = FlatMst::from_slice(labels.len(), values)?;
    merger.compute_components_into(mst.edges(), labels)
}
