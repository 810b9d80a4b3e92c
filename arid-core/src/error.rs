//! Error types for the arid core library.
//!
//! Hosts the [`MergeError`] returned by the threshold merge and the macro that
//! attaches stable, machine-readable codes to every error enum in the crate.

use thiserror::Error;

use crate::{disjoint_set::DisjointSetError, flat::FlatMstError};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Error produced while cutting an MST at a threshold.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MergeError {
    /// The threshold was NaN, which orders against no weight.
    #[error("threshold must not be NaN")]
    InvalidThreshold,
    /// More edges were supplied than a spanning tree over the nodes can hold.
    #[error("{edges} edges supplied but a spanning tree over {node_count} nodes has at most {max}", max = .node_count.saturating_sub(1))]
    TooManyEdges {
        /// Number of edges supplied.
        edges: usize,
        /// Number of nodes in the tree.
        node_count: usize,
    },
    /// An edge endpoint referenced a node outside `0..node_count`.
    #[error("edge {position} references node {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// Position of the offending edge in scan order.
        position: usize,
        /// The out-of-range endpoint.
        node: usize,
        /// Number of nodes in the tree.
        node_count: usize,
    },
    /// An edge joined two nodes that were already in the same component, so
    /// the input was not a tree.
    #[error(
        "edge {position} ({source_node}, {target_node}) closes a cycle: both endpoints already belong to component {representative}"
    )]
    CycleDetected {
        /// Position of the offending edge in scan order.
        position: usize,
        /// First endpoint of the edge.
        source_node: usize,
        /// Second endpoint of the edge.
        target_node: usize,
        /// Representative shared by both endpoints.
        representative: usize,
    },
    /// An edge inside the scanned prefix had a NaN weight, which orders
    /// against no threshold.
    #[error("edge {position} has a NaN weight")]
    InvalidWeight {
        /// Position of the offending edge in scan order.
        position: usize,
    },
    /// The label buffer for `node_count` nodes could not be allocated.
    #[error("cannot allocate labels for {node_count} nodes")]
    AllocationFailed {
        /// Number of nodes requested.
        node_count: usize,
    },
    /// The disjoint set could not be built or rejected a union.
    #[error(transparent)]
    DisjointSet {
        /// Failure reported by [`crate::DisjointSet`].
        #[from]
        source: DisjointSetError,
    },
    /// The flat interchange buffer could not be decoded.
    #[error(transparent)]
    Flat {
        /// Decoding failure reported by [`crate::FlatMst`].
        #[from]
        source: FlatMstError,
    },
}

define_error_codes! {
    /// Stable codes describing [`MergeError`] variants.
    enum MergeErrorCode for MergeError {
        /// The threshold was NaN.
        InvalidThreshold => InvalidThreshold => "ARID_INVALID_THRESHOLD",
        /// More edges were supplied than a spanning tree can hold.
        TooManyEdges => TooManyEdges { .. } => "ARID_TOO_MANY_EDGES",
        /// An edge endpoint was out of range.
        InvalidNodeId => InvalidNodeId { .. } => "ARID_INVALID_NODE_ID",
        /// An edge closed a cycle.
        CycleDetected => CycleDetected { .. } => "ARID_CYCLE_DETECTED",
        /// An edge weight was NaN.
        InvalidWeight => InvalidWeight { .. } => "ARID_INVALID_WEIGHT",
        /// The label buffer could not be allocated.
        AllocationFailed => AllocationFailed { .. } => "ARID_ALLOCATION_FAILED",
        /// The disjoint set rejected the input.
        DisjointSet => DisjointSet { .. } => "ARID_DISJOINT_SET",
        /// The flat interchange buffer was malformed.
        Flat => Flat { .. } => "ARID_FLAT_MST",
    }
}

impl MergeError {
    /// Retrieve the inner [`crate::FlatMstErrorCode`] when decoding the flat
    /// buffer failed.
    #[must_use]
    pub const fn flat_code(&self) -> Option<crate::FlatMstErrorCode> {
        match self {
            Self::Flat { source } => Some(source.code()),
            _ => None,
        }
    }

    /// Returns `true` when the error indicates the edge list was not a tree.
    #[must_use]
    pub const fn is_internal_fault(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}

/// Convenient alias for results returned by the merge API.
pub type Result<T> = core::result::Result<T, MergeError>;
