//! Arid core library.
//!
//! Cuts a sorted minimum spanning tree at a distance threshold and labels the
//! connected components that remain.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;

mod components;
mod disjoint_set;
mod flat;
mod labels;
mod stitch;

pub use crate::{
    components::{ClusterMerger, MergeSummary, MstEdge, compute_components},
    disjoint_set::{DisjointSet, DisjointSetError, DisjointSetErrorCode, SetElement},
    error::{MergeError, MergeErrorCode, Result},
    flat::{FlatMst, FlatMstError, FlatMstErrorCode, compute_components_flat},
    labels::{ClusterId, Clustering, ComponentLabels},
    stitch::{LabelEquivalences, LabelMapping, StitchError, StitchErrorCode, offset_labels},
};
