//! Benchmark support crate for arid.
//!
//! Generates weight-sorted synthetic spanning trees and groups the parameters
//! used by the Criterion benchmarks of the threshold merge.

pub mod error;
pub mod params;
pub mod tree;
