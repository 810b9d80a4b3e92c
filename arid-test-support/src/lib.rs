//! Shared test utilities used across arid crates.
//!
//! - [`tracing`] captures spans and events so instrumentation can be asserted.
//! - [`proptest_profile`] reads the environment overrides that tune how many
//!   cases each property suite runs.

pub mod proptest_profile;
pub mod tracing;
