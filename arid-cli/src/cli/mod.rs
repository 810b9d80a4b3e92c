//! Command-line interface orchestration for arid.
//!
//! The `components` command reads a weight-sorted MST from a text file, cuts
//! it at a threshold and prints one label per node.

mod commands;

pub use commands::{
    Cli, CliError, Command, ComponentsCommand, ExecutionSummary, LabelFormat, render_summary,
    run_cli,
};
