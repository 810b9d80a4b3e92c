//! Command implementations and argument parsing for the arid CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use arid_core::{ClusterMerger, ComponentLabels, MergeError, MstEdge};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, debug, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "arid",
    about = "Cut a minimum spanning tree at a threshold and label its components."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Label the connected components left after cutting an MST.
    Components(ComponentsCommand),
}

/// Options accepted by the `components` command.
#[derive(Debug, Args, Clone)]
pub struct ComponentsCommand {
    /// Text file with one `u v weight` edge per line.
    pub path: PathBuf,

    /// Edges with weight at most this value are kept. Accepts `inf` and `-inf`.
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: f64,

    /// Number of nodes. Defaults to one more than the largest endpoint.
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Sort edges by weight before merging. Ties keep their file order.
    #[arg(long)]
    pub sort: bool,

    /// How labels are printed.
    #[arg(long, value_enum, default_value_t = LabelFormat::Raw)]
    pub labels: LabelFormat,
}

/// Label formats supported by the `components` command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LabelFormat {
    /// Print the representative node index of each component.
    Raw,
    /// Print cluster identifiers numbered by first appearance.
    Contiguous,
}

impl LabelFormat {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Contiguous => "contiguous",
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while reading the edge list.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line of the edge list could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The threshold merge rejected the input.
    #[error(transparent)]
    Core(#[from] MergeError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Per-node labels produced by the merge.
    pub labels: ComponentLabels,
    /// Format requested for rendering.
    pub format: LabelFormat,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading, parsing or merging fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use arid_cli::cli::{Cli, Command, ComponentsCommand, LabelFormat, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 1 1.0\n1 2 2.0\n2 3 3.0\n")?;
/// let cli = Cli {
///     command: Command::Components(ComponentsCommand {
///         path: file.path().to_path_buf(),
///         threshold: 2.0,
///         nodes: None,
///         sort: false,
///         labels: LabelFormat::Raw,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.labels.as_slice(), &[1, 1, 1, 3]);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Components(command) => {
            Span::current().record("command", field::display("components"));
            run_components(command)
        }
    }
}

#[instrument(
    name = "cli.components",
    err,
    skip(command),
    fields(
        path = field::Empty,
        threshold = command.threshold,
        sort = command.sort,
        labels = command.labels.as_str(),
        nodes = field::Empty,
    ),
)]
pub(super) fn run_components(command: ComponentsCommand) -> Result<ExecutionSummary, CliError> {
    let ComponentsCommand {
        path,
        threshold,
        nodes,
        sort,
        labels: format,
    } = command;
    let span = Span::current();
    span.record("path", field::display(path.display()));

    let merger = ClusterMerger::new(threshold)?;
    let reader = open_edge_reader(&path)?;
    let mut edges = parse_edges(reader, &path)?;
    if sort {
        edges.sort_by(|left, right| left.weight().total_cmp(&right.weight()));
    }

    let node_count = nodes.unwrap_or_else(|| infer_node_count(&edges));
    span.record("nodes", node_count);
    let labels = merger.compute_components(node_count, &edges)?;

    info!(
        edges = edges.len(),
        components = labels.component_count(),
        "command completed"
    );
    Ok(ExecutionSummary { labels, format })
}

#[instrument(name = "cli.open_edge_reader", err, fields(path = field::Empty))]
pub(super) fn open_edge_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads `u v weight` triples, skipping blank lines and `#` comments.
///
/// Weights may be `inf` or `-inf` but not NaN.
pub(super) fn parse_edges(reader: impl BufRead, path: &Path) -> Result<Vec<MstEdge>, CliError> {
    let mut edges = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        edges.push(parse_edge(content).map_err(|reason| CliError::Parse {
            line: index + 1,
            reason,
        })?);
    }
    debug!(edges = edges.len(), "edge list parsed");
    Ok(edges)
}

fn parse_edge(content: &str) -> Result<MstEdge, String> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    let [source, target, weight] = fields.as_slice() else {
        return Err(format!("expected `u v weight`, found {} fields", fields.len()));
    };
    let node = |raw: &str| {
        raw.parse::<usize>()
            .map_err(|err| format!("invalid node index `{raw}`: {err}"))
    };
    let weight = match weight.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => {
            return Err(format!("invalid weight `{weight}`: weight must not be NaN"));
        }
        Ok(parsed) => parsed,
        Err(err) => return Err(format!("invalid weight `{weight}`: {err}")),
    };
    Ok(MstEdge::new(node(*source)?, node(*target)?, weight))
}

fn infer_node_count(edges: &[MstEdge]) -> usize {
    edges
        .iter()
        .map(|edge| edge.source().max(edge.target()))
        .max()
        .map_or(0, |largest| largest.saturating_add(1))
}

/// Renders `summary` to `writer`: a `components: k` header, then one
/// `index<TAB>label` line per node.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use arid_cli::cli::{ExecutionSummary, LabelFormat, render_summary};
/// # use arid_core::{MstEdge, compute_components};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let labels = compute_components(3, &[MstEdge::new(1, 2, 0.5)], 1.0)?;
/// let summary = ExecutionSummary { labels, format: LabelFormat::Contiguous };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "components: 2\n0\t0\n1\t1\n2\t1\n");
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "components: {}", summary.labels.component_count())?;
    match summary.format {
        LabelFormat::Raw => {
            for (index, label) in summary.labels.as_slice().iter().enumerate() {
                writeln!(writer, "{index}\t{label}")?;
            }
        }
        LabelFormat::Contiguous => {
            let clustering = summary.labels.to_clustering();
            for (index, cluster) in clustering.assignments().iter().enumerate() {
                writeln!(writer, "{index}\t{}", cluster.get())?;
            }
        }
    }
    Ok(())
}
