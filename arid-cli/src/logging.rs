//! Logging initialisation for the arid CLI.
//!
//! Diagnostics go to `stderr` so the labelling printed on `stdout` stays
//! machine-readable. Two environment variables shape the output:
//!
//! - `ARID_LOG_FORMAT` selects `human` (the default) or `json` lines.
//! - `RUST_LOG` holds `EnvFilter` directives and falls back to `info` when it
//!   is unset, blank or unparsable.
//!
//! The `log` facade is bridged so crates logging through it share the stream.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

const LOG_FORMAT_ENV: &str = "ARID_LOG_FORMAT";
const LOG_FILTER_ENV: &str = "RUST_LOG";
const DEFAULT_FILTER: &str = "info";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Output format selected through `ARID_LOG_FORMAT`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per event, including the active span list.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    /// Parses `human` or `json`, ignoring case and surrounding whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: env::VarError,
    },
    /// Unsupported log format requested via `ARID_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: TryInitError,
    },
}

/// Logging options resolved from the environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogSettings {
    format: LogFormat,
    filter: Option<String>,
}

impl LogSettings {
    /// Reads `ARID_LOG_FORMAT` and `RUST_LOG` from the process environment.
    ///
    /// # Errors
    /// Returns [`LoggingError`] when `ARID_LOG_FORMAT` is not valid Unicode or
    /// names an unsupported format.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|name| env::var(name))
    }

    /// Resolves the settings through `lookup`, which behaves like
    /// [`env::var`].
    ///
    /// A `RUST_LOG` value that cannot be read is treated as unset, matching
    /// [`EnvFilter::try_from_default_env`].
    ///
    /// # Errors
    /// As for [`Self::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<Self, LoggingError> {
        let format = match lookup(LOG_FORMAT_ENV) {
            Ok(raw) => raw.parse()?,
            Err(env::VarError::NotPresent) => LogFormat::default(),
            Err(source @ env::VarError::NotUnicode(_)) => {
                return Err(LoggingError::InvalidUnicode {
                    name: LOG_FORMAT_ENV,
                    source,
                });
            }
        };
        let filter = lookup(LOG_FILTER_ENV)
            .ok()
            .filter(|directives| !directives.trim().is_empty());
        Ok(Self { format, filter })
    }

    /// Selected output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// Filter directives requested through `RUST_LOG`, or `info`.
    #[must_use]
    pub fn filter_directives(&self) -> &str {
        self.filter.as_deref().unwrap_or(DEFAULT_FILTER)
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.filter_directives())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install global structured logging if it has not already been configured.
///
/// A subscriber installed by someone else is kept; a note is written to
/// `stderr` and initialisation still succeeds.
///
/// # Errors
/// Returns [`LoggingError`] when the environment cannot be resolved into
/// [`LogSettings`].
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }

    let settings = LogSettings::from_env()?;
    match install_subscriber(&settings) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => report_existing_subscriber(&source),
        Err(err) => return Err(err),
    }
    let _ = INITIALISED.set(());
    Ok(())
}

fn install_subscriber(settings: &LogSettings) -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let fmt_layer = match settings.format() {
        LogFormat::Json => fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Human => fmt_layer.boxed(),
    };

    // Another logger may already own the `log` slot; keep it if so.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(settings.env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is owned by another subscriber, so stderr is the only channel"
)]
fn report_existing_subscriber(source: &TryInitError) {
    eprintln!("structured logging already configured elsewhere: {source}");
}
