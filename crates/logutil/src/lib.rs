//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Output format for emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line output for terminals.
    HumanReadable,
    /// One JSON object per event, for log collectors.
    Json,
}

/// Install the global tracing subscriber.
///
/// `default_level` applies when `RUST_LOG` is unset; when set, `RUST_LOG`
/// directives take precedence. The writer is injected so the binary can keep
/// stdout free for report output, and so tests can capture log lines.
///
/// Calling this more than once is a no-op after the first call, which lets
/// every test initialize logging without coordinating.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, make_writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_target(false);

    let result = match format {
        LogFormat::HumanReadable => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // Already initialized, keep the existing subscriber.
    let _ = result;
}
