//! Logging configuration.
//!
//! Every event is appended to a log file with a `YYYY-MM-DD HH:MM:SS LEVEL`
//! prefix. Warnings and errors are also written to stderr, and with
//! `--verbose` informational lines are mirrored to stdout.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, time::ChronoLocal, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keeps the background log writer alive. Dropping it flushes pending lines
/// to the log file.
#[must_use = "dropping the guard stops the log file writer"]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Where the console layers write, and whether they may color their output.
struct Console<O, E> {
    stdout: O,
    stdout_ansi: bool,
    stderr: E,
    stderr_ansi: bool,
}

/// Initialize the logging system.
///
/// Log level can be controlled via the `MEDIASYNC_LOG` environment variable:
/// - `MEDIASYNC_LOG=debug` for verbose output
/// - `MEDIASYNC_LOG=info` for standard output (default)
/// - `MEDIASYNC_LOG=warn` for warnings and errors only
pub fn init(log_file: &Path, verbose: bool) -> Result<LogGuard> {
    let console = Console {
        stdout: std::io::stdout,
        stdout_ansi: std::io::stdout().is_terminal(),
        stderr: std::io::stderr,
        stderr_ansi: std::io::stderr().is_terminal(),
    };
    let (subscriber, guard) = build(log_file, verbose, console)?;

    subscriber
        .try_init()
        .context("Failed to set tracing subscriber")?;

    tracing::debug!("Logging initialized at {:?}", log_file);
    Ok(LogGuard { _file: guard })
}

fn build<O, E>(
    log_file: &Path,
    verbose: bool,
    console: Console<O, E>,
) -> Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard)>
where
    O: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_env("MEDIASYNC_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info,ureq=warn"));

    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .context("Log file path has no file name")?;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    // `never` appends to the same file on every run
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()));

    let stderr_layer = fmt::layer()
        .with_writer(console.stderr)
        .with_ansi(console.stderr_ansi)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    // Levels compare by verbosity, so `> WARN` is INFO and below
    let stdout_ansi = console.stdout_ansi;
    let stdout = console.stdout;
    let stdout_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(stdout)
            .with_ansi(stdout_ansi)
            .with_target(false)
            .without_time()
            .with_filter(filter_fn(|meta| *meta.level() > Level::WARN))
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(stdout_layer);

    Ok((subscriber, guard))
}
