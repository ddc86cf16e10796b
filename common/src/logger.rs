//! Logging bootstrap shared by every binary that hosts a grading session.

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global `tracing` subscriber.
///
/// Events go to a daily-rolling file `<log_dir>/<log_file>.<date>` and, when
/// `log_to_stdout` is set, to stdout as well. The filter is `log_level`
/// unless `LOG_LEVEL` parses as a directive set of its own.
///
/// Keep the returned guard alive for as long as logs should be flushed.
/// Calling this a second time leaves the first subscriber in place.
pub fn init_logging(
    log_dir: &str,
    log_file: &str,
    log_level: &str,
    log_to_stdout: bool,
) -> WorkerGuard {
    if !Path::new(log_dir).exists() {
        fs::create_dir_all(log_dir).ok();
    }

    let file_appender = rolling::daily(log_dir, log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    let installed = if log_to_stdout {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true);
        registry.with(stdout_layer).try_init()
    } else {
        registry.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed; keeping the existing one");
    }

    guard
}

/// Same as [`init_logging`], reading every setting from [`crate::config`].
pub fn init_from_config() -> WorkerGuard {
    init_logging(
        &crate::config::log_dir(),
        &crate::config::log_file(),
        &crate::config::log_level(),
        crate::config::log_to_stdout(),
    )
}
