use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use kanime_core::config::{AppConfig, LoggingConfig};

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run.
pub fn init(config: &LoggingConfig, verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("kanime=debug")
        } else {
            EnvFilter::new(&config.filter)
        }
    });

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file, guard) = if config.file {
        let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "kanime.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .init();
    guard
}
