use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "eventim_scraper.log";
const DEFAULT_DIRECTIVES: &str = "eventim_scraper=info,warn";

/// Installs a console layer and a daily-rotated JSON file layer under
/// `log_dir`. The returned guard flushes the file writer when dropped, so
/// the caller keeps it alive for the whole run.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Could not create log directory {}: {}", log_dir.display(), e);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .init();

    guard
}

/// `RUST_LOG` when set and valid, otherwise info for this crate and warn
/// for dependencies.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}
