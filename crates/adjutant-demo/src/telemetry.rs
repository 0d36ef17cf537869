//! Log setup shared by the demo binaries.

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Names a file to append logs to instead of stderr.
pub const LOG_FILE_ENV: &str = "ADJUTANT_LOG";

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
///
/// Returns the file writer's guard, which flushes pending lines on drop.
pub fn init_tracing(default_level: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match log_file() {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_ansi(false).with_writer(writer).try_init().ok()?;
            Some(guard)
        }
        None => {
            let _ = builder
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}

fn log_file() -> Option<File> {
    let path = std::env::var_os(LOG_FILE_ENV).filter(|path| !path.is_empty())?;
    OpenOptions::new().create(true).append(true).open(path).ok()
}
