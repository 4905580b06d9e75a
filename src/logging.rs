//! Tracing setup for the gateway.
//!
//! Events go to stdout and to an append-only log file drained by a non-blocking worker, so request
//! handlers never wait on disk. The file defaults to `logs/record-gateway.log` and moves with
//! `RECORD_GATEWAY_LOG_FILE` or `--log-file`. `RUST_LOG` replaces the default filter.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "RECORD_GATEWAY_LOG_FILE";
/// Log file used when none is configured.
pub const DEFAULT_LOG_FILE: &str = "logs/record-gateway.log";
/// Filter used when `RUST_LOG` is unset. Driver internals stay at `warn`.
pub const DEFAULT_FILTER: &str = "info,mongodb=warn";

/// Resolve the file receiving log output.
pub fn log_file_path(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), Path::to_path_buf)
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Wrap `file` in a non-blocking writer whose guard lives for the rest of the process.
fn non_blocking(file: File) -> NonBlocking {
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    writer
}

/// Install the stdout layer and, when the log file opens, the file layer.
///
/// A file that cannot be opened is reported on stderr and logging continues on stdout only.
pub fn init_tracing(log_file: Option<&Path>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let path = log_file_path(log_file);
    let file_layer = match open_log_file(&path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(non_blocking(file))
                .with_target(true)
                .with_ansi(false)
                .compact(),
        ),
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    };
    let file_enabled = file_layer.is_some();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if file_enabled {
        tracing::debug!(path = %path.display(), "File logging enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_path_applies_without_configuration() {
        assert_eq!(log_file_path(None), PathBuf::from("logs/record-gateway.log"));
    }

    #[test]
    fn configured_path_wins() {
        let configured = Path::new("/var/log/gateway.log");
        assert_eq!(log_file_path(Some(configured)), configured);
    }

    #[test]
    fn opening_creates_directories_and_appends() {
        let root = std::env::temp_dir().join(format!("record-gateway-logs-{}", std::process::id()));
        let path = root.join("nested").join("gateway.log");

        for line in ["first\n", "second\n"] {
            let mut file = open_log_file(&path).expect("open log file");
            file.write_all(line.as_bytes()).expect("write");
        }
        let contents = fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "first\nsecond\n");

        fs::remove_dir_all(&root).expect("cleanup");
    }
}
