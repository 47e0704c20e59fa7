// Conditional logging macros - only active in debug builds

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// `<data_local_dir>/wordparty/wordparty.log`
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("wordparty").join("wordparty.log"))
}

/// Where log records may go, in the order to try them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `--log-file` or the default log file first. Stderr is only a fallback, and
/// only when the terminal is not taken over by the full-screen interface.
#[must_use]
pub fn log_targets(log_file: Option<PathBuf>, stderr_fallback: bool) -> Vec<LogTarget> {
    let mut targets: Vec<LogTarget> = log_file
        .or_else(default_log_path)
        .map(LogTarget::File)
        .into_iter()
        .collect();
    if stderr_fallback {
        targets.push(LogTarget::Stderr);
    }
    targets
}

/// Install env_logger (`RUST_LOG`, default `info`).
///
/// With a path, records are appended to that file so they never land on the
/// terminal the game is drawing on; without one they go to stderr.
pub fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder.try_init().map_err(io::Error::other)
}
