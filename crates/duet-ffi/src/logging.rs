//! Structured logging setup for hosts that load the C library.

use std::env;
use std::ffi::c_char;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::read_name;

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a format name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self, LoggingError> {
        if name.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if name.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggingError::InvalidFormat(name.to_string()))
        }
    }
}

/// Errors raised while installing the log subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile(String),
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOGGING_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOGGING_INVALID_FORMAT",
            LoggingError::LogFile(_) => "LOGGING_FILE_OPEN_FAILED",
            LoggingError::Init(_) => "LOGGING_INIT_FAILED",
        }
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), msg)
            }
            LoggingError::InvalidFormat(name) => write!(
                f,
                "[{}] Invalid DUET_LOG_FORMAT '{}' (expected 'json' or 'pretty')",
                self.code(),
                name
            ),
            LoggingError::LogFile(msg) => {
                write!(f, "[{}] Failed to open log file: {}", self.code(), msg)
            }
            LoggingError::Init(msg) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Build the event filter for a level or directive string. `off` disables output.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| LoggingError::LogFile(err.to_string()))
}

fn map_init_err<E: fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

/// Install a global subscriber.
///
/// When `level` is `None`, `DUET_TRACE` is read, defaulting to `off`.
/// `DUET_LOG_FORMAT` selects `pretty` (default) or `json` output on stderr,
/// and `DUET_LOG_FILE` additionally appends events to a file.
///
/// Returns `Ok(false)` if a subscriber is already installed.
pub fn init_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var("DUET_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;
    let format = LogFormat::from_name(
        &env::var("DUET_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
    )?;
    let log_file = env::var("DUET_LOG_FILE").ok();

    match format {
        LogFormat::Json => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .json();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .json();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
        LogFormat::Pretty => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .pretty();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .pretty();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
    }

    Ok(true)
}

/// Enables structured logging at `level`, or from `DUET_TRACE` when null.
///
/// Returns `false` if logging was already initialized.
///
/// # Panics
///
/// Panics on an invalid filter, format or log file.
///
/// # Safety
///
/// `level` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_enable_logging(level: *const c_char) -> bool {
    let level = unsafe { read_name(level) };
    match init_logging(level.as_deref()) {
        Ok(installed) => installed,
        Err(err) => panic!("called `duet_enable_logging` with invalid configuration: {}", err),
    }
}
