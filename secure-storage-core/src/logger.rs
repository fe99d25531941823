//! Forwarding of `log` records to a host-provided logger.

use std::sync::{Arc, OnceLock};

/// Receives log messages emitted by this crate.
///
/// Implemented by the host application and exported via `UniFFI`.
///
/// # Examples
///
/// ```rust
/// use secure_storage_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// final class SecureStorageLogger: SecureStorageCore.Logger {
///     func log(level: SecureStorageCore.LogLevel, message: String) {
///         os_log("%{public}@", message)
///     }
/// }
///
/// setLogger(logger: SecureStorageLogger()) // once, at startup
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, extremely detailed messages.
    Trace,
    /// Debugging information.
    Debug,
    /// Progress information.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Errors.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

/// `log::Log` implementation forwarding to [`LOGGER_INSTANCE`].
struct ForeignLogger;

impl ForeignLogger {
    /// Debug and trace records are only forwarded from this crate; everything
    /// at info and above is forwarded regardless of origin.
    fn forwards(metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
            || metadata.target().starts_with("secure_storage")
    }
}

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Self::forwards(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !Self::forwards(record.metadata()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs `logger` as the destination for this crate's log output.
///
/// Only the first call takes effect.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
