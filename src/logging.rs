use std::io::Write;

use crate::error::SlotError;

/// ログレベル定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Initialize the logging system.
///
/// Uses env_logger with a default filter of `info`; override with `RUST_LOG`.
/// Calling it more than once keeps the first logger.
pub fn init_logging() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                jiff::Timestamp::now(),
                record.level(),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        eprintln!("Warning: Logging system already initialized");
    }
}

/// Send a log message at a level chosen at runtime.
pub fn send_log(level: LogLevel, message: &str) {
    log::log!(log::Level::from(level), "{}", message);
}

/// Log a slot error at error level, optionally prefixed with context.
pub fn log_slot_error(error: &SlotError, context: Option<&str>) {
    let message = match context {
        Some(ctx) => format!("{}: {}", ctx, error),
        None => error.to_string(),
    };

    send_log(LogLevel::Error, &message);
}

/// Result extension for convenient error logging
pub trait ResultExt<T, E> {
    fn log_error(self, context: Option<&str>) -> Self;
}

impl<T> ResultExt<T, SlotError> for Result<T, SlotError> {
    fn log_error(self, context: Option<&str>) -> Self {
        if let Err(ref error) = self {
            log_slot_error(error, context);
        }
        self
    }
}

impl<T> ResultExt<T, anyhow::Error> for anyhow::Result<T> {
    fn log_error(self, context: Option<&str>) -> Self {
        if let Err(ref error) = self {
            let message = match context {
                Some(ctx) => format!("{}: {:#}", ctx, error),
                None => format!("{:#}", error),
            };
            send_log(LogLevel::Error, &message);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_log_levels_when_converting_then_log_crate_levels_match() {
        assert_eq!(log::Level::from(LogLevel::Debug), log::Level::Debug);
        assert_eq!(log::Level::from(LogLevel::Warn), log::Level::Warn);
        assert_eq!(log::Level::from(LogLevel::Error), log::Level::Error);
    }

    #[test]
    fn given_error_result_when_logging_then_result_is_passed_through() {
        let result: Result<(), SlotError> =
            Err(SlotError::LibraryIndexOutOfRange { index: 2, len: 1 });

        let logged = result.clone().log_error(Some("remove slot"));

        assert_eq!(logged, result);
    }
}
