use crate::MemoizeError;
use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::fmt;

/// Timestamped stdout logger, `[2024-01-02 03:04:05] INFO message`.
pub struct StdoutLogger {
    level: LevelFilter,
}

impl StdoutLogger {
    pub fn new(level: LevelFilter) -> Self {
        StdoutLogger { level }
    }
}

impl log::Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            emit(record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn format_line(now: DateTime<Local>, level: Level, args: &fmt::Arguments) -> String {
    format!("[{}] {} {}", now.format("%Y-%m-%d %H:%M:%S"), level, args)
}

fn emit(level: Level, args: &fmt::Arguments) {
    println!("{}", format_line(Local::now(), level, args));
}

pub fn info(args: fmt::Arguments) {
    emit(Level::Info, &args);
}

pub fn warn(args: fmt::Arguments) {
    emit(Level::Warn, &args);
}

pub fn error(args: fmt::Arguments) {
    emit(Level::Error, &args);
}

/// Prints straight to stdout in the [`StdoutLogger`] format, whether or not a `log` backend
/// is installed.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::error(format_args!($($arg)*))
    };
}

/// Installs [`StdoutLogger`] as the global `log` backend. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), MemoizeError> {
    log::set_boxed_logger(Box::new(StdoutLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use log::Log;

    #[test]
    fn line_format() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_line(at, Level::Warn, &format_args!("cache {}", "miss")), "[2024-01-02 03:04:05] WARN cache miss");
    }

    #[test]
    fn level_filtering() {
        let logger = StdoutLogger::new(LevelFilter::Info);
        assert!(logger.enabled(&Metadata::builder().level(Level::Warn).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Trace).build()));
    }

    #[test]
    fn convenience_macros_print_without_backend() {
        crate::info!("built {} wrappers", 2);
        crate::warn!("key for {:?} is not encodable", "opaque");
        crate::error!("done");
    }
}
