//! Logging for Strata GFX
//!
//! Every entry goes through one process-wide `Logger`, colored console
//! output unless replaced with `set_logger`. Entries below the minimum
//! severity (Info unless changed) are dropped before reaching it. ERROR
//! entries raised through the macros carry the file and line they come from.

use colored::*;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for log entries
///
/// Installed globally with `set_logger`. Called from whichever thread logs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Mutex;
/// use strata_gfx::strata::log::{Logger, LogEntry, set_logger};
///
/// struct Collect(Mutex<Vec<String>>);
///
/// impl Logger for Collect {
///     fn log(&self, entry: &LogEntry) {
///         self.0.lock().unwrap().push(entry.message.clone());
///     }
/// }
///
/// set_logger(Collect(Mutex::new(Vec::new())));
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "strata::GraphicsBuffer" or "strata::soft"
    pub source: String,
    pub message: String,
    /// Set for ERROR entries raised through `engine_error!`
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-call detail: binds, maps, copies
    Trace,
    /// Object lifecycle: realize, release, skipped views
    Debug,
    /// Context and driver creation
    Info,
    Warn,
    /// Failed operations, with file:line
    Error,
}

impl LogSeverity {
    /// Five-column label used by the console logger
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }

    fn from_u8(value: u8) -> Self {
        [LogSeverity::Trace, LogSeverity::Debug, LogSeverity::Info, LogSeverity::Warn]
            .get(value as usize)
            .copied()
            .unwrap_or(LogSeverity::Error)
    }
}

/// Console logger
///
/// Prints `[time] [SEVERITY] [source] message`, followed by `(file:line)`
/// when the entry has a location.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let time: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            time.format("%H:%M:%S%.3f"),
            entry.severity.colored_label(),
            entry.source.bright_blue(),
            entry.message,
        );
        if let (Some(file), Some(number)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, number));
        }
        println!("{}", line);
    }
}

// ===== GLOBAL LOGGER =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(LogSeverity::Info as u8);

fn global() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// A logger that panicked while being replaced poisons the lock; the slot
// itself is still a valid logger, so keep using it.
fn install(logger: Box<dyn Logger>) {
    let mut slot = global().write().unwrap_or_else(PoisonError::into_inner);
    *slot = logger;
}

/// Replace the global logger
pub fn set_logger<L: Logger + 'static>(logger: L) {
    install(Box::new(logger));
}

/// Go back to the console logger
pub fn reset_logger() {
    install(Box::new(DefaultLogger));
}

/// Drop entries below `severity`
pub fn set_min_severity(severity: LogSeverity) {
    MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
}

pub fn min_severity() -> LogSeverity {
    LogSeverity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
}

/// Log without a source location (backs the level macros)
pub fn log(severity: LogSeverity, source: &str, message: String) {
    dispatch(severity, source, message, None);
}

/// Log with a source location (backs `engine_error!`)
pub fn log_detailed(severity: LogSeverity, source: &str, message: String, file: &'static str, line: u32) {
    dispatch(severity, source, message, Some((file, line)));
}

fn dispatch(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
    if severity < min_severity() {
        return;
    }
    let entry = LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: location.map(|(file, _)| file),
        line: location.map(|(_, line)| line),
    };
    global().read().unwrap_or_else(PoisonError::into_inner).log(&entry);
}

// ===== MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::$severity, $source, format!($($arg)*))
    };
}

/// Log at TRACE
///
/// ```no_run
/// strata_gfx::engine_trace!("strata::GraphicsBuffer", "bind {:?}", 3);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// Log at DEBUG
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

/// Log at INFO
///
/// ```no_run
/// strata_gfx::engine_info!("strata::DeviceContext", "Device context created");
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

/// Log at WARN
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Log at ERROR with the caller's file and line
///
/// ```no_run
/// strata_gfx::engine_error!("strata::GraphicsBuffer", "Unmap failed: {}", "lost");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        )
    };
}

/// Log an error value at ERROR and evaluate to it
///
/// ```no_run
/// use strata_gfx::strata::Error;
///
/// let err = strata_gfx::engine_err!("strata::GraphicsBuffer", Error::OutOfMemory);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $error:expr) => {{
        let error = $error;
        $crate::engine_error!($source, "{}", error);
        error
    }};
}

/// Log an error value and return it from the enclosing function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $error:expr) => {
        return Err($crate::engine_err!($source, $error))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
