#![deny(missing_docs)]
//! Shared logging utilities for the reelgrab workspace.
//!
//! This crate provides the `rg_*` logging macros used across the codebase,
//! the logger initialisation used by the binary, and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// Log target shared by every `rg_*` macro.
pub const LOG_TARGET: &str = "reelgrab";

/// Default log file, relative to the current working directory.
pub const LOG_FILE: &str = "./reelgrab.log";

/// Logs a trace-level message under the `reelgrab` target.
#[macro_export]
macro_rules! rg_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the `reelgrab` target.
#[macro_export]
macro_rules! rg_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the `reelgrab` target.
#[macro_export]
macro_rules! rg_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the `reelgrab` target.
#[macro_export]
macro_rules! rg_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the `reelgrab` target.
#[macro_export]
macro_rules! rg_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Destination for operational log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to `./reelgrab.log` in the current directory.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger with the given destination and level.
///
/// Silently keeps an already-installed logger. A file that cannot be
/// created degrades to whatever other destination was requested.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(Path::new(LOG_FILE), level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(Path::new(LOG_FILE), level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
