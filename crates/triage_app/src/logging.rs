//! Logging initialization for triage_app.
//!
//! Writes logs to `./triage.log` in the current working directory so the
//! terminal stays free for the UI.

use std::fs::File;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
#[allow(dead_code)]
pub enum LogDestination {
    /// Write to ./triage.log in current directory.
    File,
    /// Write to terminal (stdout).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the logger with the specified destination.
pub fn initialize(destination: LogDestination) {
    let level = LevelFilter::Info;

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![create_term_logger(level)],
        LogDestination::Both => {
            let mut loggers = vec![create_term_logger(level)];
            if let Some(file_logger) = create_file_logger(level) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    // Ignore the error if a logger was already initialized.
    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new().set_time_format_rfc3339().build()
}

fn create_term_logger(level: LevelFilter) -> Box<dyn SharedLogger> {
    TermLogger::new(
        level,
        build_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}

fn create_file_logger(level: LevelFilter) -> Option<Box<dyn SharedLogger>> {
    match File::create("triage.log") {
        Ok(file) => Some(WriteLogger::new(level, build_config(), file)),
        Err(_) => None,
    }
}
