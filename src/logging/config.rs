//! Logging configuration
//!
//! Log level, console output and the optional rolling JSON log file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    pub global_level: String,

    /// Enable console output
    pub console_output: bool,

    /// Directory for log files (None = no file logging)
    pub log_directory: Option<PathBuf>,

    /// File name prefix for the daily log file
    pub file_prefix: String,

    /// Include file location in console logs
    pub include_file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: "info".to_string(),
            console_output: true,
            log_directory: None,
            file_prefix: "harvest.log".to_string(),
            include_file_location: false,
        }
    }
}

impl LoggingConfig {
    /// Raise the global level according to a `-v` count. Never lowers it.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let requested = match verbose {
            0 => return self,
            1 => "debug",
            _ => "trace",
        };
        if level_rank(requested) < level_rank(&self.global_level) {
            self.global_level = requested.to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !VALID_LEVELS.contains(&self.global_level.as_str()) {
            return Err(format!(
                "Invalid global_level: {}. Must be one of: {:?}",
                self.global_level, VALID_LEVELS
            ));
        }

        if self.file_prefix.trim().is_empty() {
            return Err("file_prefix must not be empty".to_string());
        }

        Ok(())
    }
}

fn level_rank(level: &str) -> usize {
    VALID_LEVELS
        .iter()
        .position(|l| *l == level)
        .unwrap_or(VALID_LEVELS.len())
}
