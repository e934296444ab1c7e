//! Image fetcher abstraction.
//!
//! A fetcher fills a directory with images for a keyword. The supervisor only
//! watches the directory, so implementations are free to write files in any
//! order and at any pace.

use crate::config::FetcherConfig;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Download up to `max_count` images for `keyword` into `destination`.
    async fn fetch(&self, keyword: &str, destination: &Path, max_count: u32) -> Result<()>;
}

/// Runs an external crawler program as a child process.
///
/// The child is killed if the fetch future is dropped, so an abandoned
/// fetch task does not outlive the runtime.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Argument list with placeholders filled in.
    pub fn render_args(&self, keyword: &str, destination: &Path, max_count: u32) -> Vec<String> {
        let output_dir = destination.to_string_lossy();
        let max_count = max_count.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{keyword}", keyword)
                    .replace("{output_dir}", &output_dir)
                    .replace("{max_count}", &max_count)
            })
            .collect()
    }
}

#[async_trait]
impl ImageFetcher for CommandFetcher {
    fn name(&self) -> &str {
        &self.program
    }

    async fn fetch(&self, keyword: &str, destination: &Path, max_count: u32) -> Result<()> {
        let args = self.render_args(keyword, destination, max_count);
        tracing::debug!(program = %self.program, ?args, "Launching crawler");

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HarvestError::Fetch(format!("failed to launch '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarvestError::Fetch(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
