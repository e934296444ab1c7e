use crate::analysis::AspectBins;
use crate::error::{HarvestError, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub fetcher: FetcherConfig,
    pub aspect: AspectConfig,
    pub pixel_art: PixelArtConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub poll_interval_ms: u64,
    /// Upper bound handed to the fetcher. The supervisor enforces the real stop.
    pub fetch_cap: u32,
}

/// External crawler invocation. `{keyword}`, `{output_dir}` and `{max_count}`
/// in `args` are substituted per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectConfig {
    pub edges: Vec<f64>,
    /// Append an unbounded last bucket above the final edge.
    pub open_ended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelArtConfig {
    pub pixel_size: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            fetch_cap: 10_000,
        }
    }
}

impl AcquisitionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: "image-crawler".to_string(),
            args: vec![
                "--keyword".to_string(),
                "{keyword}".to_string(),
                "--output".to_string(),
                "{output_dir}".to_string(),
                "--max".to_string(),
                "{max_count}".to_string(),
            ],
        }
    }
}

impl Default for AspectConfig {
    fn default() -> Self {
        Self {
            edges: vec![0.0, 0.5, 1.0, 1.5, 2.0, 3.0, 5.0],
            open_ended: true,
        }
    }
}

impl AspectConfig {
    pub fn bins(&self) -> Result<AspectBins> {
        let mut edges = self.edges.clone();
        if self.open_ended {
            edges.push(f64::INFINITY);
        }
        AspectBins::new(edges)
    }
}

impl Default for PixelArtConfig {
    fn default() -> Self {
        Self { pixel_size: 10 }
    }
}

impl Config {
    /// Load from TOML, or JSON when the content starts with `{`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| HarvestError::unavailable("read config file", path, e))?;

        if content.trim_start().starts_with('{') {
            serde_json::from_str(&content).map_err(|e| HarvestError::Config(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| HarvestError::Config(e.to_string()))
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> Result<()> {
        let path = path.as_ref();
        let content = match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| HarvestError::Config(e.to_string()))?
            }
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| HarvestError::Config(e.to_string()))?
            }
        };

        fs::write(path, content).map_err(|e| HarvestError::unavailable("write config file", path, e))
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.acquisition.poll_interval_ms == 0 {
            errors.push("acquisition.poll_interval_ms must be positive".to_string());
        }

        if self.acquisition.fetch_cap == 0 {
            errors.push("acquisition.fetch_cap must be positive".to_string());
        }

        if self.fetcher.program.trim().is_empty() {
            errors.push("fetcher.program must not be empty".to_string());
        }

        if let Err(e) = self.aspect.bins() {
            errors.push(format!("aspect.edges: {}", e));
        }

        if self.pixel_art.pixel_size == 0 {
            errors.push("pixel_art.pixel_size must be positive".to_string());
        }

        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// Load and validate the configuration at `config_path`, or the defaults when none is given.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    config
        .validate()
        .map_err(|errors| HarvestError::Config(errors.join("; ")))?;

    Ok(config)
}
