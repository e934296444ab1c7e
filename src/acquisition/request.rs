use crate::error::{HarvestError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A validated acquisition run description.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    keyword: String,
    destination: PathBuf,
    min_item_count: usize,
    time_budget: Duration,
}

impl AcquisitionRequest {
    /// Fails with `InvalidArgument` when `min_item_count` or `time_budget_secs` is zero.
    pub fn new(
        keyword: impl Into<String>,
        destination: impl Into<PathBuf>,
        min_item_count: usize,
        time_budget_secs: u64,
    ) -> Result<Self> {
        validate_positive(min_item_count as u64, "min_item_count")?;
        validate_positive(time_budget_secs, "time_budget")?;

        Ok(Self {
            keyword: keyword.into(),
            destination: destination.into(),
            min_item_count,
            time_budget: Duration::from_secs(time_budget_secs),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn min_item_count(&self) -> usize {
        self.min_item_count
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }
}

fn validate_positive(value: u64, name: &str) -> Result<()> {
    if value == 0 {
        return Err(HarvestError::invalid_argument(format!(
            "'{}' must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Which stopping condition ended the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetMet,
    DeadlineExceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionResult {
    pub keyword: String,
    pub item_count: usize,
    pub elapsed_seconds: f64,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
}
