use super::fetcher::ImageFetcher;
use super::request::{AcquisitionRequest, AcquisitionResult, StopReason};
use crate::config::AcquisitionConfig;
use crate::data::count_regular_files;
use crate::error::{HarvestError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_FETCH_CAP: u32 = 10_000;

/// Drives one fetcher against a destination directory and decides when to stop.
///
/// The fetcher runs as a detached task. The supervisor only observes how many
/// files have landed in the destination and ends the run when the target
/// count is reached or the time budget runs out, whichever comes first.
pub struct AcquisitionSupervisor {
    fetcher: Arc<dyn ImageFetcher>,
    poll_interval: Duration,
    fetch_cap: u32,
}

impl AcquisitionSupervisor {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_cap: DEFAULT_FETCH_CAP,
        }
    }

    pub fn with_config(fetcher: Arc<dyn ImageFetcher>, config: &AcquisitionConfig) -> Self {
        Self {
            fetcher,
            poll_interval: config.poll_interval(),
            fetch_cap: config.fetch_cap,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn acquire(&self, request: &AcquisitionRequest) -> Result<AcquisitionResult> {
        let span = tracing::info_span!(
            "acquisition",
            run_id = %Uuid::new_v4(),
            keyword = request.keyword(),
            destination = %request.destination().display()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &AcquisitionRequest) -> Result<AcquisitionResult> {
        let destination = request.destination();
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| HarvestError::unavailable("create directory", destination, e))?;

        let fetch_task = {
            let fetcher = Arc::clone(&self.fetcher);
            let keyword = request.keyword().to_string();
            let destination = destination.to_path_buf();
            let cap = self.fetch_cap;
            tokio::spawn(
                async move {
                    match fetcher.fetch(&keyword, &destination, cap).await {
                        Ok(()) => tracing::debug!(fetcher = fetcher.name(), "Fetcher finished"),
                        Err(e) => tracing::warn!(fetcher = fetcher.name(), error = %e, "Fetcher failed"),
                    }
                }
                .in_current_span(),
            )
        };

        let started_at = chrono::Utc::now();
        let start = Instant::now();
        tracing::info!(
            min_items = request.min_item_count(),
            budget_secs = request.time_budget().as_secs(),
            "Starting image acquisition"
        );

        let mut fetch_finish_logged = false;
        let stop_reason = loop {
            // Let a fetch write that fell due on the same tick land before counting.
            tokio::task::yield_now().await;
            let current_count = lenient_count(destination).await;
            let elapsed = start.elapsed();

            if current_count >= request.min_item_count() {
                tracing::info!(count = current_count, "Target item count reached");
                break StopReason::TargetMet;
            }

            if elapsed >= request.time_budget() {
                tracing::info!(count = current_count, "Time budget exhausted, stopping acquisition");
                break StopReason::DeadlineExceeded;
            }

            if !fetch_finish_logged && fetch_task.is_finished() {
                tracing::debug!(count = current_count, "Fetch task ended before a stop condition");
                fetch_finish_logged = true;
            }

            tracing::trace!(count = current_count, elapsed_ms = elapsed.as_millis() as u64, "Poll");
            tokio::time::sleep(self.poll_interval).await;
        };

        // Detach: the fetcher may keep writing after we return.
        drop(fetch_task);

        let item_count = lenient_count(destination).await;
        let elapsed_seconds = start.elapsed().as_secs_f64();
        tracing::info!(item_count, elapsed_seconds, ?stop_reason, "Acquisition finished");

        Ok(AcquisitionResult {
            keyword: request.keyword().to_string(),
            item_count,
            elapsed_seconds,
            stop_reason,
            started_at,
        })
    }
}

/// A listing failure during concurrent writes is treated as an empty directory.
/// The listing runs on the blocking pool so a large destination does not stall the fetch task.
async fn lenient_count(dir: &Path) -> usize {
    let owned = dir.to_path_buf();
    match tokio::task::spawn_blocking(move || count_regular_files(&owned)).await {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not read directory, counting 0 files");
            0
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Directory count task failed, counting 0 files");
            0
        }
    }
}
