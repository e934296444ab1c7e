use async_trait::async_trait;
use image_harvest::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Writes one file per tick until `max_count` files exist.
struct TickingFetcher {
    interval: Duration,
    calls: AtomicUsize,
    seen: Mutex<Option<(String, u32)>>,
}

impl TickingFetcher {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ImageFetcher for TickingFetcher {
    fn name(&self) -> &str {
        "ticking"
    }

    async fn fetch(&self, keyword: &str, destination: &Path, max_count: u32) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some((keyword.to_string(), max_count));

        for i in 0..max_count {
            tokio::time::sleep(self.interval).await;
            let _ = std::fs::write(destination.join(format!("{:06}.jpg", i)), b"jpeg");
        }
        Ok(())
    }
}

/// Returns immediately without writing anything.
struct IdleFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageFetcher for IdleFetcher {
    fn name(&self) -> &str {
        "idle"
    }

    async fn fetch(&self, _keyword: &str, _destination: &Path, _max_count: u32) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingFetcher;

#[async_trait]
impl ImageFetcher for FailingFetcher {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self, _keyword: &str, _destination: &Path, _max_count: u32) -> Result<()> {
        Err(HarvestError::Fetch("search engine unreachable".to_string()))
    }
}

fn idle() -> Arc<IdleFetcher> {
    Arc::new(IdleFetcher { calls: AtomicUsize::new(0) })
}

#[test]
fn test_zero_min_items_rejected_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");

    let err = AcquisitionRequest::new("cat", &destination, 0, 10).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(!destination.exists());
}

#[test]
fn test_zero_time_budget_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");

    let err = AcquisitionRequest::new("cat", &destination, 5, 0).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(!destination.exists());
}

#[test]
fn test_request_accessors() {
    let request = AcquisitionRequest::new("pig", "/tmp/pigs", 50, 60).unwrap();
    assert_eq!(request.keyword(), "pig");
    assert_eq!(request.destination(), Path::new("/tmp/pigs"));
    assert_eq!(request.min_item_count(), 50);
    assert_eq!(request.time_budget(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_target_met_by_ticking_fetcher() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    // Writes land at 0.29, 0.58, 0.87, 1.16 and 1.45 s, clear of the poll ticks.
    let fetcher = Arc::new(TickingFetcher::new(Duration::from_millis(290)));
    let supervisor = AcquisitionSupervisor::new(fetcher.clone());

    let request = AcquisitionRequest::new("cat", &destination, 5, 2).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::TargetMet);
    assert_eq!(result.item_count, 5);
    assert!(result.elapsed_seconds >= 1.5, "elapsed {}", result.elapsed_seconds);
    assert!(result.elapsed_seconds < 2.0, "elapsed {}", result.elapsed_seconds);
    assert_eq!(result.keyword, "cat");

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        fetcher.seen.lock().unwrap().clone(),
        Some(("cat".to_string(), DEFAULT_FETCH_CAP))
    );
}

#[tokio::test(start_paused = true)]
async fn test_write_due_on_poll_tick_is_counted_by_that_poll() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    // The fifth write and the fourth poll both fall due at 1.5 s.
    let fetcher = Arc::new(TickingFetcher::new(Duration::from_millis(300)));
    let supervisor = AcquisitionSupervisor::new(fetcher);

    let request = AcquisitionRequest::new("cat", &destination, 5, 2).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::TargetMet);
    assert_eq!(result.item_count, 5);
    assert!((result.elapsed_seconds - 1.5).abs() < 0.01, "elapsed {}", result.elapsed_seconds);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded_when_nothing_arrives() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    let fetcher = idle();
    let supervisor = AcquisitionSupervisor::new(fetcher.clone());

    let request = AcquisitionRequest::new("cat", &destination, 5, 2).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::DeadlineExceeded);
    assert_eq!(result.item_count, 0);
    assert!(result.elapsed_seconds >= 2.0, "elapsed {}", result.elapsed_seconds);
    assert!(result.elapsed_seconds < 2.6, "elapsed {}", result.elapsed_seconds);
    assert!(destination.is_dir());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_prepopulated_directory_returns_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    std::fs::create_dir_all(&destination).unwrap();
    for i in 0..3 {
        std::fs::write(destination.join(format!("old_{}.png", i)), b"png").unwrap();
    }

    let supervisor = AcquisitionSupervisor::new(idle());
    let request = AcquisitionRequest::new("cat", &destination, 3, 30).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::TargetMet);
    assert!(result.item_count >= 3);
    assert!(result.elapsed_seconds < supervisor.poll_interval().as_secs_f64());
}

#[tokio::test(start_paused = true)]
async fn test_subdirectories_do_not_count_towards_target() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    std::fs::create_dir_all(destination.join("a")).unwrap();
    std::fs::create_dir_all(destination.join("b")).unwrap();

    let supervisor = AcquisitionSupervisor::new(idle());
    let request = AcquisitionRequest::new("cat", &destination, 2, 1).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::DeadlineExceeded);
    assert_eq!(result.item_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetcher_failure_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");

    let supervisor = AcquisitionSupervisor::new(Arc::new(FailingFetcher));
    let request = AcquisitionRequest::new("cat", &destination, 1, 1).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::DeadlineExceeded);
    assert_eq!(result.item_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_configured_cap_and_interval_are_used() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    let fetcher = Arc::new(TickingFetcher::new(Duration::from_millis(100)));
    let config = config::AcquisitionConfig {
        poll_interval_ms: 50,
        fetch_cap: 3,
    };
    let supervisor = AcquisitionSupervisor::with_config(fetcher.clone(), &config);
    assert_eq!(supervisor.poll_interval(), Duration::from_millis(50));

    // The fetcher stops at its cap, so the deadline ends the run.
    let request = AcquisitionRequest::new("dog", &destination, 10, 1).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    assert_eq!(result.stop_reason, StopReason::DeadlineExceeded);
    assert_eq!(result.item_count, 3);
    assert_eq!(fetcher.seen.lock().unwrap().clone(), Some(("dog".to_string(), 3)));
}

#[tokio::test]
async fn test_unwritable_destination_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("file.txt");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let supervisor = AcquisitionSupervisor::new(idle());
    let request = AcquisitionRequest::new("cat", blocker.join("imgs"), 1, 1).unwrap();
    let err = supervisor.acquire(&request).await.unwrap_err();

    assert!(err.is_resource_unavailable());
}

#[test]
fn test_command_fetcher_renders_placeholders() {
    let fetcher = CommandFetcher::from_config(&config::FetcherConfig::default());
    let args = fetcher.render_args("red panda", Path::new("/data/pandas"), 10_000);

    assert_eq!(
        args,
        vec!["--keyword", "red panda", "--output", "/data/pandas", "--max", "10000"]
    );
}

#[tokio::test]
async fn test_command_fetcher_reports_missing_program() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = CommandFetcher::new("definitely-not-an-installed-crawler", vec![]);

    let err = fetcher.fetch("cat", temp_dir.path(), 1).await.unwrap_err();
    assert!(matches!(err, HarvestError::Fetch(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_fetcher_reports_non_zero_exit() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = CommandFetcher::new("false", vec![]);

    let err = fetcher.fetch("cat", temp_dir.path(), 1).await.unwrap_err();
    assert!(matches!(err, HarvestError::Fetch(_)));
}

#[tokio::test]
async fn test_result_serializes_for_summary() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("imgs");
    std::fs::create_dir_all(&destination).unwrap();
    std::fs::write(destination.join("a.jpg"), b"a").unwrap();

    let supervisor = AcquisitionSupervisor::new(idle());
    let request = AcquisitionRequest::new("cat", &destination, 1, 5).unwrap();
    let result = supervisor.acquire(&request).await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["stop_reason"], "target_met");
    assert_eq!(json["item_count"], 1);
    assert_eq!(json["keyword"], "cat");
}
