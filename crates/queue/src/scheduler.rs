//! Scheduled jobs for periodic maintenance tasks.

use std::sync::Arc;
use std::time::Duration;

use tierboard_core::SnapshotService;
use tokio::time::interval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between snapshot passes (default: 5 minutes).
    pub snapshot_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: Duration::from_secs(300),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Freeze the previous day's standings for every active poll.
    async fn run_snapshot(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Executor backed by the snapshot service.
pub struct SnapshotJob {
    service: SnapshotService,
}

impl SnapshotJob {
    /// Create a new snapshot job.
    #[must_use]
    pub const fn new(service: SnapshotService) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl JobExecutor for SnapshotJob {
    async fn run_snapshot(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let summary = self.service.run().await?;
        if summary.snapshotted > 0 || summary.failed > 0 {
            tracing::info!(
                snapshotted = summary.snapshotted,
                failed = summary.failed,
                "snapshot pass complete"
            );
        }
        Ok(())
    }
}

/// Run the scheduler with the given configuration and executor.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let snapshot_interval = config.snapshot_interval;

    tokio::spawn(async move {
        let mut interval = interval(snapshot_interval);
        loop {
            interval.tick().await;
            if let Err(e) = executor.run_snapshot().await {
                tracing::error!(error = %e, "snapshot pass failed");
            }
        }
    });
}
