//! Cron scheduler for the periodic sweep.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info};

use drivehub_core::config::WorkerConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;

use crate::sweep::Sweep;

/// Upper bound on the orphan retention window (about a century).
const MAX_RETENTION_HOURS: u64 = 24 * 365 * 100;

type SweepRun = Pin<Box<dyn Future<Output = AppResult<()>> + Send>>;

/// Cron-based scheduler running both sweep passes.
pub struct CronScheduler {
    scheduler: JobScheduler,
    sweep: Arc<Sweep>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish_non_exhaustive()
    }
}

impl CronScheduler {
    /// Create a scheduler for `sweep`. Nothing runs until [`start`](Self::start).
    pub async fn new(sweep: Arc<Sweep>) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, sweep })
    }

    /// Register the purge and orphan passes on their configured schedules.
    pub async fn register_sweep_tasks(&self, config: &WorkerConfig) -> AppResult<()> {
        self.register("purge_deleted", &config.purge_schedule, |sweep| {
            Box::pin(async move { sweep.purge_deleted().await.map(drop) })
        })
        .await?;

        let hours = config.orphan_retention_hours.min(MAX_RETENTION_HOURS);
        let retention = chrono::Duration::hours(i64::try_from(hours).unwrap_or(i64::MAX));
        self.register("purge_orphan_blobs", &config.orphan_schedule, move |sweep| {
            Box::pin(async move { sweep.purge_orphan_blobs(retention).await.map(drop) })
        })
        .await?;

        info!(retention_hours = hours, "Sweep tasks registered");
        Ok(())
    }

    /// Start running registered jobs.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Sweep scheduler started");
        Ok(())
    }

    /// Stop the scheduler. A pass already running is not interrupted.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;

        info!("Sweep scheduler shut down");
        Ok(())
    }

    async fn register<F>(&self, task: &'static str, schedule: &str, run: F) -> AppResult<()>
    where
        F: Fn(Arc<Sweep>) -> SweepRun + Send + Sync + 'static,
    {
        let sweep = Arc::clone(&self.sweep);
        let run = Arc::new(run);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let sweep = Arc::clone(&sweep);
            let run = Arc::clone(&run);
            Box::pin(async move {
                debug!(task, "Scheduled sweep pass starting");
                if let Err(e) = (*run)(sweep).await {
                    error!(task, error = %e, "Scheduled sweep pass failed");
                }
            })
        })
        .map_err(|e| AppError::configuration(format!("Invalid {task} schedule '{schedule}': {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {task} job: {e}")))?;

        info!(task, schedule, "Sweep task registered");
        Ok(())
    }
}
