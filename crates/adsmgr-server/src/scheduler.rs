//! Background job scheduler.
//!
//! Runs the optimistic-overlay sweep. Expired overlays are already invisible
//! to readers; the sweep only frees their memory.

use std::time::Duration;

use adsmgr_state::OptimisticStore;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    store: OptimisticStore,
    sweep_interval_secs: u64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_sweep_job(&scheduler, store, sweep_interval_secs).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Fixed period between sweeps, measured from the previous run rather than
/// aligned to the wall-clock minute.
fn sweep_period(interval_secs: u64) -> Duration {
    Duration::from_secs(interval_secs.max(1))
}

async fn register_sweep_job(
    scheduler: &JobScheduler,
    store: OptimisticStore,
    interval_secs: u64,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(sweep_period(interval_secs), move |_uuid, _lock| {
        let store = store.clone();
        Box::pin(async move {
            let removed = store.sweep_expired();
            tracing::debug!(removed, remaining = store.len(), "scheduler: overlay sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(interval_secs, "scheduler: registered overlay sweep");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_period_follows_configured_seconds() {
        assert_eq!(sweep_period(30), Duration::from_secs(30));
        assert_eq!(sweep_period(45), Duration::from_secs(45));
        assert_eq!(sweep_period(0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn sweep_job_registers_for_any_period() {
        for interval in [30, 45, 90] {
            let scheduler = JobScheduler::new().await.expect("scheduler");
            let store = OptimisticStore::new(Duration::from_secs(420));
            register_sweep_job(&scheduler, store, interval)
                .await
                .expect("repeated job should register");
        }
    }
}
