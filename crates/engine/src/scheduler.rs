//! # Maintenance Scheduler
//!
//! Registers the recurring maintenance triggers against the configured
//! civil time zone and runs the startup repair pass.
//!
//! Three independent daily triggers fire in-zone: the composed refresh
//! (window + retirement + reclamation), a standalone retirement pass,
//! and a standalone reclamation pass. Trigger times are carried as
//! [`JobTime`] data; the cron expressions handed to
//! `tokio-cron-scheduler` are derived, never configured directly.
//!
//! Every triggered run is fire-and-forget: it is wrapped in a timeout,
//! and a failing or timed-out run is logged without unregistering or
//! crashing the trigger.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use eyre::{eyre, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::{EngineConfig, JobTime};
use crate::maintainer::WindowMaintainer;

/// Upper bound on a single triggered run.
const JOB_TIMEOUT: Duration = Duration::from_secs(600);

/// Trigger times and zone for the recurring jobs.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub timezone: Tz,
    pub refresh_at: JobTime,
    pub retire_at: JobTime,
    pub reclaim_at: JobTime,
}

impl From<&EngineConfig> for ScheduleConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timezone: config.timezone,
            refresh_at: config.refresh_at,
            retire_at: config.retire_at,
            reclaim_at: config.reclaim_at,
        }
    }
}

/// Owns the cron scheduler and the maintainer handle it drives.
pub struct MaintenanceScheduler {
    scheduler: Option<JobScheduler>,
    maintainer: Arc<WindowMaintainer>,
    config: ScheduleConfig,
}

impl MaintenanceScheduler {
    pub fn new(maintainer: Arc<WindowMaintainer>, config: ScheduleConfig) -> Self {
        Self {
            scheduler: None,
            maintainer,
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Startup entry point: repairs drift accumulated while the process
    /// was down (reclaim, then retire), ensures the forward window, and
    /// only then registers and starts the recurring triggers.
    ///
    /// Failures inside the repair runs are logged and absorbed; a
    /// failure to register or start the triggers is returned.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(eyre!("Maintenance scheduler is already running"));
        }

        info!("Running startup maintenance pass");
        if let Err(err) = self.maintainer.reclaim_orphaned_appointments().await {
            error!(error = %err, "Startup reclamation failed");
        }
        if let Err(err) = self
            .maintainer
            .retire_stale_unbooked(self.maintainer.retention_days())
            .await
        {
            error!(error = %err, "Startup retirement failed");
        }
        if let Err(err) = self
            .maintainer
            .ensure_window(self.maintainer.window_days())
            .await
        {
            error!(error = %err, "Startup window materialization failed");
        }

        let scheduler = self.build_scheduler().await?;
        scheduler
            .start()
            .await
            .map_err(|e| eyre!("Failed to start maintenance scheduler: {e}"))?;
        self.scheduler = Some(scheduler);

        info!(
            timezone = %self.config.timezone,
            "Maintenance scheduler started with daily triggers"
        );
        Ok(())
    }

    /// Stops the recurring triggers.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Ok(());
        };
        scheduler
            .shutdown()
            .await
            .map_err(|e| eyre!("Failed to shut down maintenance scheduler: {e}"))?;
        info!("Maintenance scheduler stopped");
        Ok(())
    }

    async fn build_scheduler(&self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| eyre!("Failed to create job scheduler: {e}"))?;

        let refresh = {
            let maintainer = self.maintainer.clone();
            self.daily_job(self.config.refresh_at, "refresh", move || {
                let maintainer = maintainer.clone();
                async move {
                    let summary = maintainer.refresh().await;
                    info!(
                        created = summary.slots_created,
                        retired = summary.slots_retired,
                        freed = summary.reclaimed.slots_freed,
                        removed = summary.reclaimed.appointments_removed,
                        "Daily refresh cycle finished"
                    );
                }
            })?
        };

        let retire = {
            let maintainer = self.maintainer.clone();
            self.daily_job(self.config.retire_at, "retire", move || {
                let maintainer = maintainer.clone();
                async move {
                    if let Err(err) = maintainer
                        .retire_stale_unbooked(maintainer.retention_days())
                        .await
                    {
                        error!(error = %err, "Scheduled retirement run failed");
                    }
                }
            })?
        };

        let reclaim = {
            let maintainer = self.maintainer.clone();
            self.daily_job(self.config.reclaim_at, "reclaim", move || {
                let maintainer = maintainer.clone();
                async move {
                    if let Err(err) = maintainer.reclaim_orphaned_appointments().await {
                        error!(error = %err, "Scheduled reclamation run failed");
                    }
                }
            })?
        };

        for job in [refresh, retire, reclaim] {
            scheduler
                .add(job)
                .await
                .map_err(|e| eyre!("Failed to register maintenance job: {e}"))?;
        }

        Ok(scheduler)
    }

    /// Builds one daily in-zone job around a run closure, with the
    /// shared timeout and catch-all logging.
    fn daily_job<F, Fut>(&self, at: JobTime, name: &'static str, run: F) -> Result<Job>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let expr = at.cron_expr();
        Job::new_async_tz(expr.as_str(), self.config.timezone, move |_id, _lock| {
            let run = run.clone();
            Box::pin(async move {
                match tokio::time::timeout(JOB_TIMEOUT, run()).await {
                    Ok(()) => {}
                    Err(_) => {
                        warn!(
                            job = name,
                            timeout_secs = JOB_TIMEOUT.as_secs(),
                            "Maintenance job timed out, will fire again on schedule"
                        );
                    }
                }
            })
        })
        .map_err(|e| eyre!("Failed to build {name} job: {e}"))
    }
}
