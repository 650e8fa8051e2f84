//! Background scheduler for the weekly team bonus sweep.

use anyhow::Result;
use chrono::{Datelike, Weekday};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::constants::bonus::REQUIRED_TEAM_SIZE;
use crate::state::SharedState;

pub struct Scheduler {
    state: SharedState,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: SharedState, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        let cron_expr = self.config.bonus_sweep_cron.clone();
        match self.run_with_cron(&cron_expr).await {
            Ok(()) => Ok(()),
            Err(e) if self.config.sweep_interval_minutes > 0 => {
                warn!(
                    "Cron schedule '{}' failed ({e}); falling back to interval sweep",
                    self.config.bonus_sweep_cron
                );
                self.run_with_interval().await
            }
            Err(e) => Err(e),
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let state = self.state.clone();
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = state.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = sweep_teams(&state).await {
                    error!("Scheduled bonus sweep failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    /// Fallback sweep loop. The cron path only fires on the configured
    /// weekday; here the weekday gate lives in the loop so evaluation itself
    /// stays date-agnostic.
    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.sweep_interval_minutes;

        info!("Scheduler running every {} minutes", interval_mins);

        let mut sweep_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            sweep_interval.tick().await;

            if !*self.running.read().await {
                break;
            }

            if chrono::Utc::now().weekday() != Weekday::Wed {
                continue;
            }

            if let Err(e) = sweep_teams(&self.state).await {
                error!("Scheduled bonus sweep failed: {}", e);
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Manual trigger, used by the CLI. No weekday gate: the caller decided.
    pub async fn run_once(&self) -> Result<SweepStats> {
        info!("Running manual bonus sweep...");
        sweep_teams(&self.state).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub evaluated: usize,
    pub awarded: usize,
    pub skipped: usize,
}

/// Evaluate today's bonus for every full-roster team. Per-team failures are
/// logged and don't abort the sweep.
async fn sweep_teams(state: &SharedState) -> Result<SweepStats> {
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let teams = state.store.list_teams().await?;

    let mut stats = SweepStats::default();

    for team in teams {
        let members = state.store.team_member_count(&team.id).await?;
        if members != REQUIRED_TEAM_SIZE as u64 {
            stats.skipped += 1;
            continue;
        }

        stats.evaluated += 1;

        match state.bonus_service.evaluate(&team.id, &today).await {
            Ok(outcome) if outcome.achieved => {
                stats.awarded += 1;
                info!("Sweep: team '{}' — {}", team.name, outcome.message);
            }
            Ok(outcome) => {
                info!("Sweep: team '{}' — {}", team.name, outcome.message);
            }
            Err(e) => {
                error!("Sweep: evaluating team '{}' failed: {}", team.name, e);
            }
        }
    }

    info!(
        "Bonus sweep finished: {} evaluated, {} awarded, {} skipped",
        stats.evaluated, stats.awarded, stats.skipped
    );

    Ok(stats)
}
