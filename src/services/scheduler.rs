//! Background scheduler driving the periodic news ingestion and the expiry
//! sweeps. Each tick runs a single-shot job; cancellation happens by task
//! abort at shutdown.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
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

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = refresh_news(&state).await {
                    error!("Scheduled news refresh failed: {}", e);
                }
            })
        })?;

        let sweep_state = Arc::clone(&self.state);
        let sweep_job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
            let state = Arc::clone(&sweep_state);
            Box::pin(async move {
                if let Err(e) = run_expiry_sweep(&state).await {
                    error!("Scheduled expiry sweep failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.add(sweep_job).await?;
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

    async fn run_with_interval(&self) -> Result<()> {
        let news_mins = self.config.news_interval_minutes;
        let sweep_hours = self.config.expiry_sweep_hours;

        info!(
            "Scheduler running: news every {} min, expiry sweep every {} h",
            news_mins, sweep_hours
        );

        let mut news_interval = interval(Duration::from_secs(u64::from(news_mins) * 60));

        let mut sweep_interval = interval(Duration::from_secs(u64::from(sweep_hours) * 3600));

        loop {
            tokio::select! {
                _ = news_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if let Err(e) = refresh_news(&self.state).await {
                        error!("Scheduled news refresh failed: {}", e);
                    }
                }
                _ = sweep_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if let Err(e) = run_expiry_sweep(&self.state).await {
                        error!("Scheduled expiry sweep failed: {}", e);
                    }
                }
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

    pub async fn run_once(&self) -> Result<()> {
        info!("Running manual check...");

        refresh_news(&self.state).await?;
        run_expiry_sweep(&self.state).await?;

        Ok(())
    }
}

async fn refresh_news(state: &SharedState) -> Result<()> {
    let stats = state
        .news_service
        .refresh()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if stats.new_articles > 0 {
        info!("Ingested {} new articles", stats.new_articles);
    }
    Ok(())
}

async fn run_expiry_sweep(state: &SharedState) -> Result<()> {
    let removed = state
        .news_service
        .prune_expired()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let tokens = state.store.prune_expired_email_tokens().await?;

    info!(
        "Expiry sweep complete: {} articles, {} email tokens removed",
        removed, tokens
    );
    Ok(())
}
