//! Periodic sweep of expired captchas and idle rate-limiter entries

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::{rate_limiter::RateLimiter, repositories::CaptchaRepository};

/// Runs every minute unless `CAPTCHA_SWEEP_SCHEDULE` says otherwise
pub const DEFAULT_SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Clears expired captchas and stale limiter state on a cron schedule
#[derive(Clone)]
pub struct CaptchaSweeper {
    captcha_repository: CaptchaRepository,
    limiters: Vec<RateLimiter>,
}

impl CaptchaSweeper {
    pub fn new(captcha_repository: CaptchaRepository, limiters: Vec<RateLimiter>) -> Self {
        Self {
            captcha_repository,
            limiters,
        }
    }

    /// One sweep pass
    pub async fn sweep(&self) -> Result<u64> {
        let purged = self.captcha_repository.purge_expired().await?;
        if purged > 0 {
            info!("Purged {} expired captchas", purged);
        }

        for limiter in &self.limiters {
            limiter.purge_idle().await;
        }

        Ok(purged)
    }

    /// Register the sweep with a scheduler and start it
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let sweeper = self.clone();
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                if let Err(e) = sweeper.sweep().await {
                    error!("Captcha sweep failed: {}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started captcha sweeper with schedule: {}", schedule);
        Ok(scheduler)
    }
}
