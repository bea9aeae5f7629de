use crate::core::controller::PageController;
use crate::core::{html, page};
use crate::domain::model::DomPatch;
use crate::domain::ports::{ConfigProvider, PageFetcher};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(500);

/// Re-fetches the current page on a fixed period and mirrors changed stat
/// values into the page state.
pub struct DashboardPoller<F: PageFetcher + ?Sized> {
    fetcher: Arc<F>,
    controller: PageController,
    poll_interval: Duration,
    pulse_duration: Duration,
}

impl<F: PageFetcher + ?Sized + 'static> DashboardPoller<F> {
    pub fn new(fetcher: Arc<F>, controller: PageController) -> Self {
        Self {
            fetcher,
            controller,
            poll_interval: DEFAULT_POLL_INTERVAL,
            pulse_duration: DEFAULT_PULSE_DURATION,
        }
    }

    pub fn from_config<C: ConfigProvider>(
        fetcher: Arc<F>,
        controller: PageController,
        config: &C,
    ) -> Self {
        Self {
            fetcher,
            controller,
            poll_interval: config.poll_interval(),
            pulse_duration: config.pulse_duration(),
        }
    }

    /// One refresh. Returns the patches that were applied.
    pub async fn poll_once(&self) -> Result<Vec<DomPatch>> {
        let url = self.controller.url().await?;
        let body = self.fetcher.fetch_page(&url).await?;
        let fresh = html::extract_stats(&body)?;

        let applied = self
            .controller
            .update(|state| page::diff_stats(&state.stats, &fresh))
            .await;

        for patch in &applied {
            if let DomPatch::SetStatText { index, text } = patch {
                tracing::info!("📈 Stat #{} changed to {}", index, text.trim());
            }
        }

        let endings = page::pulse_endings(&applied);
        if !endings.is_empty() {
            let controller = self.controller.clone();
            let pulse = self.pulse_duration;
            tokio::spawn(async move {
                sleep(pulse).await;
                controller.apply(endings).await;
            });
        }

        Ok(applied)
    }

    /// Polls until the task is dropped or aborted. Pages without a
    /// dashboard container are left alone. Failed refreshes are logged and
    /// the next tick proceeds as usual.
    pub async fn run(self) {
        if !self.controller.state().await.has_dashboard {
            tracing::info!("No dashboard on this page, refresh disabled");
            return;
        }

        // first refresh happens one full period after start
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("🔄 Dashboard refresh every {:?}", self.poll_interval);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(applied) if applied.is_empty() => tracing::debug!("Dashboard unchanged"),
                Ok(_) => {}
                Err(e) => tracing::warn!("Dashboard refresh failed: {}", e),
            }
        }
    }
}
