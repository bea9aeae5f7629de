use crate::core::controller::PageController;
use crate::core::page;
use crate::domain::ports::{PageFetcher, Storage};
use crate::utils::error::{ClientError, Result};
use chrono::Local;
use std::sync::Arc;
use url::Url;

/// Downloads export links while keeping the link's busy state honest: the
/// link stays busy exactly as long as its request is in flight.
pub struct ExportClient<F: PageFetcher + ?Sized, S: Storage> {
    fetcher: Arc<F>,
    storage: S,
    controller: PageController,
}

impl<F: PageFetcher + ?Sized, S: Storage> ExportClient<F, S> {
    pub fn new(fetcher: Arc<F>, storage: S, controller: PageController) -> Self {
        Self {
            fetcher,
            storage,
            controller,
        }
    }

    /// Downloads `href` (resolved against the page URL) and returns the path
    /// it was written to.
    pub async fn download(&self, href: &str) -> Result<String> {
        if !page::is_export_link(href) {
            return Err(ClientError::ValidationError {
                message: format!("'{}' is not an export link", href),
            });
        }

        let url = self.controller.url().await?.join(href)?;

        let busy = self
            .controller
            .update(|state| page::export_click(state, href))
            .await;
        if busy.is_empty() {
            return Err(ClientError::PageError {
                message: format!("export '{}' is already in progress", href),
            });
        }

        let guard = SettleGuard {
            controller: self.controller.clone(),
            href: Some(href.to_string()),
        };

        tracing::info!("📦 Preparing export {}", url);
        let outcome = self.fetch_and_store(&url).await;
        guard.settle().await;

        match &outcome {
            Ok(path) => tracing::info!("✅ Export saved to {}", path),
            Err(e) => tracing::warn!("Export {} failed: {}", url, e),
        }
        outcome
    }

    async fn fetch_and_store(&self, url: &Url) -> Result<String> {
        let data = self.fetcher.fetch_bytes(url).await?;
        tracing::debug!("Export returned {} bytes", data.len());
        self.storage.write_file(&export_file_name(url), &data).await
    }
}

/// Resets an export link once its download is over. Dropping the guard
/// unsettled (the download future was cancelled) schedules the reset on the
/// runtime instead.
struct SettleGuard {
    controller: PageController,
    href: Option<String>,
}

impl SettleGuard {
    async fn settle(mut self) {
        if let Some(href) = &self.href {
            self.controller.apply(page::export_settled(href)).await;
        }
        self.href = None;
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let Some(href) = self.href.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!("Export {} cancelled, resetting link", href);
                let controller = self.controller.clone();
                runtime.spawn(async move {
                    controller.apply(page::export_settled(&href)).await;
                });
            }
            Err(_) => tracing::warn!("Export {} dropped outside a runtime, link left busy", href),
        }
    }
}

/// `<last path segment>_<timestamp>`, keeping the segment's extension.
fn export_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("export");
    let stamp = Local::now().format("%Y%m%d_%H%M%S");

    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, stamp, ext),
        _ => format!("{}_{}", segment, stamp),
    }
}
