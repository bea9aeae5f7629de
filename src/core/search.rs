use crate::core::controller::PageController;
use crate::core::debounce::Debouncer;
use crate::core::{html, page};
use crate::domain::model::DomPatch;
use crate::domain::ports::{ConfigProvider, PageFetcher};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

pub const SEARCH_PARAM: &str = "ad_soyad";
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN_CHARS: usize = 2;

/// `page_url` with `ad_soyad` set to `query`. An existing `ad_soyad` keeps
/// its position; duplicates are dropped. Other parameters are untouched.
pub fn search_url(page_url: &Url, query: &str) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in page_url.query_pairs() {
        if key == SEARCH_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), query.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((SEARCH_PARAM.to_string(), query.to_string()));
    }

    let mut url = page_url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

pub struct SearchClient<F: PageFetcher + ?Sized> {
    fetcher: Arc<F>,
    controller: PageController,
    min_chars: usize,
    debounce_window: Duration,
}

impl<F: PageFetcher + ?Sized + 'static> SearchClient<F> {
    pub fn new(fetcher: Arc<F>, controller: PageController) -> Self {
        Self {
            fetcher,
            controller,
            min_chars: DEFAULT_MIN_CHARS,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
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
            min_chars: config.min_search_chars(),
            debounce_window: config.debounce_window(),
        }
    }

    /// Runs one search right away. Pages without an `ad_soyad` input and
    /// queries shorter than the minimum are skipped and return no patches.
    pub async fn perform(&self, query: &str) -> Result<Vec<DomPatch>> {
        if !self.controller.state().await.has_search_field {
            tracing::debug!("Page has no search field, skipping '{}'", query);
            return Ok(Vec::new());
        }
        if query.chars().count() < self.min_chars {
            tracing::debug!("Query '{}' is shorter than {} characters", query, self.min_chars);
            return Ok(Vec::new());
        }

        let url = search_url(&self.controller.url().await?, query);
        let body = self.fetcher.fetch_page(&url).await?;
        let fresh = html::extract_results(&body)?;

        let applied = self
            .controller
            .update(|state| page::replace_results(state, fresh))
            .await;
        if applied.is_empty() {
            tracing::debug!("No results table to replace for '{}'", query);
        } else {
            tracing::info!("🔎 Results refreshed for '{}'", query);
        }
        Ok(applied)
    }

    /// Starts the debounced input loop. Push every keystroke's field value
    /// into the returned debouncer; the task ends once it is dropped and the
    /// last pending search has run. Values settle on pages without a search
    /// field too, but [`perform`](Self::perform) drops them.
    pub fn spawn(self) -> (Debouncer<String>, JoinHandle<()>) {
        let (debouncer, mut settled) = Debouncer::<String>::spawn(self.debounce_window);
        let handle = tokio::spawn(async move {
            while let Some(query) = settled.recv().await {
                if let Err(e) = self.perform(&query).await {
                    tracing::warn!("Search failed: {}", e);
                }
            }
        });
        (debouncer, handle)
    }
}
