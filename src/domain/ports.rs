use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// HTTP access to the server's rendered pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String>;
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn poll_interval(&self) -> Duration;
    fn pulse_duration(&self) -> Duration;
    fn debounce_window(&self) -> Duration;
    fn min_search_chars(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn output_dir(&self) -> &str;
}
