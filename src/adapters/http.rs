use crate::domain::ports::PageFetcher;
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kayit-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ClientError::StatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
