use crate::models::Site;
use crate::scrapers::errors::ScrapeError;
use crate::scrapers::traits::FetchStrategy;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:115.0) Gecko/20100101 Firefox/115.0";

/// Plain GET with browser-like headers, the last resort tier
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for DirectFetcher {
    async fn fetch(&self, url: &Url, site: Site) -> Result<String, ScrapeError> {
        info!("[*] HTTP fallback: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, site.accept_language())
            .send()
            .await
            .map_err(ScrapeError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http { status });
        }

        let html = response
            .text()
            .await
            .map_err(ScrapeError::from_reqwest_error)?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn name(&self) -> &'static str {
        "direct-http"
    }
}
