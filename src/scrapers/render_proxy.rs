use crate::config::RenderProxyCredentials;
use crate::models::Site;
use crate::scrapers::antibot::check_usable;
use crate::scrapers::errors::ScrapeError;
use crate::scrapers::traits::FetchStrategy;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fetches through a remote rendering proxy: once without JS rendering,
/// then once with it.
pub struct RenderProxyFetcher {
    client: Client,
    creds: RenderProxyCredentials,
}

impl RenderProxyFetcher {
    pub fn new(creds: RenderProxyCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, creds })
    }

    async fn request(&self, url: &Url, site: Site, render_js: bool) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(&self.creds.endpoint)
            .query(&[
                ("api_key", self.creds.api_key.as_str()),
                ("url", url.as_str()),
                ("premium_proxy", "true"),
                ("country_code", site.proxy_country()),
                ("render_js", if render_js { "true" } else { "false" }),
            ])
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
        debug!("Render proxy returned {} bytes (render_js={})", html.len(), render_js);

        Ok(html)
    }
}

#[async_trait]
impl FetchStrategy for RenderProxyFetcher {
    async fn fetch(&self, url: &Url, site: Site) -> Result<String, ScrapeError> {
        info!("[*] Render proxy no-JS: {}", url);
        match self
            .request(url, site, false)
            .await
            .and_then(|html| check_usable(&html).map(|_| html))
        {
            Ok(html) => return Ok(html),
            Err(e) => warn!("Render proxy no-JS failed: {}", e),
        }

        info!("[*] Render proxy with-JS: {}", url);
        self.request(url, site, true).await
    }

    fn name(&self) -> &'static str {
        "render-proxy"
    }
}
