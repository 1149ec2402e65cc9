use crate::config::ScoutConfig;
use crate::models::Site;
use crate::scrapers::antibot::check_usable;
use crate::scrapers::browser::{BrowserFetcher, BrowserSettings};
use crate::scrapers::direct::DirectFetcher;
use crate::scrapers::errors::ScrapeError;
use crate::scrapers::render_proxy::RenderProxyFetcher;
use crate::scrapers::traits::FetchStrategy;
use anyhow::Result;
use tracing::{info, instrument, warn};
use url::Url;

/// Page content together with the tier that produced it
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub strategy: &'static str,
}

/// Tiered fetcher: each strategy runs only if the previous one failed or
/// returned unusable content.
pub struct Fetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl Fetcher {
    /// Browser, then render proxy (when configured), then direct HTTP.
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let mut strategies: Vec<Box<dyn FetchStrategy>> = Vec::new();

        if config.use_browser {
            strategies.push(Box::new(BrowserFetcher::new(BrowserSettings {
                flags: config.browser_flags.clone(),
                headless: config.headless,
                navigation_timeout: config.navigation_timeout,
                marker_timeout: config.marker_timeout,
            })));
        }
        if let Some(creds) = &config.render_proxy {
            strategies.push(Box::new(RenderProxyFetcher::new(
                creds.clone(),
                config.request_timeout,
            )?));
        }
        strategies.push(Box::new(DirectFetcher::new(config.request_timeout)?));

        Ok(Self { strategies })
    }

    pub fn with_strategies(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Returns the first usable page. Fatal errors stop immediately; otherwise
    /// the last tier's error is returned once every tier has failed.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url, site: Site) -> Result<FetchedPage, ScrapeError> {
        let mut last_error = ScrapeError::EmptyContent;

        for strategy in &self.strategies {
            info!("Trying {} tier", strategy.name());

            let outcome = strategy
                .fetch(url, site)
                .await
                .and_then(|html| check_usable(&html).map(|_| html));

            match outcome {
                Ok(html) => {
                    info!("{} tier returned {} bytes", strategy.name(), html.len());
                    return Ok(FetchedPage {
                        html,
                        strategy: strategy.name(),
                    });
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("{} tier failed: {}", strategy.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderProxyCredentials;

    #[test]
    fn tier_order_follows_config() {
        let config = ScoutConfig::default();
        let fetcher = Fetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.strategy_names(), vec!["headless-browser", "direct-http"]);

        let config = ScoutConfig::default()
            .without_browser()
            .with_render_proxy(RenderProxyCredentials::new("key"));
        let fetcher = Fetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.strategy_names(), vec!["render-proxy", "direct-http"]);
    }
}
