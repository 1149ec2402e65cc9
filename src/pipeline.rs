//! Fetch → extract → fallback, per URL and over a batch.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::ScoutConfig;
use crate::estimate;
use crate::extract::Extractor;
use crate::models::{ListingRecord, Site};
use crate::scrapers::antibot::block_marker;
use crate::scrapers::{Fetcher, ScrapeError};

/// How a record was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// Address and price were read from the page
    Extracted { strategy: &'static str },
    /// Page unavailable or incomplete; record built from the URL
    Estimated { reason: String },
}

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub record: ListingRecord,
    pub route: Route,
}

/// One line of batch output
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub record: Option<ListingRecord>,
    pub price_per_sqm: Option<f64>,
    pub route: Option<Route>,
    pub error: Option<String>,
}

pub struct Pipeline {
    fetcher: Fetcher,
    extractors: HashMap<Site, Extractor>,
    batch_delay: RangeInclusive<u64>,
}

impl Pipeline {
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        Self::new(Fetcher::from_config(config)?, config.batch_delay.clone())
    }

    pub fn new(fetcher: Fetcher, batch_delay: RangeInclusive<u64>) -> Result<Self> {
        let mut extractors = HashMap::new();
        for site in [Site::Funda, Site::Idealista] {
            extractors.insert(site, Extractor::for_site(site)?);
        }
        Ok(Self {
            fetcher,
            extractors,
            batch_delay,
        })
    }

    /// Scrape one listing.
    ///
    /// Errors only for a malformed URL, an unsupported site, or a browser
    /// session that cannot be created. Every other failure yields an
    /// estimated record.
    #[instrument(skip(self))]
    pub async fn scrape(&self, raw_url: &str) -> Result<ScrapeOutcome, ScrapeError> {
        let url = Url::parse(raw_url.trim())?;
        let site = Site::from_url(&url)
            .ok_or_else(|| ScrapeError::UnsupportedSite(url.host_str().unwrap_or("").to_string()))?;
        info!("Detected {} URL", site.name());

        let page = match self.fetcher.fetch(&url, site).await {
            Ok(page) => page,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("All fetch tiers failed: {}", e);
                return Ok(estimated(&url, e.to_string()));
            }
        };

        if let Some(marker) = block_marker(&page.html) {
            warn!("Anti-bot page from {} tier", page.strategy);
            return Ok(estimated(&url, ScrapeError::BlockedByAntiBot(marker.to_string()).to_string()));
        }

        let Some(extractor) = self.extractors.get(&site) else {
            return Err(ScrapeError::UnsupportedSite(site.name().to_string()));
        };
        let partial = extractor.extract_partial(&page.html);

        if partial.has_core_fields() {
            let missing = partial.missing();
            if !missing.is_empty() {
                info!(
                    "Extracted core fields; {} left as sentinels",
                    missing.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
                );
            }
            return Ok(ScrapeOutcome {
                record: partial.finish(url.as_str()),
                route: Route::Extracted {
                    strategy: page.strategy,
                },
            });
        }

        warn!("Address or price missing after extraction");
        Ok(estimated(&url, "address or price not found on page".to_string()))
    }

    /// Scrape URLs one after another with a randomized pause between them.
    /// Failures are recorded per entry and never stop the batch.
    pub async fn scrape_batch(&self, urls: &[String]) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            info!("--- Processing URL {}/{}: {} ---", i + 1, urls.len(), url);
            let scraped_at = Utc::now();

            let entry = match self.scrape(url).await {
                Ok(outcome) => BatchEntry {
                    url: url.clone(),
                    scraped_at,
                    price_per_sqm: outcome.record.price_per_sqm(),
                    record: Some(outcome.record),
                    route: Some(outcome.route),
                    error: None,
                },
                Err(e) => {
                    warn!("Scrape failed for {}: {}", url, e);
                    BatchEntry {
                        url: url.clone(),
                        scraped_at,
                        record: None,
                        price_per_sqm: None,
                        route: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            entries.push(entry);

            if i + 1 < urls.len() {
                let delay = self.pick_delay();
                info!("Waiting for {:.1} seconds before next request...", delay.as_secs_f64());
                tokio::time::sleep(delay).await;
            }
        }

        entries
    }

    fn pick_delay(&self) -> Duration {
        let (lo, hi) = (*self.batch_delay.start(), *self.batch_delay.end());
        if hi <= lo {
            return Duration::from_secs(lo);
        }
        let millis = rand::thread_rng().gen_range(lo * 1000..=hi * 1000);
        Duration::from_millis(millis)
    }
}

fn estimated(url: &Url, reason: String) -> ScrapeOutcome {
    info!("Falling back to URL-based estimate");
    ScrapeOutcome {
        record: estimate::estimate(url),
        route: Route::Estimated { reason },
    }
}
