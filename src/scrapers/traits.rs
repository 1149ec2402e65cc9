use crate::models::Site;
use crate::scrapers::errors::ScrapeError;
use async_trait::async_trait;
use url::Url;

/// One way of obtaining a listing page's raw content.
/// The fetcher tries strategies in order until one yields usable content.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Fetch the page, returning its raw HTML
    async fn fetch(&self, url: &Url, site: Site) -> Result<String, ScrapeError>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}
