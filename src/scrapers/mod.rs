pub mod antibot;
pub mod browser;
pub mod direct;
pub mod errors;
pub mod fetcher;
pub mod render_proxy;
pub mod traits;

pub use browser::BrowserFetcher;
pub use direct::DirectFetcher;
pub use errors::ScrapeError;
pub use fetcher::{FetchedPage, Fetcher};
pub use render_proxy::RenderProxyFetcher;
pub use traits::FetchStrategy;
