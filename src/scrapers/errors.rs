use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported site: {0}")]
    UnsupportedSite(String),

    #[error("browser session could not be created: {0}")]
    BrowserLaunch(String),

    #[error("navigation timed out: {0}")]
    NavigationTimeout(String),

    #[error("blocked by anti-bot page ({0})")]
    BlockedByAntiBot(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("malformed structured payload: {0}")]
    MalformedStructuredPayload(String),

    #[error("empty or minimal content")]
    EmptyContent,

    #[error("network error: {0}")]
    Network(String),

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },
}

impl ScrapeError {
    /// Fatal errors abort the scrape; everything else moves the pipeline to
    /// the next fetch tier or to the estimator.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => true,
            Self::UnsupportedSite(_) => true,
            Self::BrowserLaunch(_) => true,

            Self::NavigationTimeout(_) => false,
            Self::BlockedByAntiBot(_) => false,
            Self::SelectorNotFound(_) => false,
            Self::MalformedStructuredPayload(_) => false,
            Self::EmptyContent => false,
            Self::Network(_) => false,
            Self::Http { .. } => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("timeout: {err}"))
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else {
            Self::Network(err.to_string())
        }
    }
}
