//! Runtime configuration handed to the fetcher and pipeline.
//!
//! Nothing else in the crate reads the environment. `ScoutConfig::from_env`
//! is the single place environment variables are consulted; the binary loads
//! a `.env` file first.

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

pub const ENV_RENDER_PROXY_KEY: &str = "SCRAPINGBEE_API_KEY";
pub const ENV_RENDER_PROXY_URL: &str = "SCOUT_RENDER_PROXY_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "SCOUT_REQUEST_TIMEOUT_SECS";
pub const ENV_NAVIGATION_TIMEOUT: &str = "SCOUT_NAVIGATION_TIMEOUT_SECS";
pub const ENV_USE_BROWSER: &str = "SCOUT_USE_BROWSER";
pub const ENV_HEADLESS: &str = "SCOUT_HEADLESS";

pub const DEFAULT_RENDER_PROXY_URL: &str = "https://app.scrapingbee.com/api/v1/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MARKER_TIMEOUT: Duration = Duration::from_secs(15);

/// Chrome flags that disable sandboxing and automation hints.
pub const DEFAULT_BROWSER_FLAGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-infobars",
    "--disable-blink-features=AutomationControlled",
    "--disable-features=IsolateOrigins,site-per-process",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Credentials for the remote rendering proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderProxyCredentials {
    pub api_key: String,
    pub endpoint: String,
}

impl RenderProxyCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_RENDER_PROXY_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

// Never print the key.
impl std::fmt::Debug for RenderProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderProxyCredentials")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub render_proxy: Option<RenderProxyCredentials>,
    pub browser_flags: Vec<String>,
    pub request_timeout: Duration,
    pub navigation_timeout: Duration,
    pub marker_timeout: Duration,
    pub use_browser: bool,
    pub headless: bool,
    /// Seconds to pause between URLs in a batch
    pub batch_delay: RangeInclusive<u64>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            render_proxy: None,
            browser_flags: DEFAULT_BROWSER_FLAGS.iter().map(|f| f.to_string()).collect(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            marker_timeout: DEFAULT_MARKER_TIMEOUT,
            use_browser: true,
            headless: true,
            batch_delay: 5..=15,
        }
    }
}

impl ScoutConfig {
    /// Load overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(key) = non_empty_var(ENV_RENDER_PROXY_KEY) {
            let mut creds = RenderProxyCredentials::new(key);
            if let Some(endpoint) = non_empty_var(ENV_RENDER_PROXY_URL) {
                creds = creds.with_endpoint(endpoint);
            }
            config.render_proxy = Some(creds);
        }
        if let Some(secs) = non_empty_var(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_secs(ENV_REQUEST_TIMEOUT, &secs)?;
        }
        if let Some(secs) = non_empty_var(ENV_NAVIGATION_TIMEOUT) {
            config.navigation_timeout = parse_secs(ENV_NAVIGATION_TIMEOUT, &secs)?;
        }
        if let Some(flag) = non_empty_var(ENV_USE_BROWSER) {
            config.use_browser = parse_bool(ENV_USE_BROWSER, &flag)?;
        }
        if let Some(flag) = non_empty_var(ENV_HEADLESS) {
            config.headless = parse_bool(ENV_HEADLESS, &flag)?;
        }

        Ok(config)
    }

    pub fn with_render_proxy(mut self, creds: RenderProxyCredentials) -> Self {
        self.render_proxy = Some(creds);
        self
    }

    pub fn without_browser(mut self) -> Self {
        self.use_browser = false;
        self
    }

    pub fn with_batch_delay(mut self, secs: RangeInclusive<u64>) -> Self {
        self.batch_delay = secs;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(field: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            field,
            reason: "must be at least one second".into(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(field: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
