use crate::models::Site;
use crate::scrapers::errors::ScrapeError;
use crate::scrapers::traits::FetchStrategy;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::seq::SliceRandom;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const VIEWPORT: (u32, u32) = (1920, 1080);

/// Hides the automation properties bot detectors probe for.
const STEALTH_JS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });
    Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
            { name: 'Native Client', filename: 'internal-nacl-plugin' }
        ]
    });
    Object.defineProperty(navigator, 'languages', { get: () => __LANGUAGES__ });
    window.chrome = window.chrome || { runtime: {} };
"#;

/// Settings for one headless Chrome session
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub flags: Vec<String>,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub marker_timeout: Duration,
}

/// Renders the listing in a fresh headless Chrome per fetch.
pub struct BrowserFetcher {
    settings: BrowserSettings,
}

impl BrowserFetcher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl FetchStrategy for BrowserFetcher {
    async fn fetch(&self, url: &Url, site: Site) -> Result<String, ScrapeError> {
        let settings = self.settings.clone();
        let url = url.clone();

        // headless_chrome blocks; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let session = BrowserSession::launch(&settings)?;
            session.render(&url, site)
        })
        .await
        .map_err(render_task_failure)?
    }

    fn name(&self) -> &'static str {
        "headless-browser"
    }
}

/// An exclusively owned Chrome process. The session owns the only
/// `Browser` handle, and headless_chrome kills the process when that handle
/// drops, so every exit path from `render` releases it.
pub struct BrowserSession {
    browser: Browser,
    settings: BrowserSettings,
}

impl BrowserSession {
    pub fn launch(settings: &BrowserSettings) -> Result<Self, ScrapeError> {
        info!("Launching headless Chrome...");

        let args: Vec<&OsStr> = settings.flags.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(false)
            .window_size(Some(VIEWPORT))
            .idle_browser_timeout(settings.navigation_timeout + settings.marker_timeout)
            .args(args)
            .build()
            .map_err(|e| ScrapeError::BrowserLaunch(format!("Failed to build launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| ScrapeError::BrowserLaunch(format!("Failed to launch Chrome browser: {e}")))?;

        Ok(Self {
            browser,
            settings: settings.clone(),
        })
    }

    fn prepare_tab(&self, site: Site) -> Result<Arc<Tab>, ScrapeError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| ScrapeError::BrowserLaunch(format!("Failed to open tab: {e}")))?;

        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        debug!("Using user agent {}", user_agent);

        if let Err(e) = tab.set_user_agent(user_agent, Some(site.accept_language()), None) {
            warn!("Could not set user agent: {}", e);
        }

        let stealth = Page::AddScriptToEvaluateOnNewDocument {
            source: STEALTH_JS.replace("__LANGUAGES__", &languages_literal(site)),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        };
        if let Err(e) = tab.call_method(stealth) {
            warn!("Could not install stealth script: {}", e);
        }

        tab.set_default_timeout(self.settings.navigation_timeout);
        Ok(tab)
    }

    /// Navigate, wait for the content marker, and return the rendered HTML.
    pub fn render(&self, url: &Url, site: Site) -> Result<String, ScrapeError> {
        let tab = self.prepare_tab(site)?;

        info!("Opening {}", url);
        tab.navigate_to(url.as_str())
            .map_err(|e| ScrapeError::NavigationTimeout(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| ScrapeError::NavigationTimeout(e.to_string()))?;

        let marker = site.content_marker();
        tab.wait_for_element_with_custom_timeout(marker, self.settings.marker_timeout)
            .map_err(|_| ScrapeError::SelectorNotFound(marker.to_string()))?;

        let html = tab
            .get_content()
            .map_err(|e| ScrapeError::Network(format!("Could not read page content: {e}")))?;
        debug!("Rendered page is {} bytes", html.len());

        Ok(html)
    }
}

/// A render task that panicked or was cancelled. The browser did launch, so
/// the next tier may still succeed.
fn render_task_failure(err: tokio::task::JoinError) -> ScrapeError {
    ScrapeError::NavigationTimeout(format!("browser render aborted: {err}"))
}

/// JS array literal of the site's preferred languages
fn languages_literal(site: Site) -> String {
    let langs: Vec<String> = site
        .accept_language()
        .split(',')
        .map(|part| part.split(';').next().unwrap_or(part).trim())
        .filter(|lang| !lang.is_empty())
        .map(|lang| format!("'{lang}'"))
        .collect();
    format!("[{}]", langs.join(", "))
}
