//! Browser automation for pages that only render with JavaScript.
//!
//! [`Browser`] is the seam scrapers depend on; [`WebDriverBrowser`] drives a
//! real browser through a WebDriver endpoint (chromedriver, selenium) with
//! `fantoccini`. Tests substitute their own implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use vaxscrape_shared::{BrowserConfig, Result, VaxError};

/// An element read from a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedElement {
    /// Visible text.
    pub text: String,
    /// Requested attributes that were present on the element.
    pub attrs: BTreeMap<String, String>,
}

impl RenderedElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Renders pages and reads elements once they are visible.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Load `url`, wait until at least one element matches `css` and every
    /// match is displayed, then return each match with the attributes named
    /// in `attrs`.
    async fn collect_visible(
        &self,
        url: &Url,
        css: &str,
        attrs: &[&str],
    ) -> Result<Vec<RenderedElement>>;
}

// ---------------------------------------------------------------------------
// WebDriver implementation
// ---------------------------------------------------------------------------

/// [`Browser`] backed by a WebDriver server. Each call runs in its own session.
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    config: BrowserConfig,
}

impl WebDriverBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage", "--window-size=1920,1080"];
        if self.config.headless {
            args.push("--headless=new");
        }

        let mut caps = serde_json::Map::new();
        caps.insert("browserName".into(), "chrome".into());
        caps.insert("acceptInsecureCerts".into(), true.into());
        caps.insert(
            "goog:chromeOptions".into(),
            serde_json::json!({ "args": args }),
        );
        caps
    }

    async fn connect(&self) -> Result<Client> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder.connect(&self.config.webdriver_url).await.map_err(|e| {
            VaxError::Browser(format!(
                "cannot start session at {}: {e}",
                self.config.webdriver_url
            ))
        })
    }

    async fn wait_for_visible(&self, client: &Client, css: &str) -> Result<Vec<Element>> {
        let deadline = Instant::now() + self.config.wait_timeout;

        loop {
            let elements = client
                .find_all(Locator::Css(css))
                .await
                .map_err(|e| VaxError::Browser(format!("find '{css}': {e}")))?;

            if !elements.is_empty() && all_displayed(&elements).await {
                debug!(css, count = elements.len(), "elements visible");
                return Ok(elements);
            }

            if Instant::now() >= deadline {
                return Err(VaxError::Browser(format!(
                    "timed out after {:?} waiting for '{css}' to be visible",
                    self.config.wait_timeout
                )));
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn read_elements(
        &self,
        client: &Client,
        url: &Url,
        css: &str,
        attrs: &[&str],
    ) -> Result<Vec<RenderedElement>> {
        client
            .goto(url.as_str())
            .await
            .map_err(|e| VaxError::Browser(format!("navigate to {url}: {e}")))?;

        let elements = self.wait_for_visible(client, css).await?;

        let mut rendered = Vec::with_capacity(elements.len());
        for el in elements {
            let text = el
                .text()
                .await
                .map_err(|e| VaxError::Browser(format!("read text of '{css}': {e}")))?;

            let mut found = BTreeMap::new();
            for name in attrs {
                let value = el
                    .attr(name)
                    .await
                    .map_err(|e| VaxError::Browser(format!("read '{name}' of '{css}': {e}")))?;
                if let Some(value) = value {
                    found.insert((*name).to_string(), value);
                }
            }

            rendered.push(RenderedElement { text, attrs: found });
        }
        Ok(rendered)
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    #[instrument(skip(self, attrs), fields(url = %url))]
    async fn collect_visible(
        &self,
        url: &Url,
        css: &str,
        attrs: &[&str],
    ) -> Result<Vec<RenderedElement>> {
        let client = self.connect().await?;
        info!(headless = self.config.headless, "browser session started");

        let result = self.read_elements(&client, url, css, attrs).await;

        if let Err(e) = client.close().await {
            warn!(error = %e, "failed to close browser session");
        }
        result
    }
}

/// Elements can go stale while the page is still rendering; treat any
/// failure to answer as "not yet visible".
async fn all_displayed(elements: &[Element]) -> bool {
    for el in elements {
        if !matches!(el.is_displayed().await, Ok(true)) {
            return false;
        }
    }
    true
}
