//! HTTP fetching for static source pages.

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use vaxscrape_shared::{HttpConfig, Result, VaxError};

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("vaxscrape/", env!("CARGO_PKG_VERSION"));

/// Fetches page bodies from government sources.
///
/// Holds two clients: a normal one, and one that skips certificate
/// verification for hosts serving broken TLS chains.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    unverified: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config, false)?,
            unverified: build_client(config, true)?,
        })
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        fetch(&self.client, url).await
    }

    /// GET `url` without verifying the server certificate.
    pub async fn get_text_unverified(&self, url: &Url) -> Result<String> {
        fetch(&self.unverified, url).await
    }
}

fn build_client(config: &HttpConfig, accept_invalid_certs: bool) -> Result<Client> {
    let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);

    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(config.timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| VaxError::Network(format!("failed to build HTTP client: {e}")))
}

#[instrument(skip(client), fields(url = %url))]
async fn fetch(client: &Client, url: &Url) -> Result<String> {
    debug!("fetching page");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| VaxError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(VaxError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| VaxError::Network(format!("{url}: body read failed: {e}")))?;

    debug!(bytes = body.len(), "page fetched");
    Ok(body)
}
