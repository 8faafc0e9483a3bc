//! Authenticated HTTP client shared by every worker
//!
//! The browser login happens elsewhere; what arrives here is its result, a
//! set of session cookies. They are baked into the client's default headers
//! so every request carries them, and the client is read-only afterwards.

use crate::config::SiteConfig;
use crate::SweepError;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Path under the site root that serves article data as JSON
const ARTICLE_API_PATH: &str = "blog/spider/blogs";

/// Cheap-to-clone handle around a configured `reqwest::Client`
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: Client,
    base_url: Url,
}

impl SiteClient {
    /// Builds the client from the `[site]` section
    ///
    /// # Errors
    ///
    /// * `SweepError::InvalidClient` - bad base URL or cookie value
    /// * `SweepError::Reqwest` - the HTTP client could not be built
    pub fn new(config: &SiteConfig) -> Result<Self, SweepError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SweepError::InvalidClient(format!("bad base URL '{}': {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(SweepError::InvalidClient(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = build_http_client(&config.user_agent, &config.cookies)?;
        Ok(Self { http, base_url })
    }

    /// Wraps an already configured client
    pub fn from_parts(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// JSON endpoint serving the article identified by `key`
    pub fn article_endpoint(&self, key: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}/{}", base, ARTICLE_API_PATH, key))
    }
}

/// Builds the HTTP client with the browser user agent and session cookies
///
/// Per-request timeouts are set by each operation; the client only bounds
/// connection setup.
pub fn build_http_client(
    user_agent: &str,
    cookies: &BTreeMap<String, String>,
) -> Result<Client, SweepError> {
    let mut headers = HeaderMap::new();

    if !cookies.is_empty() {
        let joined = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        let mut value = HeaderValue::from_str(&joined)
            .map_err(|e| SweepError::InvalidClient(format!("bad cookie header: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(COOKIE, value);
    }

    let client = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}
