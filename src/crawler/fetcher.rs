//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured timeout
//! - Rotating the User-Agent per request
//! - Error classification into [`FetchError`]
//! - Recognising verification interstitials

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::parser::is_block_page;
use crate::FetchError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Browser User-Agents used when the configuration names none
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

/// Something that turns a URL into page HTML
///
/// The partitioner, the listing coordinator and the detail workers only see
/// this trait, so tests can drive them with canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of `url`
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] over reqwest with User-Agent rotation
///
/// Cloning is cheap: the client and the agent pool are shared.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agents: Arc<Vec<String>>,
}

impl HttpFetcher {
    /// Creates a fetcher from an existing client and an agent pool
    ///
    /// An empty pool falls back to [`DEFAULT_USER_AGENTS`].
    pub fn new(client: Client, user_agents: Vec<String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            user_agents
        };

        Self {
            client,
            user_agents: Arc::new(user_agents),
        }
    }

    /// Builds the client and the agent pool from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(crawler)?;
        Ok(Self::new(client, user_agent.agents.clone()))
    }

    /// Picks the User-Agent of the next request
    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let user_agent = self.pick_user_agent().to_string();
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.6")
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if final_url.contains("captcha") {
            return Err(FetchError::Blocked {
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        if is_block_page(&body) {
            return Err(FetchError::Blocked {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

/// Maps a transport error onto the fetch error variants
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
