//! Shared HTTP client for every upstream API. One attempt per call; no retries.

use crate::config::Endpoints;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub endpoints: Endpoints,
    pub coingecko_api_key: Option<String>,
    pub coingecko_news_api_key: Option<String>,
    pub etherscan_api_key: Option<String>,
    pub bscscan_api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            coingecko_api_key: None,
            coingecko_news_api_key: None,
            etherscan_api_key: None,
            bscscan_api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("rugscan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api error: status {0} body {1}")]
    Api(u16, String),
    #[error("decode: {0}")]
    Decode(String),
    /// Payload parsed but lacks a field the caller cannot do without.
    #[error("{0}")]
    Invalid(String),
    /// Upstream answered with its own failure status.
    #[error("{0}")]
    Upstream(String),
}

/// HTTP client shared by all providers.
pub struct Fetcher {
    config: FetchConfig,
    client: reqwest::Client,
    request_count: AtomicU64,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            config,
            client,
            request_count: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.config.endpoints
    }

    /// GET `url` with extra headers and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut req = self.client.get(url.clone());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let res = req.send().await.inspect_err(|e| {
            warn!(host = url.host_str().unwrap_or_default(), error = %e, "upstream request failed");
        })?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api(status.as_u16(), truncate(&body)));
        }
        debug!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            bytes = body.len(),
            "upstream ok"
        );
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

/// Join a base URL and a path, tolerating a trailing slash on the base.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, FetchError> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    Ok(Url::parse(&joined)?)
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
