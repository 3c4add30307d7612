//! Runtime configuration: upstream endpoints, secrets, cache and rate-limit settings.
//!
//! Load from: env `RUGSCAN_CONFIG_PATH`, or `./config/rugscan.json`, or `./rugscan.json`.
//! Secrets are then overridden from the environment (`CLIENT_SERVER_API_KEY`,
//! `COINGECKO_API_KEY`, `CG_API_KEY`, `ETHERSCAN_API_KEY`, `BSCSCAN_API_KEY`),
//! and the listen address from `RUGSCAN_BIND`.

use crate::risk::RiskThresholds;
use crate::upstream::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CLIENT_API_KEY: &str = "rugscan-dev-secret";
const DEFAULT_BIND: &str = "127.0.0.1:8888";
const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Market-data providers the aggregator can fan out to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketProviderKind {
    #[serde(rename = "coingecko")]
    CoinGecko,
    #[serde(rename = "coinpaprika")]
    CoinPaprika,
}

/// Base URLs of every upstream API. Overridable so tests and mirrors can point elsewhere.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub coingecko: String,
    pub coinpaprika: String,
    pub etherscan: String,
    pub bscscan: String,
    pub fear_greed: String,
    pub rss2json: String,
    pub cryptonews_feed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coingecko: "https://api.coingecko.com/api/v3".to_string(),
            coinpaprika: "https://api.coinpaprika.com/v1".to_string(),
            etherscan: "https://api.etherscan.io/api".to_string(),
            bscscan: "https://api.bscscan.com/api".to_string(),
            fear_greed: "https://api.alternative.me/fng/".to_string(),
            rss2json: "https://api.rss2json.com/v1/api.json".to_string(),
            cryptonews_feed: "https://crypto.news/feed/".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RugscanConfig {
    /// Listen address for `rugscan serve`.
    pub bind: String,
    /// Shared secret clients must send in `x-api-key`.
    pub client_api_key: String,
    pub coingecko_api_key: Option<String>,
    /// Key for the CoinGecko news endpoint, if different from the market key.
    pub coingecko_news_api_key: Option<String>,
    pub etherscan_api_key: Option<String>,
    pub bscscan_api_key: Option<String>,
    pub endpoints: Endpoints,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max: u32,
    pub market_providers: Vec<MarketProviderKind>,
    /// Coin ids treated as the base currency of their own chain.
    pub native_coin_ids: Vec<String>,
    pub risk: RiskThresholds,
}

impl Default for RugscanConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            client_api_key: DEFAULT_CLIENT_API_KEY.to_string(),
            coingecko_api_key: None,
            coingecko_news_api_key: None,
            etherscan_api_key: None,
            bscscan_api_key: None,
            endpoints: Endpoints::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            market_providers: vec![MarketProviderKind::CoinGecko, MarketProviderKind::CoinPaprika],
            native_coin_ids: ["binancecoin", "bitcoin", "ethereum", "solana", "cardano", "tron"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            risk: RiskThresholds::default(),
        }
    }
}

impl RugscanConfig {
    /// Parse config from a JSON file. Missing fields take their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load config: env RUGSCAN_CONFIG_PATH, then ./config/rugscan.json, then ./rugscan.json,
    /// then defaults; environment overrides applied last. An unreadable file is logged and skipped.
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("RUGSCAN_CONFIG_PATH") {
            candidates.push(std::path::PathBuf::from(path));
        }
        candidates.push("./config/rugscan.json".into());
        candidates.push("./rugscan.json".into());

        let mut config = Self::default();
        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_path(candidate) {
                Ok(c) => {
                    config = c;
                    break;
                }
                Err(e) => warn!(path = %candidate.display(), error = %e, "ignoring config file"),
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override secrets and the bind address from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("CLIENT_SERVER_API_KEY") {
            self.client_api_key = v;
        }
        if let Some(v) = non_empty("COINGECKO_API_KEY") {
            self.coingecko_api_key = Some(v);
        }
        if let Some(v) = non_empty("CG_API_KEY") {
            self.coingecko_news_api_key = Some(v);
        }
        if let Some(v) = non_empty("ETHERSCAN_API_KEY") {
            self.etherscan_api_key = Some(v);
        }
        if let Some(v) = non_empty("BSCSCAN_API_KEY") {
            self.bscscan_api_key = Some(v);
        }
        if let Some(v) = non_empty("RUGSCAN_BIND") {
            self.bind = v;
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.client_api_key == DEFAULT_CLIENT_API_KEY
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            endpoints: self.endpoints.clone(),
            coingecko_api_key: self.coingecko_api_key.clone(),
            coingecko_news_api_key: self
                .coingecko_news_api_key
                .clone()
                .or_else(|| self.coingecko_api_key.clone()),
            etherscan_api_key: self.etherscan_api_key.clone(),
            bscscan_api_key: self.bscscan_api_key.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..Default::default()
        }
    }
}
