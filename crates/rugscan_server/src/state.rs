//! Shared server state.

use crate::limiter::RateLimiter;
use rugscan::news::NewsSource;
use rugscan::{Aggregator, CoinReport, FetchError, Fetcher, RugscanConfig, TtlCache};
use std::sync::Arc;

pub struct AppState {
    pub client_api_key: String,
    pub aggregator: Aggregator,
    pub news: Arc<dyn NewsSource>,
    pub cache: TtlCache<CoinReport>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// State from explicit parts; cache and limiter settings come from `config`.
    pub fn new(config: &RugscanConfig, aggregator: Aggregator, news: Arc<dyn NewsSource>) -> Self {
        Self {
            client_api_key: config.client_api_key.clone(),
            aggregator,
            news,
            cache: TtlCache::new(config.cache_ttl()),
            limiter: RateLimiter::new(config.rate_limit_window(), config.rate_limit_max),
        }
    }

    /// Live state: one fetcher shared by every provider and the news feeds.
    pub fn from_config(config: &RugscanConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(Fetcher::new(config.fetch_config())?);
        let aggregator = Aggregator::from_config(config, fetcher.clone());
        Ok(Self::new(config, aggregator, fetcher))
    }
}
