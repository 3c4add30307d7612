//! Provider seams: one trait per kind of upstream data, plus the Fetcher-backed implementations.

use crate::model::{Chain, CoinProfile, HolderSnapshot, MarketQuote, ResolvedCoin, SentimentSnapshot};
use crate::upstream::{FetchError, Fetcher};
use async_trait::async_trait;
use std::sync::Arc;

/// Identifier lookup. Candidates come back best-ranked first.
#[async_trait]
pub trait CoinSearch: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<ResolvedCoin>, FetchError>;
}

/// What a market provider returns: always a quote, sometimes the full profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderData {
    pub quote: MarketQuote,
    pub profile: Option<CoinProfile>,
}

#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Display name, used as the prefix of this provider's error strings.
    fn name(&self) -> &str;
    async fn fetch(&self, coin: &ResolvedCoin) -> Result<ProviderData, FetchError>;
}

#[async_trait]
pub trait HolderProvider: Send + Sync {
    async fn top_holders(&self, chain: Chain, contract: &str) -> Result<HolderSnapshot, FetchError>;
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    fn name(&self) -> &str {
        "Fear/Greed Index"
    }
    async fn sentiment(&self) -> Result<SentimentSnapshot, FetchError>;
}

pub struct CoinGecko(pub Arc<Fetcher>);

#[async_trait]
impl CoinSearch for CoinGecko {
    async fn search(&self, term: &str) -> Result<Vec<ResolvedCoin>, FetchError> {
        let coins = self.0.coingecko_search(term).await?;
        Ok(coins
            .into_iter()
            .map(|c| ResolvedCoin {
                id: c.id,
                symbol: c.symbol,
                name: c.name,
            })
            .collect())
    }
}

#[async_trait]
impl MarketProvider for CoinGecko {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch(&self, coin: &ResolvedCoin) -> Result<ProviderData, FetchError> {
        let (quote, profile) = self.0.coingecko_coin(&coin.id).await?.into_parts()?;
        Ok(ProviderData {
            quote,
            profile: Some(profile),
        })
    }
}

pub struct CoinPaprika(pub Arc<Fetcher>);

#[async_trait]
impl MarketProvider for CoinPaprika {
    fn name(&self) -> &str {
        "CoinPaprika"
    }

    async fn fetch(&self, coin: &ResolvedCoin) -> Result<ProviderData, FetchError> {
        Ok(ProviderData {
            quote: self.0.coinpaprika_quote(coin).await?,
            profile: None,
        })
    }
}

/// Etherscan / BscScan holder list, scaled against the raw token supply.
pub struct Explorers(pub Arc<Fetcher>);

#[async_trait]
impl HolderProvider for Explorers {
    async fn top_holders(&self, chain: Chain, contract: &str) -> Result<HolderSnapshot, FetchError> {
        let (balances, supply) = tokio::try_join!(
            self.0.explorer_top_holders(chain, contract),
            self.0.explorer_token_supply(chain, contract)
        )?;
        Ok(HolderSnapshot::from_balances(chain, balances, supply))
    }
}

pub struct FearGreed(pub Arc<Fetcher>);

#[async_trait]
impl SentimentProvider for FearGreed {
    async fn sentiment(&self) -> Result<SentimentSnapshot, FetchError> {
        self.0.fear_greed().await
    }
}
