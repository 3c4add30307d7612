//! One scan: resolve, fan out to every provider, evaluate risks, assemble the report.

use crate::config::{MarketProviderKind, RugscanConfig};
use crate::model::{Chain, CoinProfile, HolderSnapshot, LiquidityStatus, ResolvedCoin};
use crate::providers::{
    CoinGecko, CoinPaprika, CoinSearch, Explorers, FearGreed, HolderProvider, MarketProvider,
    ProviderData, SentimentProvider,
};
use crate::report::{CoinReport, ProviderQuote, Verdict};
use crate::resolve::resolve_coin;
use crate::risk::{evaluate_risks, RiskInput, RiskThresholds};
use crate::upstream::{clean_coin_id, Fetcher};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

const NATIVE_CHAIN_INFO: &str = "Native chain coin (e.g., BNB on BSC). Holder data unavailable.";
const OTHER_CHAIN_INFO: &str =
    "Non-Ethereum/BSC token (e.g., Solana). Holder data unavailable. Verify manually.";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("No coin found for \"{0}\". Try a different name or ID.")]
    NotFound(String),
    #[error("No data found for \"{0}\". Check the coin name or try again later.")]
    NoData(String),
    #[error("empty query")]
    EmptyQuery,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub query: String,
    pub audit_link: Option<String>,
}

impl ScanRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            audit_link: None,
        }
    }

    pub fn with_audit_link(mut self, link: Option<String>) -> Self {
        self.audit_link = link.filter(|l| !l.trim().is_empty());
        self
    }
}

pub struct Aggregator {
    search: Arc<dyn CoinSearch>,
    markets: Vec<Arc<dyn MarketProvider>>,
    holders: Option<Arc<dyn HolderProvider>>,
    sentiment: Option<Arc<dyn SentimentProvider>>,
    native_coin_ids: Vec<String>,
    thresholds: RiskThresholds,
}

impl Aggregator {
    pub fn new(search: Arc<dyn CoinSearch>) -> Self {
        Self {
            search,
            markets: Vec::new(),
            holders: None,
            sentiment: None,
            native_coin_ids: Vec::new(),
            thresholds: RiskThresholds::default(),
        }
    }

    /// Add a market provider. The first one added that succeeds is the primary.
    pub fn with_market(mut self, provider: Arc<dyn MarketProvider>) -> Self {
        self.markets.push(provider);
        self
    }

    pub fn with_holders(mut self, provider: Arc<dyn HolderProvider>) -> Self {
        self.holders = Some(provider);
        self
    }

    pub fn with_sentiment(mut self, provider: Arc<dyn SentimentProvider>) -> Self {
        self.sentiment = Some(provider);
        self
    }

    pub fn with_native_coins(mut self, ids: Vec<String>) -> Self {
        self.native_coin_ids = ids;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Wire the live providers enabled in `config` around a shared fetcher.
    pub fn from_config(config: &RugscanConfig, fetcher: Arc<Fetcher>) -> Self {
        let mut agg = Self::new(Arc::new(CoinGecko(fetcher.clone())));
        for kind in &config.market_providers {
            let provider: Arc<dyn MarketProvider> = match kind {
                MarketProviderKind::CoinGecko => Arc::new(CoinGecko(fetcher.clone())),
                MarketProviderKind::CoinPaprika => Arc::new(CoinPaprika(fetcher.clone())),
            };
            agg = agg.with_market(provider);
        }
        agg.with_holders(Arc::new(Explorers(fetcher.clone())))
            .with_sentiment(Arc::new(FearGreed(fetcher)))
            .with_native_coins(config.native_coin_ids.clone())
            .with_thresholds(config.risk)
    }

    pub fn is_native(&self, coin_id: &str) -> bool {
        self.native_coin_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(coin_id))
    }

    pub async fn scan(&self, req: &ScanRequest) -> Result<CoinReport, ScanError> {
        let started = Instant::now();
        let term = clean_coin_id(&req.query);
        if term.is_empty() {
            return Err(ScanError::EmptyQuery);
        }

        let coin = resolve_coin(self.search.as_ref(), &term)
            .await
            .map_err(|_| ScanError::NotFound(term.clone()))?;

        let markets = join_all(self.markets.iter().map(|p| {
            let coin = &coin;
            async move { (p.name().to_string(), p.fetch(coin).await) }
        }));
        let sentiment = async {
            match &self.sentiment {
                Some(s) => Some((s.name().to_string(), s.sentiment().await)),
                None => None,
            }
        };
        let (market_results, sentiment_result) = tokio::join!(markets, sentiment);

        let mut errors = Vec::new();
        let mut successes: Vec<(String, ProviderData)> = Vec::new();
        for (name, res) in market_results {
            match res {
                Ok(data) => successes.push((name, data)),
                Err(e) => {
                    warn!(provider = %name, coin = %coin.id, error = %e, "market provider failed");
                    errors.push(format!("{name}: {e}"));
                }
            }
        }
        let market_sentiment = match sentiment_result {
            Some((_, Ok(s))) => Some(s),
            Some((name, Err(e))) => {
                warn!(provider = %name, error = %e, "sentiment provider failed");
                errors.push(format!("{name}: {e}"));
                None
            }
            None => None,
        };

        if successes.is_empty() {
            return Err(ScanError::NoData(coin.id));
        }

        let data = successes[0].1.quote.clone();
        let profile: CoinProfile = successes
            .iter()
            .find_map(|(_, d)| d.profile.clone())
            .unwrap_or_default();
        let providers: Vec<ProviderQuote> = successes
            .into_iter()
            .map(|(provider, d)| ProviderQuote {
                provider,
                quote: d.quote,
            })
            .collect();

        let is_native = self.is_native(&coin.id);
        let chain = profile.platforms.chain();
        let contract = profile.platforms.contract_address();
        let holders = self
            .fetch_holders(&coin, chain, contract, is_native, &mut errors)
            .await;
        let chain_info = if is_native {
            Some(NATIVE_CHAIN_INFO.to_string())
        } else if contract.is_some() && chain == Some(Chain::Other) {
            Some(OTHER_CHAIN_INFO.to_string())
        } else {
            None
        };

        let liquidity = LiquidityStatus::unverified();
        let input = RiskInput::from_snapshots(
            providers.iter().map(|p| &p.quote),
            holders.as_ref(),
            &profile.socials,
            &liquidity,
            is_native,
        );
        let assessment = evaluate_risks(&input, &self.thresholds);

        let mut report = CoinReport {
            search_time: String::new(),
            query_duration: 0.0,
            coin,
            data,
            providers,
            market_sentiment,
            socials: profile.socials,
            community: profile.community,
            developer: profile.developer,
            tokenomics: profile.tokenomics,
            liquidity,
            holders,
            risks: Vec::new(),
            flags: Vec::new(),
            risk_level: Verdict::Low,
            verdict: String::new(),
            chain,
            chain_info,
            is_native,
            audit_link: req.audit_link.clone(),
            errors,
        };
        report.set_risks(assessment);
        report.stamp(OffsetDateTime::now_utc(), started.elapsed());
        info!(
            coin = %report.coin.id,
            risks = report.risks.len(),
            errors = report.errors.len(),
            seconds = report.query_duration,
            "scan complete"
        );
        Ok(report)
    }

    async fn fetch_holders(
        &self,
        coin: &ResolvedCoin,
        chain: Option<Chain>,
        contract: Option<&str>,
        is_native: bool,
        errors: &mut Vec<String>,
    ) -> Option<HolderSnapshot> {
        let provider = self.holders.as_ref()?;
        let (chain, contract) = match (chain, contract) {
            (Some(chain), Some(contract)) if chain.has_holder_explorer() && !is_native => {
                (chain, contract)
            }
            _ => {
                debug!(coin = %coin.id, is_native, "skipping holder lookup");
                return None;
            }
        };
        match provider.top_holders(chain, contract).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(coin = %coin.id, chain = chain.display_name(), error = %e, "holder lookup failed");
                errors.push(format!("{}: {e}", chain.explorer_name()));
                None
            }
        }
    }
}
