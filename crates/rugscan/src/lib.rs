//! rugscan: token risk scanner.
//!
//! Resolves a coin query, fans out to market, holder and sentiment providers,
//! and folds whatever comes back into a heuristic rug-pull risk report.
//! Read-only; holds no data beyond a short-lived cache.

pub mod aggregate;
pub mod config;
pub mod model;
pub mod news;
pub mod providers;
pub mod report;
pub mod resolve;
pub mod risk;
pub mod upstream;

pub use aggregate::{Aggregator, ScanError, ScanRequest};
pub use config::{ConfigError, RugscanConfig};
pub use model::{
    Chain, CoinProfile, HolderSnapshot, LiquidityStatus, MarketQuote, ResolvedCoin,
    SentimentSnapshot,
};
pub use news::{NewsArticle, NewsDigest};
pub use report::{CoinReport, ProviderQuote, Verdict};
pub use risk::{evaluate_risks, RiskAssessment, RiskFlag, RiskInput, RiskThresholds};
pub use upstream::{report_key, FetchConfig, FetchError, Fetcher, TtlCache};
