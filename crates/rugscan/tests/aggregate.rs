//! Scan pipeline driven end to end with saved CoinGecko fixtures and in-process providers.

use async_trait::async_trait;
use rugscan::model::{Chain, HolderSnapshot, MarketQuote, ResolvedCoin, SentimentSnapshot};
use rugscan::providers::{
    CoinSearch, HolderProvider, MarketProvider, ProviderData, SentimentProvider,
};
use rugscan::upstream::CgCoin;
use rugscan::{report_key, Aggregator, FetchError, ScanError, ScanRequest, TtlCache, Verdict};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata");
    let full = root.join(path);
    let s =
        std::fs::read_to_string(&full).unwrap_or_else(|e| panic!("read {}: {}", full.display(), e));
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
}

struct Search(Vec<ResolvedCoin>);

#[async_trait]
impl CoinSearch for Search {
    async fn search(&self, _term: &str) -> Result<Vec<ResolvedCoin>, FetchError> {
        Ok(self.0.clone())
    }
}

fn pepe_search() -> Arc<Search> {
    Arc::new(Search(vec![
        ResolvedCoin {
            id: "based-frog".into(),
            symbol: "frog".into(),
            name: None,
        },
        ResolvedCoin {
            id: "pepe".into(),
            symbol: "pepe".into(),
            name: Some("Pepe".into()),
        },
    ]))
}

/// CoinGecko-shaped provider serving a saved `/coins/{id}` payload.
struct Fixture(&'static str);

#[async_trait]
impl MarketProvider for Fixture {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch(&self, _coin: &ResolvedCoin) -> Result<ProviderData, FetchError> {
        let coin: CgCoin = load_fixture(self.0);
        let (quote, profile) = coin.into_parts()?;
        Ok(ProviderData {
            quote,
            profile: Some(profile),
        })
    }
}

/// Quote-only provider, like CoinPaprika.
struct QuoteOnly(Option<f64>);

#[async_trait]
impl MarketProvider for QuoteOnly {
    fn name(&self) -> &str {
        "CoinPaprika"
    }

    async fn fetch(&self, _coin: &ResolvedCoin) -> Result<ProviderData, FetchError> {
        Ok(ProviderData {
            quote: MarketQuote {
                price: self.0,
                volume_24h: Some(600_000_000.0),
                ..Default::default()
            },
            profile: None,
        })
    }
}

struct Holders {
    calls: AtomicUsize,
    fail: bool,
}

impl Holders {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }
}

#[async_trait]
impl HolderProvider for Holders {
    async fn top_holders(&self, chain: Chain, _contract: &str) -> Result<HolderSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Upstream("No holder data from Etherscan".into()));
        }
        Ok(HolderSnapshot::from_balances(
            chain,
            vec![("0xaaaa000000".into(), 150.0), ("0xbbbb000000".into(), 100.0)],
            1_000.0,
        ))
    }
}

struct Sentiment(bool);

#[async_trait]
impl SentimentProvider for Sentiment {
    async fn sentiment(&self) -> Result<SentimentSnapshot, FetchError> {
        if self.0 {
            Ok(SentimentSnapshot {
                value: 71,
                classification: "Greed".into(),
            })
        } else {
            Err(FetchError::Api(502, "bad gateway".into()))
        }
    }
}

#[tokio::test]
async fn full_scan_from_fixture() {
    let holders = Holders::new(false);
    let agg = Aggregator::new(pepe_search())
        .with_market(Arc::new(Fixture("coingecko_coin_pepe.json")))
        .with_market(Arc::new(QuoteOnly(Some(0.0000081))))
        .with_holders(holders.clone())
        .with_sentiment(Arc::new(Sentiment(true)));

    let req = ScanRequest::new("Pepe (PEPE) - pepe").with_audit_link(Some("https://audit.example/pepe".into()));
    let report = agg.scan(&req).await.unwrap();

    assert_eq!(report.coin.id, "pepe");
    assert_eq!(report.display_name(), "Pepe");
    assert_eq!(report.providers.len(), 2);
    assert!(report.errors.is_empty());
    assert_eq!(report.chain, Some(Chain::Ethereum));
    assert_eq!(holders.calls.load(Ordering::SeqCst), 1);

    let h = report.holders.as_ref().unwrap();
    assert!((h.total_top10 - 25.0).abs() < 1e-9);

    assert!(report.socials.twitter.verified);
    assert!(!report.socials.facebook.verified);
    assert_eq!(report.socials.reddit.handle.as_deref(), Some("pepecoin"));
    assert_eq!(report.community.twitter_followers, 512_345);

    assert_eq!(
        report.risks,
        vec![
            "High holder concentration: Top 10 holders own 25.00%".to_string(),
            "Liquidity not locked: Potential rug pull risk".to_string(),
        ]
    );
    assert_eq!(report.risk_level, Verdict::High);
    assert_eq!(report.verdict, "Potential risks detected. Avoid or verify manually.");
    assert_eq!(report.market_sentiment.as_ref().unwrap().value, 71);
    assert_eq!(report.audit_link.as_deref(), Some("https://audit.example/pepe"));
    assert!(report.search_time.ends_with(" UTC"));
}

#[tokio::test]
async fn diverging_prices_flag_discrepancy() {
    let agg = Aggregator::new(pepe_search())
        .with_market(Arc::new(Fixture("coingecko_coin_pepe.json")))
        .with_market(Arc::new(QuoteOnly(Some(0.0000100))));
    let report = agg.scan(&ScanRequest::new("pepe")).await.unwrap();
    assert_eq!(report.risks[0], "Price discrepancy >10% across APIs");
}

#[tokio::test]
async fn holder_and_sentiment_failures_are_recorded() {
    let agg = Aggregator::new(pepe_search())
        .with_market(Arc::new(Fixture("coingecko_coin_pepe.json")))
        .with_holders(Holders::new(true))
        .with_sentiment(Arc::new(Sentiment(false)));
    let report = agg.scan(&ScanRequest::new("pepe")).await.unwrap();
    assert!(report.holders.is_none());
    assert!(report.market_sentiment.is_none());
    assert_eq!(report.errors.len(), 2);
    assert!(report
        .errors
        .contains(&"Etherscan: No holder data from Etherscan".to_string()));
    assert!(report
        .errors
        .iter()
        .any(|e| e.starts_with("Fear/Greed Index: ")));
}

#[tokio::test]
async fn missing_market_data_is_no_data() {
    let agg = Aggregator::new(pepe_search())
        .with_market(Arc::new(Fixture("coingecko_coin_no_market.json")));
    let err = agg.scan(&ScanRequest::new("pepe")).await.unwrap_err();
    assert!(matches!(err, ScanError::NoData(_)));
    assert_eq!(
        err.to_string(),
        "No data found for \"pepe\". Check the coin name or try again later."
    );
}

#[tokio::test]
async fn empty_search_is_not_found() {
    let agg = Aggregator::new(Arc::new(Search(vec![]))).with_market(Arc::new(QuoteOnly(Some(1.0))));
    let err = agg.scan(&ScanRequest::new("nosuchcoin")).await.unwrap_err();
    assert!(matches!(err, ScanError::NotFound(ref t) if t == "nosuchcoin"));
}

#[tokio::test]
async fn native_coin_never_queries_holders() {
    let holders = Holders::new(false);
    let agg = Aggregator::new(pepe_search())
        .with_market(Arc::new(Fixture("coingecko_coin_pepe.json")))
        .with_holders(holders.clone())
        .with_native_coins(vec!["pepe".into()]);
    let report = agg.scan(&ScanRequest::new("pepe")).await.unwrap();
    assert_eq!(holders.calls.load(Ordering::SeqCst), 0);
    assert!(report.is_native);
    assert!(!report.risks.iter().any(|r| r.contains("Liquidity")));
}

#[tokio::test]
async fn reports_cache_by_coin_and_audit_link() {
    let agg = Aggregator::new(pepe_search()).with_market(Arc::new(Fixture("coingecko_coin_pepe.json")));
    let report = agg.scan(&ScanRequest::new("pepe")).await.unwrap();

    let cache = TtlCache::new(Duration::from_secs(60));
    cache.insert(report_key("pepe", ""), report.clone());
    assert_eq!(cache.get(&report_key("pepe", "")), Some(report));
    assert!(cache.get(&report_key("pepe", "https://audit.example")).is_none());
}
