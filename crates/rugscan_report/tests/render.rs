//! Document rendering to disk.

use rugscan::model::{
    Community, Developer, LiquidityStatus, MarketQuote, ResolvedCoin, SentimentSnapshot, SocialLink,
    Socials, Tokenomics,
};
use rugscan::{CoinReport, Verdict};
use rugscan_report::{document_file_name, render_document};

fn bitcoin() -> CoinReport {
    CoinReport {
        search_time: "2024-05-01 12:00:00 UTC".into(),
        query_duration: 0.42,
        coin: ResolvedCoin {
            id: "bitcoin".into(),
            symbol: "btc".into(),
            name: Some("Bitcoin".into()),
        },
        data: MarketQuote {
            name: Some("Bitcoin".into()),
            symbol: Some("btc".into()),
            price: Some(64_250.5),
            market_cap: Some(1_265_000_000_000.0),
            volume_24h: Some(31_000_000_000.0),
            price_change_24h: Some(1.5),
        },
        providers: vec![],
        market_sentiment: Some(SentimentSnapshot {
            value: 72,
            classification: "Greed".into(),
        }),
        socials: Socials {
            twitter: SocialLink::linked(Some("@bitcoin".into()), "https://x.com/bitcoin".into()),
            ..Default::default()
        },
        community: Community {
            twitter_followers: 6_800_000,
            ..Default::default()
        },
        developer: Developer {
            github: Some("https://github.com/bitcoin/bitcoin".into()),
            commits: 120,
            stars: 77_000,
            last_update: None,
        },
        tokenomics: Tokenomics {
            circulating_supply: 19_700_000.0,
            total_supply: 21_000_000.0,
            max_supply: Some(21_000_000.0),
        },
        liquidity: LiquidityStatus::unverified(),
        holders: None,
        risks: vec![],
        flags: vec![],
        risk_level: Verdict::Low,
        verdict: Verdict::Low.text().into(),
        chain: None,
        chain_info: Some("Native chain coin (e.g., BNB on BSC). Holder data unavailable.".into()),
        is_native: true,
        audit_link: None,
        errors: vec![],
    }
}

#[test]
fn render_document_writes_file() {
    let report = bitcoin();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(document_file_name(&report));
    render_document(&report, &path).unwrap();

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(path.ends_with("rugscan-bitcoin.html"));
    assert!(html.contains("<h2>Bitcoin</h2>"));
    assert!(html.contains("$64250.500000"));
    assert!(html.contains("$1,265,000,000,000"));
    assert!(html.contains("Greed (72/100)"));
    assert!(html.contains("6,800,000"));
    assert!(html.contains("Developer Activity"));
    assert!(html.contains("21,000,000 BTC"));
    assert!(html.contains("verdict-low"));
    assert!(!html.contains("Rug Pull Risks"));
}

#[test]
fn render_document_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-dir").join("out.html");
    let err = render_document(&bitcoin(), &missing).unwrap_err();
    assert!(err.to_string().starts_with("io: "));
}
