//! Assembled scan result (HTML is rendered in the rugscan_report crate).

use crate::model::{
    Chain, Community, Developer, HolderSnapshot, LiquidityStatus, MarketQuote, ResolvedCoin,
    SentimentSnapshot, Socials, Tokenomics,
};
use crate::risk::{RiskAssessment, RiskFlag};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::macros::format_description;
use time::OffsetDateTime;

pub use crate::risk::Verdict;

/// One market provider's quote, kept for the per-provider comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
    pub provider: String,
    pub quote: MarketQuote,
}

/// Everything one scan produced. Serialized as the camelCase response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinReport {
    /// `YYYY-MM-DD HH:MM:SS UTC`.
    pub search_time: String,
    /// Seconds.
    pub query_duration: f64,
    pub coin: ResolvedCoin,
    /// Primary provider's quote.
    pub data: MarketQuote,
    pub providers: Vec<ProviderQuote>,
    pub market_sentiment: Option<SentimentSnapshot>,
    pub socials: Socials,
    pub community: Community,
    pub developer: Developer,
    pub tokenomics: Tokenomics,
    pub liquidity: LiquidityStatus,
    pub holders: Option<HolderSnapshot>,
    pub risks: Vec<String>,
    pub flags: Vec<RiskFlag>,
    pub risk_level: Verdict,
    pub verdict: String,
    pub chain: Option<Chain>,
    pub chain_info: Option<String>,
    pub is_native: bool,
    pub audit_link: Option<String>,
    pub errors: Vec<String>,
}

impl CoinReport {
    /// Display name: primary quote's name, else the resolved name, else the id.
    pub fn display_name(&self) -> &str {
        self.data
            .name
            .as_deref()
            .or(self.coin.name.as_deref())
            .unwrap_or(&self.coin.id)
    }

    /// Display symbol, upper-cased as the market providers report it.
    pub fn display_symbol(&self) -> String {
        self.data
            .symbol
            .as_deref()
            .unwrap_or(&self.coin.symbol)
            .to_uppercase()
    }

    pub fn set_risks(&mut self, assessment: RiskAssessment) {
        self.risks = assessment.messages();
        self.verdict = assessment.verdict.text().to_string();
        self.risk_level = assessment.verdict;
        self.flags = assessment.flags;
    }

    /// Stamp the current time and the time spent since the request started.
    pub fn stamp(&mut self, now: OffsetDateTime, elapsed: Duration) {
        self.search_time = format_search_time(now);
        self.query_duration = elapsed.as_secs_f64();
    }
}

pub fn format_search_time(t: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    let utc = t.to_offset(time::UtcOffset::UTC);
    utc.format(&fmt)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> CoinReport {
        CoinReport {
            search_time: String::new(),
            query_duration: 0.0,
            coin: ResolvedCoin {
                id: "pepe".into(),
                symbol: "pepe".into(),
                name: None,
            },
            data: MarketQuote::default(),
            providers: vec![],
            market_sentiment: None,
            socials: Socials::default(),
            community: Community::default(),
            developer: Developer::default(),
            tokenomics: Tokenomics::default(),
            liquidity: LiquidityStatus::unverified(),
            holders: None,
            risks: vec![],
            flags: vec![],
            risk_level: Verdict::Low,
            verdict: Verdict::Low.text().to_string(),
            chain: None,
            chain_info: None,
            is_native: false,
            audit_link: None,
            errors: vec![],
        }
    }

    #[test]
    fn search_time_is_utc() {
        let t = datetime!(2024-03-05 07:08:09 +02:00);
        assert_eq!(format_search_time(t), "2024-03-05 05:08:09 UTC");
    }

    #[test]
    fn stamp_refreshes_timing() {
        let mut r = sample();
        r.stamp(datetime!(2024-01-01 00:00:00 UTC), Duration::from_millis(1500));
        assert_eq!(r.search_time, "2024-01-01 00:00:00 UTC");
        assert!((r.query_duration - 1.5).abs() < 1e-9);
    }

    #[test]
    fn names_fall_back_to_coin() {
        let mut r = sample();
        assert_eq!(r.display_name(), "pepe");
        assert_eq!(r.display_symbol(), "PEPE");
        r.data.name = Some("Pepe".into());
        assert_eq!(r.display_name(), "Pepe");
    }

    #[test]
    fn serializes_camel_case() {
        let v = serde_json::to_value(sample()).unwrap();
        for key in [
            "searchTime",
            "queryDuration",
            "marketSentiment",
            "riskLevel",
            "chainInfo",
            "auditLink",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["riskLevel"], "low");
    }
}
