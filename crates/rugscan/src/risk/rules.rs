//! Risk rules: price discrepancy, low volume, holder concentration, socials, liquidity.

use crate::model::{HolderSnapshot, LiquidityStatus, MarketQuote, Socials};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Max/min provider price ratio above which prices disagree.
    pub max_price_ratio: f64,
    /// Average 24h volume (USD) below which the market is illiquid.
    pub min_avg_volume: f64,
    /// Top-10 holder share (percent) at or above which supply is concentrated.
    pub max_top10_share_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            max_price_ratio: 1.10,
            min_avg_volume: 10_000.0,
            max_top10_share_pct: 18.0,
        }
    }
}

/// Facts the rules look at, already extracted from provider data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskInput {
    /// Positive prices, one per provider that reported one.
    pub prices: Vec<f64>,
    /// Positive 24h volumes, one per provider that reported one.
    pub volumes: Vec<f64>,
    pub top10_share_pct: Option<f64>,
    pub any_social_verified: bool,
    pub liquidity_locked: bool,
    pub is_native: bool,
}

impl RiskInput {
    pub fn from_snapshots<'a>(
        quotes: impl IntoIterator<Item = &'a MarketQuote>,
        holders: Option<&HolderSnapshot>,
        socials: &Socials,
        liquidity: &LiquidityStatus,
        is_native: bool,
    ) -> Self {
        let positive = |v: Option<f64>| v.filter(|x| x.is_finite() && *x > 0.0);
        let mut prices = Vec::new();
        let mut volumes = Vec::new();
        for q in quotes {
            prices.extend(positive(q.price));
            volumes.extend(positive(q.volume_24h));
        }
        Self {
            prices,
            volumes,
            top10_share_pct: holders.map(|h| h.total_top10),
            any_social_verified: socials.any_verified(),
            liquidity_locked: liquidity.locked,
            is_native,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskFlag {
    PriceDiscrepancy { ratio: f64 },
    LowVolume { average: f64 },
    HolderConcentration { top10_pct: f64 },
    NoVerifiedSocials,
    LiquidityNotLocked,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFlag::PriceDiscrepancy { .. } => write!(f, "Price discrepancy >10% across APIs"),
            RiskFlag::LowVolume { .. } => {
                write!(f, "Low trading volume: Potential illiquidity or scam")
            }
            RiskFlag::HolderConcentration { top10_pct } => write!(
                f,
                "High holder concentration: Top 10 holders own {:.2}%",
                top10_pct
            ),
            RiskFlag::NoVerifiedSocials => {
                write!(f, "No verified social media presence: Potential scam risk")
            }
            RiskFlag::LiquidityNotLocked => write!(f, "Liquidity not locked: Potential rug pull risk"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Low,
    High,
}

impl Verdict {
    pub fn text(self) -> &'static str {
        match self {
            Verdict::Low => "Low risk detected, but always DYOR. Not financial advice.",
            Verdict::High => "Potential risks detected. Avoid or verify manually.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub flags: Vec<RiskFlag>,
    pub verdict: Verdict,
}

impl RiskAssessment {
    /// Human-readable flag list, in evaluation order.
    pub fn messages(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }
}

/// Evaluate every rule in a fixed order. Verdict is low iff no flag fired.
pub fn evaluate_risks(input: &RiskInput, thresholds: &RiskThresholds) -> RiskAssessment {
    let mut flags = Vec::new();

    if input.prices.len() > 1 {
        let max = input.prices.iter().copied().fold(f64::MIN, f64::max);
        let min = input.prices.iter().copied().fold(f64::MAX, f64::min);
        let ratio = max / min;
        if ratio > thresholds.max_price_ratio {
            flags.push(RiskFlag::PriceDiscrepancy { ratio });
        }
    }

    if !input.volumes.is_empty() {
        let average = input.volumes.iter().sum::<f64>() / input.volumes.len() as f64;
        if average < thresholds.min_avg_volume {
            flags.push(RiskFlag::LowVolume { average });
        }
    }

    if let Some(top10_pct) = input.top10_share_pct {
        if top10_pct >= thresholds.max_top10_share_pct {
            flags.push(RiskFlag::HolderConcentration { top10_pct });
        }
    }

    if !input.any_social_verified {
        flags.push(RiskFlag::NoVerifiedSocials);
    }

    if !input.liquidity_locked && !input.is_native {
        flags.push(RiskFlag::LiquidityNotLocked);
    }

    let verdict = if flags.is_empty() {
        Verdict::Low
    } else {
        Verdict::High
    };
    RiskAssessment { flags, verdict }
}
