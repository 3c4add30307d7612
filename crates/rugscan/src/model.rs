//! Provider-neutral data model shared by fetchers, the risk evaluator and the report.

use serde::{Deserialize, Serialize};

/// Canonical identifier a free-text query resolved to. Fixed for the rest of a scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCoin {
    pub id: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One provider's view of the market. Every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub price_change_24h: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SocialLink {
    pub fn linked(handle: Option<String>, url: String) -> Self {
        Self {
            verified: true,
            handle,
            url: Some(url),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

/// Tracked social channels. A channel counts as verified when the project lists it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Socials {
    pub twitter: SocialLink,
    pub facebook: SocialLink,
    pub instagram: SocialLink,
    pub telegram: SocialLink,
    pub discord: SocialLink,
    pub reddit: SocialLink,
}

impl Socials {
    /// Channels in display order, with their labels.
    pub fn channels(&self) -> [(&'static str, &SocialLink); 6] {
        [
            ("X", &self.twitter),
            ("Facebook", &self.facebook),
            ("Instagram", &self.instagram),
            ("Telegram", &self.telegram),
            ("Discord", &self.discord),
            ("Reddit", &self.reddit),
        ]
    }

    pub fn any_verified(&self) -> bool {
        self.channels().iter().any(|(_, link)| link.verified)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub twitter_followers: u64,
    pub telegram_members: u64,
    pub reddit_subscribers: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    pub github: Option<String>,
    /// Commits over the last four weeks.
    pub commits: u64,
    pub stars: u64,
    pub last_update: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tokenomics {
    pub circulating_supply: f64,
    pub total_supply: f64,
    pub max_supply: Option<f64>,
}

/// Contract addresses the primary provider lists per platform. Empty strings are stored as `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Platforms {
    pub bsc: Option<String>,
    pub ethereum: Option<String>,
    pub solana: Option<String>,
}

impl Platforms {
    /// First known contract address, BSC before Ethereum before Solana.
    pub fn contract_address(&self) -> Option<&str> {
        self.bsc
            .as_deref()
            .or(self.ethereum.as_deref())
            .or(self.solana.as_deref())
    }

    /// Chain the contract lives on, by the same precedence as [`Self::contract_address`].
    pub fn chain(&self) -> Option<Chain> {
        if self.bsc.is_some() {
            Some(Chain::Bsc)
        } else if self.ethereum.is_some() {
            Some(Chain::Ethereum)
        } else if self.solana.is_some() {
            Some(Chain::Other)
        } else {
            None
        }
    }
}

/// Everything beyond a quote that only the primary market provider supplies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinProfile {
    pub socials: Socials,
    pub community: Community,
    pub developer: Developer,
    pub tokenomics: Tokenomics,
    pub platforms: Platforms,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Ethereum,
    Bsc,
    Other,
}

impl Chain {
    /// Chains with a supported holder-list explorer.
    pub fn has_holder_explorer(self) -> bool {
        matches!(self, Chain::Ethereum | Chain::Bsc)
    }

    pub fn explorer_name(self) -> &'static str {
        match self {
            Chain::Ethereum => "Etherscan",
            Chain::Bsc => "BscScan",
            Chain::Other => "Explorer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Bsc => "BSC",
            Chain::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub address: String,
    pub balance: f64,
    /// Share of total supply, in percent.
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderSnapshot {
    pub chain: Chain,
    pub top_holders: Vec<Holder>,
    pub total_top10: f64,
}

impl HolderSnapshot {
    /// Build from raw balances and a total supply expressed in the same units.
    pub fn from_balances(chain: Chain, balances: Vec<(String, f64)>, total_supply: f64) -> Self {
        let supply = if total_supply > 0.0 { total_supply } else { 1.0 };
        let top_holders: Vec<Holder> = balances
            .into_iter()
            .map(|(address, balance)| Holder {
                address,
                balance,
                percentage: balance / supply * 100.0,
            })
            .collect();
        let total_top10 = top_holders.iter().take(10).map(|h| h.percentage).sum();
        Self {
            chain,
            top_holders,
            total_top10,
        }
    }
}

/// Fear & greed reading: score 0..=100 and its label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub value: u8,
    pub classification: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityStatus {
    pub locked: bool,
    pub note: String,
}

impl LiquidityStatus {
    /// None of the tracked providers expose lock status.
    pub fn unverified() -> Self {
        Self {
            locked: false,
            note: "Liquidity lock status unavailable. Verify manually on Etherscan/BscScan."
                .to_string(),
        }
    }
}
