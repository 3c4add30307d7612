//! Etherscan / BscScan: top token holders and raw token supply.

use crate::model::Chain;
use crate::upstream::fetch::{FetchError, Fetcher};
use crate::upstream::normalize::parse_quantity;
use serde::Deserialize;
use tracing::info;
use url::Url;

pub(crate) const TOP_HOLDER_COUNT: usize = 10;

/// Both explorers share one envelope; `result` is an error string when `status != "1"`.
#[derive(Clone, Debug, Deserialize)]
struct ExplorerEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExplorerHolder {
    token_holder_address: String,
    token_holder_quantity: String,
}

impl ExplorerEnvelope {
    fn ok_result(self, explorer: &str) -> Result<serde_json::Value, FetchError> {
        if self.status != "1" {
            let detail = match &self.result {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                _ => self.message.unwrap_or_default(),
            };
            return Err(FetchError::Upstream(format!(
                "No holder data from {} ({})",
                explorer, detail
            )));
        }
        Ok(self.result)
    }
}

fn parse_holders(result: serde_json::Value, explorer: &str) -> Result<Vec<(String, f64)>, FetchError> {
    let holders: Vec<ExplorerHolder> =
        serde_json::from_value(result).map_err(|e| FetchError::Decode(e.to_string()))?;
    let balances: Vec<(String, f64)> = holders
        .into_iter()
        .filter_map(|h| {
            parse_quantity(&h.token_holder_quantity).map(|q| (h.token_holder_address, q))
        })
        .collect();
    if balances.is_empty() {
        return Err(FetchError::Upstream(format!("No holder data from {}", explorer)));
    }
    Ok(balances)
}

fn parse_supply(result: serde_json::Value) -> Result<f64, FetchError> {
    let supply = match &result {
        serde_json::Value::String(s) => parse_quantity(s),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    };
    supply
        .filter(|s| *s > 0.0)
        .ok_or_else(|| FetchError::Invalid("Token supply unavailable".to_string()))
}

impl Fetcher {
    fn explorer_url(&self, chain: Chain, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let (base, key) = match chain {
            Chain::Bsc => (
                &self.endpoints().bscscan,
                self.config().bscscan_api_key.as_deref(),
            ),
            _ => (
                &self.endpoints().etherscan,
                self.config().etherscan_api_key.as_deref(),
            ),
        };
        let mut url = Url::parse_with_params(base, params)?;
        if let Some(key) = key {
            url.query_pairs_mut().append_pair("apikey", key);
        }
        Ok(url)
    }

    /// Largest holders of `contract`, as (address, raw balance).
    pub async fn explorer_top_holders(
        &self,
        chain: Chain,
        contract: &str,
    ) -> Result<Vec<(String, f64)>, FetchError> {
        let offset = TOP_HOLDER_COUNT.to_string();
        let url = self.explorer_url(
            chain,
            &[
                ("module", "token"),
                ("action", "tokenholderlist"),
                ("contractaddress", contract),
                ("page", "1"),
                ("offset", &offset),
            ],
        )?;
        let explorer = chain.explorer_name();
        let env: ExplorerEnvelope = self.get_json(url, &[]).await?;
        let holders = parse_holders(env.ok_result(explorer)?, explorer)?;
        info!(explorer, contract, count = holders.len(), "top holders");
        Ok(holders)
    }

    /// Total supply of `contract` in raw units, comparable with holder balances.
    pub async fn explorer_token_supply(&self, chain: Chain, contract: &str) -> Result<f64, FetchError> {
        let url = self.explorer_url(
            chain,
            &[
                ("module", "stats"),
                ("action", "tokensupply"),
                ("contractaddress", contract),
            ],
        )?;
        let env: ExplorerEnvelope = self.get_json(url, &[]).await?;
        parse_supply(env.ok_result(chain.explorer_name())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::FetchConfig;

    #[test]
    fn holder_list_parses() {
        let env: ExplorerEnvelope = serde_json::from_value(serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [
                { "TokenHolderAddress": "0xaaa", "TokenHolderQuantity": "5000" },
                { "TokenHolderAddress": "0xbbb", "TokenHolderQuantity": "bogus" },
                { "TokenHolderAddress": "0xccc", "TokenHolderQuantity": "2500" }
            ]
        }))
        .unwrap();
        let holders = parse_holders(env.ok_result("Etherscan").unwrap(), "Etherscan").unwrap();
        assert_eq!(
            holders,
            vec![("0xaaa".to_string(), 5000.0), ("0xccc".to_string(), 2500.0)]
        );
    }

    #[test]
    fn failed_status_is_upstream_error() {
        let env: ExplorerEnvelope = serde_json::from_value(serde_json::json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }))
        .unwrap();
        let err = env.ok_result("BscScan").unwrap_err();
        assert_eq!(err.to_string(), "No holder data from BscScan (Invalid API Key)");
    }

    #[test]
    fn empty_holder_list_is_error() {
        let err = parse_holders(serde_json::json!([]), "Etherscan").unwrap_err();
        assert_eq!(err.to_string(), "No holder data from Etherscan");
    }

    #[test]
    fn supply_parses_string_or_number() {
        assert_eq!(parse_supply(serde_json::json!("1000000")).unwrap(), 1_000_000.0);
        assert_eq!(parse_supply(serde_json::json!(42)).unwrap(), 42.0);
        assert!(parse_supply(serde_json::json!("0")).is_err());
    }

    #[test]
    fn explorer_url_picks_chain_and_key() {
        let fetcher = Fetcher::new(FetchConfig {
            bscscan_api_key: Some("bkey".into()),
            ..Default::default()
        })
        .unwrap();
        let url = fetcher
            .explorer_url(Chain::Bsc, &[("module", "token"), ("contractaddress", "0xabc")])
            .unwrap();
        assert_eq!(url.host_str(), Some("api.bscscan.com"));
        assert_eq!(url.query(), Some("module=token&contractaddress=0xabc&apikey=bkey"));

        let url = fetcher
            .explorer_url(Chain::Ethereum, &[("module", "stats")])
            .unwrap();
        assert_eq!(url.host_str(), Some("api.etherscan.io"));
        assert_eq!(url.query(), Some("module=stats"));
    }
}
