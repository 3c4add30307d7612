//! CoinPaprika ticker: a second, key-less market quote.

use crate::model::{MarketQuote, ResolvedCoin};
use crate::upstream::fetch::{endpoint_url, FetchError, Fetcher};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Clone, Debug, Deserialize)]
struct PaprikaTicker {
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    quotes: HashMap<String, PaprikaQuote>,
}

#[derive(Clone, Debug, Deserialize)]
struct PaprikaQuote {
    price: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
    percent_change_24h: Option<f64>,
}

/// Paprika ids are `<symbol>-<slug>`, which matches CoinGecko slugs for most listed coins.
pub(crate) fn paprika_id(coin: &ResolvedCoin) -> String {
    format!("{}-{}", coin.symbol.to_lowercase(), coin.id.to_lowercase())
}

impl PaprikaTicker {
    fn into_quote(self) -> Result<MarketQuote, FetchError> {
        let usd = self
            .quotes
            .get("USD")
            .ok_or_else(|| FetchError::Invalid("Missing USD quote".to_string()))?;
        Ok(MarketQuote {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            price: usd.price,
            market_cap: usd.market_cap,
            volume_24h: usd.volume_24h,
            price_change_24h: usd.percent_change_24h,
        })
    }
}

impl Fetcher {
    pub async fn coinpaprika_quote(&self, coin: &ResolvedCoin) -> Result<MarketQuote, FetchError> {
        let path = format!("/tickers/{}", urlencoding::encode(&paprika_id(coin)));
        let url = endpoint_url(&self.endpoints().coinpaprika, &path)?;
        let ticker: PaprikaTicker = self.get_json(url, &[]).await?;
        ticker.into_quote()
    }
}
