//! alternative.me fear & greed index.

use crate::model::SentimentSnapshot;
use crate::upstream::fetch::{FetchError, Fetcher};
use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct FngEntry {
    value: Option<String>,
    value_classification: Option<String>,
}

impl From<FngEntry> for SentimentSnapshot {
    /// Unparsable scores read as 0 and missing labels as "Neutral".
    fn from(e: FngEntry) -> Self {
        let value = e
            .value
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map_or(0, |v| v.min(100) as u8);
        let classification = e
            .value_classification
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Neutral".to_string());
        Self {
            value,
            classification,
        }
    }
}

impl Fetcher {
    /// Latest fear & greed reading.
    pub async fn fear_greed(&self) -> Result<SentimentSnapshot, FetchError> {
        let url = Url::parse(&self.endpoints().fear_greed)?;
        let res: FngResponse = self.get_json(url, &[]).await?;
        Ok(res.data.into_iter().next().unwrap_or_default().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_latest_entry() {
        let res: FngResponse = serde_json::from_value(serde_json::json!({
            "name": "Fear and Greed Index",
            "data": [ { "value": "72", "value_classification": "Greed", "timestamp": "1700000000" } ]
        }))
        .unwrap();
        let snap: SentimentSnapshot = res.data.into_iter().next().unwrap().into();
        assert_eq!(snap.value, 72);
        assert_eq!(snap.classification, "Greed");
    }

    #[test]
    fn defaults_on_missing_fields() {
        let snap: SentimentSnapshot = FngEntry {
            value: Some("n/a".into()),
            value_classification: None,
        }
        .into();
        assert_eq!(snap.value, 0);
        assert_eq!(snap.classification, "Neutral");
    }
}
