//! Identifier resolution: free-text query to canonical coin id.

use crate::model::ResolvedCoin;
use crate::providers::CoinSearch;
use crate::upstream::FetchError;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no candidates for \"{0}\"")]
    NoCandidates(String),
    #[error("search: {0}")]
    Search(#[from] FetchError),
}

/// First candidate whose symbol equals `term` or whose id contains it (case-insensitive),
/// else the first candidate.
pub fn select_best_match(candidates: Vec<ResolvedCoin>, term: &str) -> Option<ResolvedCoin> {
    let needle = term.to_lowercase();
    let best = candidates
        .iter()
        .position(|c| c.id.to_lowercase().contains(&needle) || c.symbol.to_lowercase() == needle)
        .unwrap_or(0);
    candidates.into_iter().nth(best)
}

pub async fn resolve_coin(search: &dyn CoinSearch, term: &str) -> Result<ResolvedCoin, ResolveError> {
    let candidates = search.search(term).await.inspect_err(|e| {
        warn!(term, error = %e, "coin search failed");
    })?;
    let coin = select_best_match(candidates, term)
        .ok_or_else(|| ResolveError::NoCandidates(term.to_string()))?;
    info!(term, id = %coin.id, symbol = %coin.symbol, "resolved coin");
    Ok(coin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn coin(id: &str, symbol: &str) -> ResolvedCoin {
        ResolvedCoin {
            id: id.into(),
            symbol: symbol.into(),
            name: None,
        }
    }

    #[test]
    fn exact_symbol_wins_over_rank() {
        let picked = select_best_match(
            vec![coin("wrapped-bitcoin", "WBTC"), coin("pepe", "PEPE")],
            "pepe",
        )
        .unwrap();
        assert_eq!(picked.id, "pepe");
    }

    #[test]
    fn id_substring_matches() {
        let picked = select_best_match(
            vec![coin("x-token", "XT"), coin("shiba-inu", "SHIB")],
            "shiba",
        )
        .unwrap();
        assert_eq!(picked.id, "shiba-inu");
    }

    #[test]
    fn falls_back_to_first() {
        let picked =
            select_best_match(vec![coin("aaa", "A"), coin("bbb", "B")], "zzz").unwrap();
        assert_eq!(picked.id, "aaa");
    }

    #[test]
    fn empty_candidates_is_none() {
        assert!(select_best_match(vec![], "btc").is_none());
    }

    struct FixedSearch(Result<Vec<ResolvedCoin>, u16>);

    #[async_trait]
    impl CoinSearch for FixedSearch {
        async fn search(&self, _term: &str) -> Result<Vec<ResolvedCoin>, FetchError> {
            match &self.0 {
                Ok(c) => Ok(c.clone()),
                Err(status) => Err(FetchError::Api(*status, String::new())),
            }
        }
    }

    #[tokio::test]
    async fn resolve_errors() {
        let empty = FixedSearch(Ok(vec![]));
        assert!(matches!(
            resolve_coin(&empty, "x").await,
            Err(ResolveError::NoCandidates(_))
        ));
        let down = FixedSearch(Err(500));
        assert!(matches!(
            resolve_coin(&down, "x").await,
            Err(ResolveError::Search(_))
        ));
        let ok = FixedSearch(Ok(vec![coin("bitcoin", "btc")]));
        assert_eq!(resolve_coin(&ok, "btc").await.unwrap().id, "bitcoin");
    }
}
