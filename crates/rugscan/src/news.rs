//! News digest: two public feeds fetched side by side, each allowed to fail alone.

use crate::upstream::{FetchError, Fetcher};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published: Option<String>,
    pub thumbnail: Option<String>,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub coingecko: Vec<NewsArticle>,
    pub cryptonews: Vec<NewsArticle>,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn coingecko_news(&self) -> Result<Vec<NewsArticle>, FetchError>;
    async fn cryptonews(&self) -> Result<Vec<NewsArticle>, FetchError>;
}

#[async_trait]
impl NewsSource for Fetcher {
    async fn coingecko_news(&self) -> Result<Vec<NewsArticle>, FetchError> {
        self.coingecko_news_feed().await
    }

    async fn cryptonews(&self) -> Result<Vec<NewsArticle>, FetchError> {
        self.cryptonews_feed().await
    }
}

fn or_empty(feed: &str, res: Result<Vec<NewsArticle>, FetchError>) -> Vec<NewsArticle> {
    match res {
        Ok(articles) => {
            info!(feed, count = articles.len(), "news feed");
            articles
        }
        Err(e) => {
            warn!(feed, error = %e, "news feed failed");
            Vec::new()
        }
    }
}

/// Fetch both feeds concurrently. A failed feed contributes an empty list.
pub async fn collect_news(source: &dyn NewsSource) -> NewsDigest {
    let (cg, cn) = tokio::join!(source.coingecko_news(), source.cryptonews());
    NewsDigest {
        coingecko: or_empty("coingecko", cg),
        cryptonews: or_empty("cryptonews", cn),
    }
}
