//! RSS feeds through the rss2json bridge (crypto.news).

use crate::news::NewsArticle;
use crate::upstream::fetch::{FetchError, Fetcher};
use crate::upstream::normalize::non_empty;
use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug, Deserialize)]
struct RssResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<RssItem>,
}

#[derive(Clone, Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    author: Option<String>,
    thumbnail: Option<String>,
    description: Option<String>,
}

fn articles_from(res: RssResponse, source: &str) -> Result<Vec<NewsArticle>, FetchError> {
    if let Some(status) = res.status.as_deref() {
        if status != "ok" {
            return Err(FetchError::Upstream(
                res.message.unwrap_or_else(|| format!("feed status {}", status)),
            ));
        }
    }
    Ok(res
        .items
        .into_iter()
        .filter_map(|item| {
            Some(NewsArticle {
                title: non_empty(item.title)?,
                url: non_empty(item.link)?,
                source: non_empty(item.author).or_else(|| Some(source.to_string())),
                published: non_empty(item.pub_date),
                thumbnail: non_empty(item.thumbnail),
                summary: non_empty(item.description),
            })
        })
        .collect())
}

impl Fetcher {
    /// Latest crypto.news articles.
    pub async fn cryptonews_feed(&self) -> Result<Vec<NewsArticle>, FetchError> {
        let endpoints = self.endpoints();
        let url = Url::parse_with_params(
            &endpoints.rss2json,
            &[("rss_url", endpoints.cryptonews_feed.as_str())],
        )?;
        let res: RssResponse = self.get_json(url, &[]).await?;
        articles_from(res, "crypto.news")
    }
}
