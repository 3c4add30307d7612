//! CoinGecko: coin search, coin detail (quote + profile), and news.

use crate::model::{
    CoinProfile, Community, Developer, MarketQuote, Platforms, SocialLink, Socials, Tokenomics,
};
use crate::news::NewsArticle;
use crate::upstream::fetch::{endpoint_url, FetchError, Fetcher};
use crate::upstream::normalize::non_empty;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const QUOTE_CURRENCY: &str = "usd";

#[derive(Clone, Debug, Deserialize)]
struct CgSearchResponse {
    #[serde(default)]
    coins: Vec<CgSearchCoin>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CgSearchCoin {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgCoin {
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default)]
    pub platforms: HashMap<String, Option<String>>,
    pub links: Option<CgLinks>,
    pub community_data: Option<CgCommunity>,
    pub developer_data: Option<CgDeveloper>,
    pub market_data: Option<CgMarketData>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgLinks {
    pub twitter_screen_name: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
    pub telegram_channel_identifier: Option<String>,
    #[serde(default)]
    pub chat_url: Vec<Option<String>>,
    pub subreddit_url: Option<String>,
    pub repos_url: Option<CgRepos>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgRepos {
    #[serde(default)]
    pub github: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgCommunity {
    pub twitter_followers: Option<f64>,
    pub telegram_channel_user_count: Option<f64>,
    pub reddit_subscribers: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgDeveloper {
    pub commit_count_4_weeks: Option<f64>,
    pub stars: Option<f64>,
    pub last_commit_date: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CgMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub total_volume: HashMap<String, Option<f64>>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
struct CgNewsResponse {
    #[serde(default)]
    data: Vec<CgNewsItem>,
}

#[derive(Clone, Debug, Deserialize)]
struct CgNewsItem {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    news_site: Option<String>,
    author: Option<String>,
    thumb_2x: Option<String>,
    thumb: Option<String>,
    updated_at: Option<serde_json::Value>,
}

fn count(v: Option<f64>) -> u64 {
    v.filter(|x| x.is_finite() && *x > 0.0).map_or(0, |x| x as u64)
}

fn usd(map: &HashMap<String, Option<f64>>) -> Option<f64> {
    map.get(QUOTE_CURRENCY).copied().flatten()
}

impl CgCoin {
    /// Split a coin payload into its quote and profile. Fails without market data.
    pub fn into_parts(self) -> Result<(MarketQuote, CoinProfile), FetchError> {
        let market = self
            .market_data
            .ok_or_else(|| FetchError::Invalid("Invalid market data".to_string()))?;
        let quote = MarketQuote {
            name: self.name,
            symbol: self.symbol,
            price: usd(&market.current_price),
            market_cap: usd(&market.market_cap),
            volume_24h: usd(&market.total_volume),
            price_change_24h: market.price_change_percentage_24h,
        };

        let links = self.links.unwrap_or_default();
        let community = self.community_data.unwrap_or_default();
        let developer = self.developer_data.unwrap_or_default();
        let platform = |key: &str| non_empty(self.platforms.get(key).cloned().flatten());

        let profile = CoinProfile {
            socials: socials_from_links(&links),
            community: Community {
                twitter_followers: count(community.twitter_followers),
                telegram_members: count(community.telegram_channel_user_count),
                reddit_subscribers: count(community.reddit_subscribers),
            },
            developer: Developer {
                github: links
                    .repos_url
                    .as_ref()
                    .and_then(|r| r.github.first().cloned())
                    .and_then(|g| non_empty(Some(g))),
                commits: count(developer.commit_count_4_weeks),
                stars: count(developer.stars),
                last_update: non_empty(developer.last_commit_date),
            },
            tokenomics: Tokenomics {
                circulating_supply: market.circulating_supply.unwrap_or(0.0),
                total_supply: market.total_supply.unwrap_or(0.0),
                max_supply: market.max_supply.filter(|m| *m > 0.0),
            },
            platforms: Platforms {
                bsc: platform("binance-smart-chain"),
                ethereum: platform("ethereum"),
                solana: platform("solana"),
            },
        };
        Ok((quote, profile))
    }
}

fn socials_from_links(links: &CgLinks) -> Socials {
    let twitter = non_empty(links.twitter_screen_name.clone());
    let facebook = non_empty(links.facebook_username.clone());
    let instagram = non_empty(links.instagram_username.clone());
    let telegram = non_empty(links.telegram_channel_identifier.clone());
    let discord = links
        .chat_url
        .iter()
        .flatten()
        .find(|u| u.contains("discord"))
        .cloned();
    let reddit = non_empty(links.subreddit_url.clone());

    Socials {
        twitter: twitter.map_or_else(SocialLink::missing, |h| {
            SocialLink::linked(Some(format!("@{}", h)), format!("https://x.com/{}", h))
        }),
        facebook: facebook.map_or_else(SocialLink::missing, |h| {
            SocialLink::linked(Some(h.clone()), format!("https://facebook.com/{}", h))
        }),
        instagram: instagram.map_or_else(SocialLink::missing, |h| {
            SocialLink::linked(Some(h.clone()), format!("https://instagram.com/{}", h))
        }),
        telegram: telegram.map_or_else(SocialLink::missing, |h| {
            let url = format!("https://t.me/{}", h.trim_start_matches('@'));
            SocialLink::linked(Some(h), url)
        }),
        discord: discord.map_or_else(SocialLink::missing, |u| SocialLink::linked(None, u)),
        reddit: reddit.map_or_else(SocialLink::missing, |u| {
            let handle = u
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .map(str::to_string);
            SocialLink::linked(handle, u)
        }),
    }
}

impl Fetcher {
    fn coingecko_headers(&self) -> Vec<(&str, &str)> {
        self.config()
            .coingecko_api_key
            .as_deref()
            .map(|k| vec![(API_KEY_HEADER, k)])
            .unwrap_or_default()
    }

    /// Search CoinGecko for coins matching `term`, best-ranked first.
    pub async fn coingecko_search(&self, term: &str) -> Result<Vec<CgSearchCoin>, FetchError> {
        let path = format!("/search?query={}", urlencoding::encode(term));
        let url = endpoint_url(&self.endpoints().coingecko, &path)?;
        let res: CgSearchResponse = self.get_json(url, &self.coingecko_headers()).await?;
        info!(term, count = res.coins.len(), "coingecko search");
        Ok(res.coins)
    }

    /// Full coin record: market data, links, community and developer stats.
    pub async fn coingecko_coin(&self, id: &str) -> Result<CgCoin, FetchError> {
        let path = format!("/coins/{}", urlencoding::encode(id));
        let url = endpoint_url(&self.endpoints().coingecko, &path)?;
        self.get_json(url, &self.coingecko_headers()).await
    }

    pub async fn coingecko_news_feed(&self) -> Result<Vec<NewsArticle>, FetchError> {
        let mut url = endpoint_url(&self.endpoints().coingecko, "/news")?;
        if let Some(key) = self.config().coingecko_news_api_key.as_deref() {
            url.query_pairs_mut().append_pair("x_cg_api_key", key);
        }
        let res: CgNewsResponse = self.get_json(url, &[]).await?;
        Ok(res.data.into_iter().filter_map(article_from_item).collect())
    }
}

fn article_from_item(item: CgNewsItem) -> Option<NewsArticle> {
    let title = non_empty(item.title)?;
    let url = non_empty(item.url)?;
    let published = item.updated_at.and_then(|v| match v {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) => non_empty(Some(s)),
        _ => None,
    });
    Some(NewsArticle {
        title,
        url,
        source: non_empty(item.news_site).or(non_empty(item.author)),
        published,
        thumbnail: non_empty(item.thumb_2x).or(non_empty(item.thumb)),
        summary: non_empty(item.description),
    })
}
