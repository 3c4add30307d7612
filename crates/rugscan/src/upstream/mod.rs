//! Upstream API clients, the report cache, and input normalization.

mod cache;
mod coingecko;
mod coinpaprika;
mod explorer;
pub(crate) mod fetch;
mod feeds;
mod normalize;
mod sentiment;

pub use cache::{key_for, report_key, TtlCache};
pub use coingecko::{CgCoin, CgSearchCoin};
pub use fetch::{FetchConfig, FetchError, Fetcher};
pub use normalize::{clean_coin_id, parse_quantity};
