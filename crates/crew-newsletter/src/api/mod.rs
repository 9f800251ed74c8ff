//! External data clients

pub mod market;
pub mod search;

pub use market::{DailyBar, MarketDataClient};
pub use search::{DuckDuckGoClient, NewsArticle};
