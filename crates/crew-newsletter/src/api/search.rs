//! DuckDuckGo news search client
//!
//! DuckDuckGo has no official API. The news endpoint (`news.js`) works
//! like the browser client: first request the HTML search page to obtain
//! a `vqd` session token, then call the JSON endpoint with it. Requests
//! are rate limited to stay well under the endpoint's tolerance.

use crate::error::{NewsletterError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const SEARCH_URL: &str = "https://duckduckgo.com/";
const NEWS_URL: &str = "https://duckduckgo.com/news.js";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// A news article returned by the search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Article headline
    pub title: String,
    /// Short excerpt of the article body
    pub excerpt: String,
    /// Article URL
    pub url: String,
    /// Publisher name
    pub source: String,
    /// Publish time (UNIX timestamp)
    pub date: i64,
}

/// Wire format of the news.js endpoint
#[derive(Debug, Deserialize)]
struct NewsResponse {
    results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    title: String,
    #[serde(default)]
    excerpt: String,
    url: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    date: i64,
}

/// DuckDuckGo client for news search
pub struct DuckDuckGoClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

impl DuckDuckGoClient {
    /// Create a new client with rate limiting
    ///
    /// # Arguments
    /// * `rate_limit` - Requests per minute
    pub fn new(rate_limit: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(20).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            rate_limiter,
        }
    }

    /// Search recent news for a query
    ///
    /// # Arguments
    /// * `query` - Search terms (e.g. "AAPL stock")
    /// * `limit` - Maximum number of results to return
    pub async fn search_news(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        let vqd = self.fetch_vqd(query).await?;
        debug!(query = %query, "Obtained vqd token");

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(NEWS_URL)
            .header("User-Agent", USER_AGENT)
            .query(&[
                ("l", "us-en"),
                ("o", "json"),
                ("noamp", "1"),
                ("q", query),
                ("vqd", &vqd),
                ("p", "-1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsletterError::SearchError(format!(
                "news endpoint returned {status}: {body}"
            )));
        }

        let news: NewsResponse = response
            .json()
            .await
            .map_err(|e| NewsletterError::SearchError(format!("failed to parse results: {e}")))?;

        Ok(news
            .results
            .into_iter()
            .take(limit)
            .map(|r| NewsArticle {
                title: r.title,
                excerpt: r.excerpt,
                url: r.url,
                source: r.source,
                date: r.date,
            })
            .collect())
    }

    /// Request the HTML search page and extract the vqd session token
    async fn fetch_vqd(&self, query: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(SEARCH_URL)
            .header("User-Agent", USER_AGENT)
            .query(&[("q", query), ("iar", "news")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsletterError::SearchError(format!(
                "search page returned {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        extract_vqd(&html).ok_or_else(|| {
            NewsletterError::SearchError("vqd token not found in search page".to_string())
        })
    }
}

/// Pull the vqd token out of the search page HTML
///
/// The token appears as `vqd="..."`, `vqd='...'` or `vqd=...&` depending
/// on the page variant.
fn extract_vqd(html: &str) -> Option<String> {
    for pattern in ["vqd=\"", "vqd='", "vqd="] {
        if let Some(start) = html.find(pattern) {
            let rest = &html[start + pattern.len()..];
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(rest.len());
            if end > 0 {
                return Some(rest[..end].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vqd_double_quoted() {
        let html = r#"<script>DDG.deep.initialize('/d.js?q=aapl&vqd="4-123456789"&o=json');</script>"#;
        assert_eq!(extract_vqd(html), Some("4-123456789".to_string()));
    }

    #[test]
    fn test_extract_vqd_bare() {
        let html = "nrj('/news.js?q=aapl&vqd=4-987_abc&l=us-en')";
        assert_eq!(extract_vqd(html), Some("4-987_abc".to_string()));
    }

    #[test]
    fn test_extract_vqd_missing() {
        assert_eq!(extract_vqd("<html>no token here</html>"), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_search_news() {
        let client = DuckDuckGoClient::new(20);
        let results = client.search_news("AAPL stock", 10).await.unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= 10);
        assert!(!results[0].title.is_empty());
    }
}
