//! News feed backed by an in-memory map of headlines per symbol.
//!
//! Fixtures are JSON objects keyed by symbol:
//!
//! ```json
//! {
//!   "AAPL": [
//!     { "headline": "Apple beats estimates", "created_at": "2024-03-14T13:30:00Z" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use news_trade_core::news::NewsItem;
use news_trade_core::traits::NewsFeed;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryNewsFeed {
    items: RwLock<HashMap<String, Vec<NewsItem>>>,
}

impl InMemoryNewsFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if `json` is not an object of symbol to news items.
    pub fn from_json(json: &str) -> Result<Self> {
        let items: HashMap<String, Vec<NewsItem>> =
            serde_json::from_str(json).context("parsing news fixture")?;
        Ok(Self {
            items: RwLock::new(items),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading news fixture {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn push(&self, symbol: impl Into<String>, item: NewsItem) {
        self.items.write().entry(symbol.into()).or_default().push(item);
    }

    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.items.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl NewsFeed for InMemoryNewsFeed {
    /// Headlines for `symbol` published on `start..=end`, in insertion order.
    /// Undated items match every window.
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NewsItem>> {
        let news: Vec<NewsItem> = self
            .items
            .read()
            .get(symbol)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.created_at
                            .map_or(true, |at| (start..=end).contains(&at.date_naive()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(symbol, %start, %end, count = news.len(), "Served news");
        Ok(news)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "AAPL": [
            { "headline": "Apple beats estimates", "created_at": "2024-03-14T13:30:00Z" },
            { "headline": "Apple opens new store", "created_at": "2024-03-01T09:00:00Z" },
            { "headline": "Apple undated note" }
        ],
        "TSLA": []
    }"#;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_filters_by_inclusive_window() {
        let feed = InMemoryNewsFeed::from_json(FIXTURE).unwrap();

        let news = feed
            .get_news("AAPL", date("2024-03-12"), date("2024-03-14"))
            .await
            .unwrap();

        let headlines: Vec<&str> = news.iter().map(|n| n.headline.as_str()).collect();
        assert_eq!(headlines, vec!["Apple beats estimates", "Apple undated note"]);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let feed = InMemoryNewsFeed::from_json(FIXTURE).unwrap();
        let news = feed
            .get_news("MSFT", date("2024-03-01"), date("2024-03-31"))
            .await
            .unwrap();
        assert!(news.is_empty());
        assert_eq!(feed.symbols(), vec!["AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn test_push_appends() {
        let feed = InMemoryNewsFeed::new();
        feed.push("SPY", NewsItem::new("Markets rally"));

        let news = feed
            .get_news("SPY", date("2024-03-01"), date("2024-03-01"))
            .await
            .unwrap();
        assert_eq!(news, vec![NewsItem::new("Markets rally")]);
    }

    #[test]
    fn test_rejects_malformed_fixture() {
        assert!(InMemoryNewsFeed::from_json(r#"["not", "a", "map"]"#).is_err());
    }
}
