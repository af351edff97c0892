//! News feed data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single headline returned by a news feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    /// News headline text, scored as-is
    pub headline: String,
    /// Publication time, when the feed provides one
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Feed-specific source name (e.g., "benzinga")
    #[serde(default)]
    pub source: Option<String>,
}

impl NewsItem {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            created_at: None,
            source: None,
        }
    }

    /// Builder method to set the publication time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builder method to set the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
