//! CLI commands for the news sentiment trader.

pub mod score;
pub mod simulate;

pub use score::{run_score, ScoreArgs};
pub use simulate::{run_simulate, SimulateArgs};

use anyhow::Result;
use news_trade_core::{AppConfig, ConfigLoader, SentimentConfig};
use news_trade_sentiment::{BatchEstimator, LexiconBackend, WhatlangDetector};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Explicit config file when given, otherwise the default layered sources.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            ConfigLoader::load_from(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Sentiment pipeline backed by the offline lexicon model and whatlang.
fn offline_estimator(config: &SentimentConfig, min_language_confidence: f64) -> BatchEstimator {
    info!(
        model = %config.model,
        backend = "lexicon",
        target_language = %config.target_language,
        "Building sentiment pipeline"
    );
    BatchEstimator::from_config(
        config,
        Arc::new(LexiconBackend::new()),
        Arc::new(WhatlangDetector::new().with_min_confidence(min_language_confidence)),
    )
}
