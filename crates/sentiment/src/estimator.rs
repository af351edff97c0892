use crate::backend::{InferenceBackend, LanguageDetector};
use crate::cache::SentimentCache;
use crate::language::{GateDecision, LanguageGate};
use crate::scorer::SentimentScorer;
use crate::types::SentimentResult;
use news_trade_core::SentimentConfig;
use std::sync::Arc;
use tracing::{debug, error};

/// Scores a batch of headlines, one result per input in input order.
///
/// Each headline passes the [`LanguageGate`] and, when it proceeds, is scored
/// through the [`SentimentCache`]. A headline whose inference exhausts its
/// retries degrades to `(0, "error")`; the batch itself never fails.
pub struct BatchEstimator {
    gate: LanguageGate,
    cache: SentimentCache,
    scorer: SentimentScorer,
}

impl BatchEstimator {
    pub fn new(gate: LanguageGate, cache: SentimentCache, scorer: SentimentScorer) -> Self {
        Self {
            gate,
            cache,
            scorer,
        }
    }

    /// Wires the pipeline from configuration and injected collaborators.
    pub fn from_config(
        config: &SentimentConfig,
        backend: Arc<dyn InferenceBackend>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Self {
        Self::new(
            LanguageGate::new(detector, config.target_language.clone()),
            SentimentCache::new(config.cache_capacity),
            SentimentScorer::new(backend).with_max_attempts(config.max_attempts),
        )
    }

    pub async fn estimate<S: AsRef<str>>(&self, headlines: &[S]) -> Vec<SentimentResult> {
        let mut results = Vec::with_capacity(headlines.len());
        for headline in headlines {
            results.push(self.estimate_one(headline.as_ref()).await);
        }
        debug!(count = results.len(), "Estimated headline batch");
        results
    }

    pub async fn estimate_one(&self, text: &str) -> SentimentResult {
        let decision = self.gate.check(text);
        if let Some(skipped) = decision.skip_result() {
            return skipped;
        }
        debug_assert_eq!(decision, GateDecision::Proceed);

        match self
            .cache
            .get_or_compute(text, || self.scorer.score(text))
            .await
        {
            Ok(result) => result,
            Err(err) => {
                error!(text, error = %err, "Error processing news item");
                SentimentResult::error()
            }
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &SentimentCache {
        &self.cache
    }
}
