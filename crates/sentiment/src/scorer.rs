use crate::backend::{Classification, InferenceBackend};
use crate::error::{InferenceError, SentimentError};
use crate::types::{SentimentLabel, SentimentResult};
use std::sync::Arc;
use tracing::{debug, error};

/// Default number of inference attempts for transient faults.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runs inference for one headline with bounded, immediate retry.
///
/// Transient faults are retried up to `max_attempts` total attempts and then
/// returned as [`SentimentError::RetriesExhausted`]. Validation and unexpected
/// faults are logged and degrade to the `(0, "error")` result without retry.
#[derive(Clone)]
pub struct SentimentScorer {
    backend: Arc<dyn InferenceBackend>,
    max_attempts: u32,
}

impl SentimentScorer {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the attempt budget (minimum 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Scores `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::RetriesExhausted`] when every attempt hit a
    /// transient fault.
    pub async fn score(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.backend.classify(text).await {
                Ok(classification) => return Ok(self.normalize(text, &classification)),
                Err(err) if err.is_transient() => {
                    error!(
                        backend = self.backend.name(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Runtime error in sentiment analysis"
                    );
                    if attempt >= self.max_attempts {
                        return Err(SentimentError::RetriesExhausted {
                            attempts: attempt,
                            source: err,
                        });
                    }
                }
                Err(err @ InferenceError::Validation(_)) => {
                    error!(text, error = %err, "Value error in sentiment input");
                    return Ok(SentimentResult::error());
                }
                Err(err) => {
                    error!(text, kind = ?err.kind(), error = %err, "Unexpected error in sentiment analysis");
                    return Ok(SentimentResult::error());
                }
            }
        }
    }

    fn normalize(&self, text: &str, classification: &Classification) -> SentimentResult {
        let result = SentimentLabel::from_model_label(&classification.label)
            .and_then(|label| SentimentResult::try_new(classification.score, label));

        match result {
            Some(result) => {
                debug!(text, label = %result.label(), score = result.score(), "Scored headline");
                result
            }
            None => {
                error!(
                    backend = self.backend.name(),
                    label = %classification.label,
                    score = classification.score,
                    "Unexpected classification output"
                );
                SentimentResult::error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Backend that replays a script of outcomes, then repeats the last one.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<Classification, InferenceError>>>,
        last: Mutex<Option<Result<Classification, InferenceError>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<Classification, InferenceError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn classify(&self, _text: &str) -> Result<Classification, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            match next {
                Some(outcome) => {
                    *self.last.lock() = Some(outcome.clone());
                    outcome
                }
                None => self
                    .last
                    .lock()
                    .clone()
                    .unwrap_or_else(|| Err(InferenceError::unexpected("empty script"))),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn ok(label: &str, score: f64) -> Result<Classification, InferenceError> {
        Ok(Classification::new(label, score))
    }

    fn transient() -> Result<Classification, InferenceError> {
        Err(InferenceError::transient("CUDA out of memory"))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let backend = ScriptedBackend::new(vec![ok("positive", 0.98)]);
        let scorer = SentimentScorer::new(backend.clone());

        let result = scorer.score("Shares jump").await.unwrap();

        assert_eq!(result.as_tuple(), (0.98, "positive"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_three_transient_faults_propagate() {
        let backend = ScriptedBackend::new(vec![transient(), transient(), transient()]);
        let scorer = SentimentScorer::new(backend.clone());

        let err = scorer.score("Shares jump").await.unwrap_err();

        assert!(matches!(
            err,
            SentimentError::RetriesExhausted {
                attempts: 3,
                source: InferenceError::Transient(_)
            }
        ));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_two_transient_faults_then_success() {
        let backend =
            ScriptedBackend::new(vec![transient(), transient(), ok("negative", 0.9995)]);
        let scorer = SentimentScorer::new(backend.clone());

        let result = scorer.score("Shares sink").await.unwrap();

        assert_eq!(result.as_tuple(), (0.9995, "negative"));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_validation_fault_is_swallowed_without_retry() {
        let backend = ScriptedBackend::new(vec![Err(InferenceError::validation(
            "sequence too long",
        ))]);
        let scorer = SentimentScorer::new(backend.clone());

        let result = scorer.score("x").await.unwrap();

        assert_eq!(result.as_tuple(), (0.0, "error"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_fault_is_swallowed_without_retry() {
        let backend = ScriptedBackend::new(vec![Err(InferenceError::unexpected("segfault"))]);
        let scorer = SentimentScorer::new(backend.clone());

        let result = scorer.score("x").await.unwrap();

        assert_eq!(result, SentimentResult::error());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_label_or_score_is_an_error_result() {
        let backend = ScriptedBackend::new(vec![ok("5 stars", 0.7)]);
        let scorer = SentimentScorer::new(backend);
        assert_eq!(scorer.score("x").await.unwrap(), SentimentResult::error());

        let backend = ScriptedBackend::new(vec![ok("positive", 1.7)]);
        let scorer = SentimentScorer::new(backend);
        assert_eq!(scorer.score("x").await.unwrap(), SentimentResult::error());
    }

    #[tokio::test]
    async fn test_custom_attempt_budget() {
        let backend = ScriptedBackend::new(vec![transient()]);
        let scorer = SentimentScorer::new(backend.clone()).with_max_attempts(5);

        assert!(scorer.score("x").await.is_err());
        assert_eq!(backend.calls(), 5);
        assert_eq!(
            SentimentScorer::new(backend).with_max_attempts(0).max_attempts(),
            1
        );
    }
}
