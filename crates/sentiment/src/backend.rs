use crate::error::{DetectionError, InferenceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw output of a text-classification model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Text-classification inference handle.
///
/// Constructed and torn down by the caller, then shared with the scorer.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, InferenceError>;

    fn name(&self) -> &str;
}

pub trait LanguageDetector: Send + Sync {
    /// Returns the language code of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError`] when no language can be identified.
    fn detect(&self, text: &str) -> Result<String, DetectionError>;
}
