//! Error types for sentiment inference and language detection.
//!
//! Failures are classified by kind rather than by message: only
//! [`FaultKind::Transient`] is retried, and only exhausted retries cross the
//! scorer boundary as [`SentimentError`].

use thiserror::Error;

/// Coarse classification of an inference failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Operational fault (timeout, resource exhaustion); retrying may succeed.
    Transient,
    /// The backend rejected the input itself.
    Validation,
    /// Anything else.
    Unexpected,
}

/// Errors an inference backend may report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("transient inference fault: {0}")]
    Transient(String),

    #[error("invalid inference input: {0}")]
    Validation(String),

    #[error("unexpected inference failure: {0}")]
    Unexpected(String),
}

impl InferenceError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::Transient(_) => FaultKind::Transient,
            Self::Validation(_) => FaultKind::Validation,
            Self::Unexpected(_) => FaultKind::Unexpected,
        }
    }

    /// Returns true if the same call may succeed when repeated unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), FaultKind::Transient)
    }
}

/// Language detection failed (ambiguous or too little text, detector fault).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("language detection failed: {0}")]
pub struct DetectionError(pub String);

impl DetectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that escape [`crate::SentimentScorer::score`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SentimentError {
    #[error("inference failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: InferenceError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(InferenceError::transient("oom").kind(), FaultKind::Transient);
        assert_eq!(
            InferenceError::validation("too long").kind(),
            FaultKind::Validation
        );
        assert_eq!(
            InferenceError::unexpected("boom").kind(),
            FaultKind::Unexpected
        );
    }

    #[test]
    fn test_only_transient_is_transient() {
        assert!(InferenceError::transient("timeout").is_transient());
        assert!(!InferenceError::validation("bad").is_transient());
        assert!(!InferenceError::unexpected("bad").is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = SentimentError::RetriesExhausted {
            attempts: 3,
            source: InferenceError::transient("device busy"),
        };
        let display = err.to_string();
        assert!(display.contains("3 attempts"));
        assert!(display.contains("device busy"));

        let err = DetectionError::new("no features in text");
        assert!(err.to_string().contains("no features"));
    }
}
