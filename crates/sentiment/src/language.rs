//! Language gating ahead of inference.
//!
//! Empty headlines, headlines outside the target language, and headlines
//! whose language cannot be determined are short-circuited with a fixed
//! [`SentimentResult`] so they never reach the model.

use crate::backend::LanguageDetector;
use crate::error::DetectionError;
use crate::types::SentimentResult;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Outcome of gating one headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward the text to inference.
    Proceed,
    SkipEmpty,
    SkipNonTarget {
        detected: String,
    },
    SkipDetectionFailure,
}

impl GateDecision {
    /// The result to emit in place of inference, or `None` for [`GateDecision::Proceed`].
    #[must_use]
    pub const fn skip_result(&self) -> Option<SentimentResult> {
        match self {
            Self::Proceed => None,
            Self::SkipEmpty => Some(SentimentResult::neutral()),
            Self::SkipNonTarget { .. } => Some(SentimentResult::non_target_language()),
            Self::SkipDetectionFailure => Some(SentimentResult::error()),
        }
    }
}

pub struct LanguageGate {
    detector: Arc<dyn LanguageDetector>,
    target_language: String,
}

impl LanguageGate {
    pub fn new(detector: Arc<dyn LanguageDetector>, target_language: impl Into<String>) -> Self {
        Self {
            detector,
            target_language: target_language.into(),
        }
    }

    #[must_use]
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn check(&self, text: &str) -> GateDecision {
        if text.is_empty() {
            debug!("Skipping empty headline");
            return GateDecision::SkipEmpty;
        }

        let detected = match self.detector.detect(text) {
            Ok(code) => code,
            Err(err) => {
                error!(text, error = %err, "Error detecting language");
                return GateDecision::SkipDetectionFailure;
            }
        };

        if detected.eq_ignore_ascii_case(&self.target_language) {
            GateDecision::Proceed
        } else {
            info!(
                text,
                detected = %detected,
                target = %self.target_language,
                "Non-target-language headline detected"
            );
            GateDecision::SkipNonTarget { detected }
        }
    }
}

/// Languages considered by [`WhatlangDetector`] unless overridden.
pub const DEFAULT_LANGUAGES: [whatlang::Lang; 12] = [
    whatlang::Lang::Eng,
    whatlang::Lang::Deu,
    whatlang::Lang::Fra,
    whatlang::Lang::Spa,
    whatlang::Lang::Ita,
    whatlang::Lang::Por,
    whatlang::Lang::Nld,
    whatlang::Lang::Rus,
    whatlang::Lang::Jpn,
    whatlang::Lang::Cmn,
    whatlang::Lang::Kor,
    whatlang::Lang::Ara,
];

/// Texts with fewer words than this are too short to classify.
pub const DEFAULT_MIN_WORDS: usize = 4;

/// [`LanguageDetector`] backed by the `whatlang` trigram models.
///
/// Reports ISO 639-3 codes (`"eng"`, `"deu"`, ...). A detection only counts
/// when whatlang marks it reliable, so short or mixed headlines surface as
/// [`DetectionError`] rather than a low-confidence guess.
#[derive(Debug, Clone)]
pub struct WhatlangDetector {
    allowlist: Vec<whatlang::Lang>,
    min_words: usize,
    min_confidence: f64,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowlist: DEFAULT_LANGUAGES.to_vec(),
            min_words: DEFAULT_MIN_WORDS,
            min_confidence: 0.0,
        }
    }

    /// Restrict candidates to `languages`. An empty list considers every
    /// language whatlang knows.
    #[must_use]
    pub fn with_allowlist(mut self, languages: Vec<whatlang::Lang>) -> Self {
        self.allowlist = languages;
        self
    }

    #[must_use]
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    /// Treat detections below `min_confidence` (0.0-1.0) as ambiguous, on top
    /// of whatlang's own reliability check.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    fn classify(&self, text: &str) -> Option<whatlang::Info> {
        if self.allowlist.is_empty() {
            whatlang::detect(text)
        } else {
            whatlang::Detector::with_allowlist(self.allowlist.clone()).detect(text)
        }
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        let words = text
            .split_whitespace()
            .filter(|word| word.chars().any(char::is_alphabetic))
            .count();
        if words < self.min_words {
            return Err(DetectionError::new(format!(
                "text too short to classify ({words} words)"
            )));
        }

        let info = self
            .classify(text)
            .ok_or_else(|| DetectionError::new("no language features in text"))?;

        if !info.is_reliable() || info.confidence() < self.min_confidence {
            return Err(DetectionError::new(format!(
                "ambiguous language (best guess {} at confidence {:.2})",
                info.lang().code(),
                info.confidence()
            )));
        }

        Ok(info.lang().code().to_string())
    }
}
