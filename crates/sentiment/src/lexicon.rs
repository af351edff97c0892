//! # Financial Lexicon Backend
//!
//! Rule-based [`InferenceBackend`] for running the pipeline without a model.
//! Word polarities are summed (with negation and intensifiers) and the
//! magnitude is squashed into a confidence.

use crate::backend::{Classification, InferenceBackend};
use crate::error::InferenceError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Longest headline accepted, in characters.
pub const DEFAULT_MAX_CHARS: usize = 512;

pub struct LexiconBackend {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
    /// Absolute polarity below which a headline is neutral
    neutral_band: f64,
    max_chars: usize,
}

impl Default for LexiconBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconBackend {
    #[must_use]
    pub fn new() -> Self {
        let words = HashMap::from([
            // Positive financial terms
            ("surge", 0.8),
            ("surges", 0.8),
            ("soar", 0.8),
            ("soars", 0.8),
            ("rally", 0.7),
            ("rallies", 0.7),
            ("beat", 0.6),
            ("beats", 0.6),
            ("record", 0.6),
            ("upgrade", 0.6),
            ("upgraded", 0.6),
            ("gain", 0.5),
            ("gains", 0.5),
            ("profit", 0.6),
            ("growth", 0.6),
            ("rise", 0.5),
            ("rises", 0.5),
            ("strong", 0.5),
            ("outperform", 0.7),
            ("bullish", 0.8),
            ("rebound", 0.5),
            ("approval", 0.6),
            ("approved", 0.6),
            // Negative financial terms
            ("crash", -0.9),
            ("crashes", -0.9),
            ("plunge", -0.8),
            ("plunges", -0.8),
            ("fraud", -0.9),
            ("bankruptcy", -0.9),
            ("lawsuit", -0.6),
            ("recall", -0.6),
            ("miss", -0.6),
            ("misses", -0.6),
            ("downgrade", -0.6),
            ("downgraded", -0.6),
            ("drop", -0.6),
            ("drops", -0.6),
            ("fall", -0.5),
            ("falls", -0.5),
            ("loss", -0.6),
            ("losses", -0.6),
            ("weak", -0.5),
            ("bearish", -0.8),
            ("layoffs", -0.6),
            ("probe", -0.5),
            ("warning", -0.5),
        ]);

        let negations = vec![
            "not", "no", "never", "without", "fails", "isn't", "isnt", "didn't", "didnt",
            "won't", "wont",
        ];

        let intensifiers = HashMap::from([
            ("very", 1.5),
            ("sharply", 1.5),
            ("massive", 1.6),
            ("huge", 1.5),
            ("slightly", 0.5),
        ]);

        Self {
            words,
            negations,
            intensifiers,
            neutral_band: 0.2,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Signed polarity of `text`.
    #[must_use]
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let mut total = 0.0;
        let mut negate = false;
        let mut boost = 1.0;

        for token in &tokens {
            if self.negations.iter().any(|n| *n == token.as_str()) {
                negate = true;
                continue;
            }
            if let Some(factor) = self.intensifiers.get(token.as_str()) {
                boost *= factor;
                continue;
            }
            if let Some(score) = self.words.get(token.as_str()) {
                let signed = if negate { -score } else { *score };
                total += signed * boost;
                negate = false;
                boost = 1.0;
            }
        }

        total
    }

    fn classify_text(&self, text: &str) -> Result<Classification, InferenceError> {
        if text.trim().is_empty() {
            return Err(InferenceError::validation("text is empty"));
        }
        let chars = text.chars().count();
        if chars > self.max_chars {
            return Err(InferenceError::validation(format!(
                "text has {chars} characters, limit is {}",
                self.max_chars
            )));
        }

        let polarity = self.polarity(text);
        let magnitude = polarity.abs();

        let classification = if magnitude < self.neutral_band {
            Classification::new("neutral", 1.0 - magnitude / self.neutral_band * 0.5)
        } else if polarity > 0.0 {
            Classification::new("positive", (2.0 * magnitude).tanh())
        } else {
            Classification::new("negative", (2.0 * magnitude).tanh())
        };

        Ok(classification)
    }
}

#[async_trait]
impl InferenceBackend for LexiconBackend {
    async fn classify(&self, text: &str) -> Result<Classification, InferenceError> {
        self.classify_text(text)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
