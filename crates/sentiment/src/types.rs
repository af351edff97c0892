//! Sentiment result types shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical polarity tag attached to a scored headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "neutral")]
    Neutral,
    /// Headline was not written in the target language
    #[serde(rename = "non-English")]
    NonEnglish,
    /// Detection or inference failed for this headline
    #[serde(rename = "error")]
    Error,
}

impl SentimentLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::NonEnglish => "non-English",
            Self::Error => "error",
        }
    }

    /// Maps a label emitted by a classification model onto a polarity.
    ///
    /// Only positive/negative/neutral are accepted (case-insensitive); the
    /// pipeline-generated labels are never valid model output.
    #[must_use]
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Returns true for labels produced by actual inference.
    #[must_use]
    pub const fn is_scored(self) -> bool {
        matches!(self, Self::Positive | Self::Negative | Self::Neutral)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and label for one headline.
///
/// `score` is a confidence in [0.0, 1.0]. Values are immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    score: f64,
    label: SentimentLabel,
}

impl SentimentResult {
    /// Creates a result, rejecting scores outside [0.0, 1.0] (and NaN).
    #[must_use]
    pub fn try_new(score: f64, label: SentimentLabel) -> Option<Self> {
        if (0.0..=1.0).contains(&score) {
            Some(Self { score, label })
        } else {
            None
        }
    }

    /// Result for empty input.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
        }
    }

    /// Result for input outside the target language.
    #[must_use]
    pub const fn non_target_language() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::NonEnglish,
        }
    }

    /// Result for input whose detection or inference failed.
    #[must_use]
    pub const fn error() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Error,
        }
    }

    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub const fn label(&self) -> SentimentLabel {
        self.label
    }

    /// Returns the `(score, label)` pair in its string form.
    #[must_use]
    pub const fn as_tuple(&self) -> (f64, &'static str) {
        (self.score, self.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_bounds() {
        assert!(SentimentResult::try_new(0.0, SentimentLabel::Positive).is_some());
        assert!(SentimentResult::try_new(1.0, SentimentLabel::Negative).is_some());
        assert!(SentimentResult::try_new(1.01, SentimentLabel::Positive).is_none());
        assert!(SentimentResult::try_new(-0.1, SentimentLabel::Positive).is_none());
        assert!(SentimentResult::try_new(f64::NAN, SentimentLabel::Neutral).is_none());
    }

    #[test]
    fn test_fixed_results() {
        assert_eq!(SentimentResult::neutral().as_tuple(), (0.0, "neutral"));
        assert_eq!(
            SentimentResult::non_target_language().as_tuple(),
            (0.0, "non-English")
        );
        assert_eq!(SentimentResult::error().as_tuple(), (0.0, "error"));
    }

    #[test]
    fn test_model_label_parsing() {
        assert_eq!(
            SentimentLabel::from_model_label("Positive"),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(
            SentimentLabel::from_model_label(" NEGATIVE "),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(SentimentLabel::from_model_label("error"), None);
        assert_eq!(SentimentLabel::from_model_label("non-English"), None);
        assert_eq!(SentimentLabel::from_model_label("5 stars"), None);
    }

    #[test]
    fn test_label_serde_uses_wire_names() {
        let json = serde_json::to_string(&SentimentLabel::NonEnglish).unwrap();
        assert_eq!(json, "\"non-English\"");
        let label: SentimentLabel = serde_json::from_str("\"positive\"").unwrap();
        assert_eq!(label, SentimentLabel::Positive);
    }

    #[test]
    fn test_is_scored() {
        assert!(SentimentLabel::Neutral.is_scored());
        assert!(!SentimentLabel::Error.is_scored());
        assert!(!SentimentLabel::NonEnglish.is_scored());
    }
}
