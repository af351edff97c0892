//! Sentiment scoring for short news headlines.
//!
//! Headlines flow through [`LanguageGate`] → [`SentimentCache`] →
//! [`SentimentScorer`], orchestrated per batch by [`BatchEstimator`]. The
//! inference model and language detector are injected through the
//! [`InferenceBackend`] and [`LanguageDetector`] traits.

pub mod aggregate;
pub mod backend;
pub mod cache;
pub mod error;
pub mod estimator;
pub mod language;
pub mod lexicon;
pub mod scorer;
pub mod types;

pub use aggregate::aggregate;
pub use backend::{Classification, InferenceBackend, LanguageDetector};
pub use cache::SentimentCache;
pub use error::{DetectionError, FaultKind, InferenceError, SentimentError};
pub use estimator::BatchEstimator;
pub use language::{GateDecision, LanguageGate, WhatlangDetector};
pub use lexicon::LexiconBackend;
pub use scorer::SentimentScorer;
pub use types::{SentimentLabel, SentimentResult};
