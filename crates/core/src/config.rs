use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub sentiment: SentimentConfig,
    pub trading: TradingConfig,
}

/// How per-headline results for one symbol are reduced to a single signal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// First headline's result, whatever its label.
    First,
    /// Highest-confidence result among positive/negative/neutral labels.
    MaxConfidence,
    /// Most frequent label, scored by the mean confidence of its votes.
    #[default]
    MajorityVote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SentimentConfig {
    /// Identifier of the classification model behind the inference backend
    pub model: String,
    /// ISO 639-3 code headlines must be written in
    pub target_language: String,
    pub cache_capacity: usize,
    /// Total inference attempts for transient faults
    pub max_attempts: u32,
    pub aggregation: AggregationPolicy,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: "nlptown/bert-base-multilingual-uncased-sentiment".to_string(),
            target_language: "eng".to_string(),
            cache_capacity: 1000,
            max_attempts: 3,
            aggregation: AggregationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TradingConfig {
    pub symbols: Vec<String>,
    pub cash_at_risk: Decimal,        // Fraction of cash per position (e.g., 0.5 = 50%)
    pub confidence_threshold: f64,    // Sentiment score must exceed this to trade
    pub news_lookback_days: i64,
    pub sleeptime: String,            // Iteration cadence, interpreted by the scheduler
    pub buy_take_profit: Decimal,     // Multipliers applied to the last price
    pub buy_stop_loss: Decimal,
    pub sell_take_profit: Decimal,
    pub sell_stop_loss: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["SPY".to_string(), "AAPL".to_string(), "TSLA".to_string()],
            cash_at_risk: dec!(0.5),
            confidence_threshold: 0.999,
            news_lookback_days: 3,
            sleeptime: "24H".to_string(),
            buy_take_profit: dec!(1.20),
            buy_stop_loss: dec!(0.95),
            sell_take_profit: dec!(0.80),
            sell_stop_loss: dec!(1.05),
        }
    }
}

impl TradingConfig {
    /// Checks ranges the decision engine relies on.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.cash_at_risk <= Decimal::ZERO || self.cash_at_risk > Decimal::ONE {
            anyhow::bail!("cash_at_risk must be in (0, 1], got {}", self.cash_at_risk);
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            );
        }
        if self.news_lookback_days < 0 {
            anyhow::bail!(
                "news_lookback_days must not be negative, got {}",
                self.news_lookback_days
            );
        }
        for (name, value) in [
            ("buy_take_profit", self.buy_take_profit),
            ("buy_stop_loss", self.buy_stop_loss),
            ("sell_take_profit", self.sell_take_profit),
            ("sell_stop_loss", self.sell_stop_loss),
        ] {
            if value <= Decimal::ZERO {
                anyhow::bail!("{name} must be positive, got {value}");
            }
        }
        Ok(())
    }
}

impl SentimentConfig {
    /// # Errors
    ///
    /// Returns an error if the cache would be empty or no inference attempt is allowed.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            anyhow::bail!("cache_capacity must be at least 1");
        }
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }
        if self.target_language.trim().is_empty() {
            anyhow::bail!("target_language must not be empty");
        }
        Ok(())
    }
}
