use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Take-profit and stop-loss exits submitted together with an entry order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BracketParams {
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

/// A bracket entry the decision engine wants placed.
///
/// Derived per iteration and handed straight to the broker; never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub bracket: BracketParams,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Submitted,
    Filled,
    Canceled,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Submitted => "submitted",
            Self::Filled => "filled",
            Self::Canceled => "canceled",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// An order as known to the broker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    /// `None` for plain market orders such as liquidations.
    pub bracket: Option<BracketParams>,
    pub status: OrderStatus,
    pub fill_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an unsubmitted bracket order from an intent.
    #[must_use]
    pub fn from_intent(intent: &OrderIntent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
            bracket: Some(intent.bracket),
            status: OrderStatus::New,
            fill_price: None,
            created_at: Utc::now(),
        }
    }

    /// Builds an unsubmitted market order with no bracket legs.
    #[must_use]
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            quantity,
            bracket: None,
            status: OrderStatus::New,
            fill_price: None,
            created_at: Utc::now(),
        }
    }
}

/// Point-in-time view of the trading account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub cash: Decimal,
    pub equity: Decimal,
    pub open_positions: usize,
}
