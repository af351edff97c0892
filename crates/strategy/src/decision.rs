//! Per-symbol trading state machine driven by aggregate headline sentiment.
//!
//! Each symbol remembers only the side of its last submitted entry. A
//! near-certain positive signal opens a long bracket (closing any short
//! first), a near-certain negative signal opens a short bracket (closing any
//! long first), and anything else holds.

use anyhow::{Context, Result};
use news_trade_core::events::{BracketParams, Order, OrderIntent, OrderSide};
use news_trade_core::position_sizing::calculate_position_size;
use news_trade_core::traits::Broker;
use news_trade_core::TradingConfig;
use news_trade_sentiment::{SentimentLabel, SentimentResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastAction {
    #[default]
    None,
    Buy,
    Sell,
}

impl From<OrderSide> for LastAction {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Buy,
            OrderSide::Sell => Self::Sell,
        }
    }
}

/// Memory of the last entry submitted for one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTradeState {
    pub last_action: LastAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// Cash does not exceed the last price
    InsufficientCash,
    /// Label is not directional or confidence is not above the threshold
    WeakSignal,
    /// Cash at risk does not buy a single share
    ZeroQuantity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Hold(HoldReason),
    Enter {
        /// Close the opposite-side position before submitting `intent`
        liquidate_first: bool,
        intent: OrderIntent,
    },
}

pub struct TradingDecisionEngine {
    config: TradingConfig,
    states: HashMap<String, SymbolTradeState>,
}

impl TradingDecisionEngine {
    /// Creates an engine with no trade memory.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: TradingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            states: HashMap::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &TradingConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self, symbol: &str) -> SymbolTradeState {
        self.states.get(symbol).copied().unwrap_or_default()
    }

    /// Forgets every symbol's last action.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// At least one share is affordable with all available cash.
    #[must_use]
    pub fn is_affordable(cash: Decimal, last_price: Decimal) -> bool {
        cash > last_price
    }

    /// Decides what to do for `symbol` this iteration. Does not touch state.
    ///
    /// # Errors
    ///
    /// Returns an error if position sizing rejects the inputs (e.g. a
    /// non-positive price).
    pub fn decide(
        &self,
        symbol: &str,
        cash: Decimal,
        last_price: Decimal,
        sentiment: &SentimentResult,
    ) -> Result<Decision> {
        if !Self::is_affordable(cash, last_price) {
            return Ok(Decision::Hold(HoldReason::InsufficientCash));
        }

        let quantity = calculate_position_size(cash, self.config.cash_at_risk, last_price)
            .with_context(|| format!("sizing position for {symbol}"))?;
        Ok(self.decide_sized(symbol, cash, last_price, quantity, sentiment))
    }

    /// Like [`Self::decide`], with the share count already sized by the caller.
    #[must_use]
    pub fn decide_sized(
        &self,
        symbol: &str,
        cash: Decimal,
        last_price: Decimal,
        quantity: u64,
        sentiment: &SentimentResult,
    ) -> Decision {
        if !Self::is_affordable(cash, last_price) {
            return Decision::Hold(HoldReason::InsufficientCash);
        }

        let confident = sentiment.score() > self.config.confidence_threshold;
        let (side, take_profit, stop_loss) = match sentiment.label() {
            SentimentLabel::Positive if confident => (
                OrderSide::Buy,
                self.config.buy_take_profit,
                self.config.buy_stop_loss,
            ),
            SentimentLabel::Negative if confident => (
                OrderSide::Sell,
                self.config.sell_take_profit,
                self.config.sell_stop_loss,
            ),
            _ => return Decision::Hold(HoldReason::WeakSignal),
        };

        if quantity == 0 {
            return Decision::Hold(HoldReason::ZeroQuantity);
        }

        let opposite = match side {
            OrderSide::Buy => LastAction::Sell,
            OrderSide::Sell => LastAction::Buy,
        };

        Decision::Enter {
            liquidate_first: self.state(symbol).last_action == opposite,
            intent: OrderIntent {
                symbol: symbol.to_string(),
                side,
                quantity,
                bracket: BracketParams {
                    take_profit_price: last_price * take_profit,
                    stop_loss_price: last_price * stop_loss,
                },
            },
        }
    }

    /// Carries out `decision` against the broker.
    ///
    /// Liquidation completes before the new order is created. The symbol's
    /// state changes only once the broker has accepted the submission; any
    /// failure leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns the first broker error encountered.
    pub async fn apply(&mut self, broker: &dyn Broker, decision: Decision) -> Result<Option<Order>> {
        let (liquidate_first, intent) = match decision {
            Decision::Hold(reason) => {
                debug!(?reason, "Holding");
                return Ok(None);
            }
            Decision::Enter {
                liquidate_first,
                intent,
            } => (liquidate_first, intent),
        };

        if liquidate_first {
            info!(symbol = %intent.symbol, "Closing opposite position before re-entry");
            broker
                .sell_all(&intent.symbol)
                .await
                .with_context(|| format!("liquidating {}", intent.symbol))?;
        }

        let order = broker
            .create_order(&intent)
            .await
            .with_context(|| format!("creating {} order for {}", intent.side, intent.symbol))?;
        let submitted = broker
            .submit_order(order)
            .await
            .with_context(|| format!("submitting {} order for {}", intent.side, intent.symbol))?;

        self.states.insert(
            intent.symbol.clone(),
            SymbolTradeState {
                last_action: intent.side.into(),
            },
        );

        info!(
            symbol = %intent.symbol,
            side = %intent.side,
            quantity = intent.quantity,
            take_profit = %intent.bracket.take_profit_price,
            stop_loss = %intent.bracket.stop_loss_price,
            order_id = %submitted.id,
            "Submitted bracket order"
        );

        Ok(Some(submitted))
    }
}
