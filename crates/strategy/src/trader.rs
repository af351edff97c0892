use crate::decision::{Decision, HoldReason, TradingDecisionEngine};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use news_trade_core::events::{AccountSnapshot, Order, OrderStatus};
use news_trade_core::position_sizing::calculate_position_size;
use news_trade_core::traits::{Broker, NewsFeed};
use news_trade_core::{AggregationPolicy, AppConfig};
use news_trade_sentiment::{aggregate, BatchEstimator, SentimentResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Inputs to one symbol's sizing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSizing {
    pub cash: Decimal,
    pub last_price: Decimal,
    /// Shares the configured cash at risk buys at `last_price`
    pub quantity: u64,
}

/// What happened to one symbol during an iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Traded(Order),
    Held(HoldReason),
    /// A collaborator failed; the symbol was skipped this iteration
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub at: DateTime<Utc>,
    pub outcomes: Vec<(String, SymbolOutcome)>,
}

impl IterationReport {
    #[must_use]
    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, outcome)| outcome)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            SymbolOutcome::Traded(order) => Some(order),
            _ => None,
        })
    }
}

/// Runs the daily news-sentiment strategy over a list of symbols.
///
/// Each iteration processes symbols one at a time: size the position, and if
/// a share is affordable, score the recent headlines, decide, and execute. A
/// failure for one symbol is logged and the iteration moves on.
pub struct SentimentTrader {
    broker: Arc<dyn Broker>,
    news: Arc<dyn NewsFeed>,
    estimator: BatchEstimator,
    engine: TradingDecisionEngine,
    aggregation: AggregationPolicy,
}

impl SentimentTrader {
    /// # Errors
    ///
    /// Returns an error if the trading configuration is invalid.
    pub fn new(
        config: &AppConfig,
        broker: Arc<dyn Broker>,
        news: Arc<dyn NewsFeed>,
        estimator: BatchEstimator,
    ) -> Result<Self> {
        Ok(Self {
            broker,
            news,
            estimator,
            engine: TradingDecisionEngine::new(config.trading.clone())?,
            aggregation: config.sentiment.aggregation,
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &TradingDecisionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn estimator(&self) -> &BatchEstimator {
        &self.estimator
    }

    /// Calendar dates covering the lookback window ending at `now`.
    #[must_use]
    pub fn news_window(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let end = now.date_naive();
        let start = (now - Duration::days(self.engine.config().news_lookback_days)).date_naive();
        (start, end)
    }

    /// # Errors
    ///
    /// Returns an error if the broker cannot report cash or a price, or the
    /// price is not positive.
    pub async fn position_sizing(&self, symbol: &str) -> Result<PositionSizing> {
        let cash = self.broker.get_cash().await.context("fetching cash")?;
        let last_price = self
            .broker
            .get_last_price(symbol)
            .await
            .with_context(|| format!("fetching last price for {symbol}"))?;
        let quantity =
            calculate_position_size(cash, self.engine.config().cash_at_risk, last_price)?;

        Ok(PositionSizing {
            cash,
            last_price,
            quantity,
        })
    }

    /// Aggregate sentiment of the headlines published for `symbol` in the
    /// window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the news feed fails; scoring never does.
    pub async fn get_sentiment(&self, symbol: &str, now: DateTime<Utc>) -> Result<SentimentResult> {
        let (start, end) = self.news_window(now);
        let news = self
            .news
            .get_news(symbol, start, end)
            .await
            .with_context(|| format!("fetching news for {symbol} from {start} to {end}"))?;

        let headlines: Vec<&str> = news.iter().map(|item| item.headline.as_str()).collect();
        let results = self.estimator.estimate(&headlines).await;
        let sentiment = aggregate(&results, self.aggregation);

        info!(
            %symbol,
            %start,
            %end,
            headlines = headlines.len(),
            label = %sentiment.label(),
            score = sentiment.score(),
            "Aggregated news sentiment"
        );
        Ok(sentiment)
    }

    /// Runs one trading iteration over every configured symbol.
    pub async fn on_trading_iteration(&mut self, now: DateTime<Utc>) -> IterationReport {
        let symbols = self.engine.config().symbols.clone();
        let mut outcomes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let outcome = match self.trade_symbol(&symbol, now).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(%symbol, error = %message, "Trading iteration failed for symbol");
                    SymbolOutcome::Failed(message)
                }
            };
            outcomes.push((symbol, outcome));
        }

        IterationReport { at: now, outcomes }
    }

    async fn trade_symbol(&mut self, symbol: &str, now: DateTime<Utc>) -> Result<SymbolOutcome> {
        let sizing = self.position_sizing(symbol).await?;
        if !TradingDecisionEngine::is_affordable(sizing.cash, sizing.last_price) {
            info!(
                %symbol,
                cash = %sizing.cash,
                last_price = %sizing.last_price,
                "Not enough cash for one share"
            );
            return Ok(SymbolOutcome::Held(HoldReason::InsufficientCash));
        }

        let sentiment = self.get_sentiment(symbol, now).await?;
        let decision = self.engine.decide_sized(
            symbol,
            sizing.cash,
            sizing.last_price,
            sizing.quantity,
            &sentiment,
        );

        if let Decision::Hold(reason) = decision {
            info!(%symbol, ?reason, label = %sentiment.label(), score = sentiment.score(), "No trade");
            return Ok(SymbolOutcome::Held(reason));
        }

        let order = self.engine.apply(self.broker.as_ref(), decision).await?;
        Ok(order.map_or(SymbolOutcome::Held(HoldReason::WeakSignal), SymbolOutcome::Traded))
    }

    /// Logs the broker's account snapshot.
    pub async fn fetch_account_info(&self) -> Option<AccountSnapshot> {
        match self.broker.get_account().await {
            Ok(account) => {
                info!(
                    cash = %account.cash,
                    equity = %account.equity,
                    open_positions = account.open_positions,
                    "Account info"
                );
                Some(account)
            }
            Err(err) => {
                warn!(error = %err, "Error fetching account info");
                None
            }
        }
    }

    /// Logs and returns every filled order.
    pub async fn fetch_order_history(&self) -> Vec<Order> {
        match self.broker.list_orders(OrderStatus::Filled).await {
            Ok(orders) => {
                for order in &orders {
                    info!(
                        id = %order.id,
                        symbol = %order.symbol,
                        side = %order.side,
                        quantity = order.quantity,
                        status = %order.status,
                        "Filled order"
                    );
                }
                orders
            }
            Err(err) => {
                warn!(error = %err, "Error fetching order history");
                Vec::new()
            }
        }
    }
}
