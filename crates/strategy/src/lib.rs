pub mod decision;
pub mod trader;

pub use decision::{Decision, HoldReason, LastAction, SymbolTradeState, TradingDecisionEngine};
pub use trader::{IterationReport, PositionSizing, SentimentTrader, SymbolOutcome};
