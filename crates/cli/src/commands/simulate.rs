//! Offline paper-trading session over a news fixture.
//!
//! Each simulated day applies that day's closing prices (which may trigger
//! bracket exits), then runs one trading iteration at 16:00 UTC.

use super::{load_config, offline_estimator};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use news_trade_execution::{InMemoryNewsFeed, PaperBroker};
use news_trade_strategy::{SentimentTrader, SymbolOutcome};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Arguments for the simulate command.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// JSON news fixture keyed by symbol.
    #[arg(long)]
    pub news: PathBuf,

    /// CSV of `date,symbol,price` rows applied at the start of each day.
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Opening price as SYMBOL=PRICE. Repeatable.
    #[arg(long = "price", value_parser = parse_price)]
    pub initial_prices: Vec<(String, Decimal)>,

    /// First trading day (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Number of daily iterations.
    #[arg(long, default_value_t = 5)]
    pub days: u32,

    /// Starting cash.
    #[arg(long, default_value = "100000")]
    pub cash: Decimal,

    /// Symbols to trade, overriding the configuration.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Commission as a fraction of notional.
    #[arg(long, default_value = "0")]
    pub commission: Decimal,

    /// Slippage in basis points.
    #[arg(long, default_value = "0")]
    pub slippage_bps: Decimal,

    /// TOML config file layered over the defaults.
    #[arg(short, long, env = "NEWS_TRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Confidence floor (0.0-1.0) applied on top of whatlang's reliability check.
    #[arg(long, default_value_t = 0.0)]
    pub min_language_confidence: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct PriceRow {
    date: NaiveDate,
    symbol: String,
    price: Decimal,
}

fn parse_price(s: &str) -> Result<(String, Decimal), String> {
    let (symbol, price) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=PRICE, got '{s}'"))?;
    let price: Decimal = price
        .trim()
        .parse()
        .map_err(|e| format!("invalid price '{price}': {e}"))?;
    if price <= Decimal::ZERO {
        return Err(format!("price for {symbol} must be positive"));
    }
    Ok((symbol.trim().to_string(), price))
}

fn load_prices(path: &Path) -> Result<BTreeMap<NaiveDate, Vec<(String, Decimal)>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open price file: {}", path.display()))?;

    let mut by_day: BTreeMap<NaiveDate, Vec<(String, Decimal)>> = BTreeMap::new();
    for row in reader.deserialize() {
        let row: PriceRow = row.context("Failed to read price row")?;
        by_day.entry(row.date).or_default().push((row.symbol, row.price));
    }
    Ok(by_day)
}

fn market_close(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN))
        .and_utc()
}

pub async fn run_simulate(args: SimulateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if !args.symbols.is_empty() {
        config.trading.symbols = args.symbols.clone();
    }

    let feed = Arc::new(InMemoryNewsFeed::from_path(&args.news)?);
    let prices = match &args.prices {
        Some(path) => load_prices(path)?,
        None => BTreeMap::new(),
    };

    let broker = args.initial_prices.iter().fold(
        PaperBroker::new(args.cash)
            .with_commission(args.commission)
            .with_slippage_bps(args.slippage_bps),
        |broker, (symbol, price)| broker.with_price(symbol.clone(), *price),
    );
    let broker = Arc::new(broker);

    let estimator = offline_estimator(&config.sentiment, args.min_language_confidence);
    let mut trader = SentimentTrader::new(&config, broker.clone(), feed, estimator)?;

    info!(
        symbols = ?config.trading.symbols,
        start = %args.start,
        days = args.days,
        cash = %args.cash,
        "Starting paper session"
    );

    for offset in 0..args.days {
        let day = args.start + Duration::days(i64::from(offset));

        for (symbol, price) in prices.get(&day).into_iter().flatten() {
            if let Some(exit) = broker.set_price(symbol, *price) {
                println!(
                    "{day}  {symbol:<6} bracket exit {} {} @ {price}",
                    exit.side, exit.quantity
                );
            }
        }

        let report = trader.on_trading_iteration(market_close(day)).await;
        for (symbol, outcome) in &report.outcomes {
            match outcome {
                SymbolOutcome::Traded(order) => println!(
                    "{day}  {symbol:<6} {} {} @ {}",
                    order.side,
                    order.quantity,
                    order
                        .fill_price
                        .map_or_else(|| "pending".to_string(), |p| p.to_string())
                ),
                SymbolOutcome::Held(reason) => println!("{day}  {symbol:<6} hold ({reason:?})"),
                SymbolOutcome::Failed(message) => println!("{day}  {symbol:<6} failed: {message}"),
            }
        }
    }

    println!();
    if let Some(account) = trader.fetch_account_info().await {
        println!(
            "cash {}  equity {}  open positions {}",
            account.cash, account.equity, account.open_positions
        );
    }
    let filled = trader.fetch_order_history().await;
    println!("filled orders: {}", filled.len());

    Ok(())
}
