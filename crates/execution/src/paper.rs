use anyhow::{Context, Result};
use async_trait::async_trait;
use news_trade_core::events::{AccountSnapshot, BracketParams, Order, OrderIntent, OrderSide, OrderStatus};
use news_trade_core::traits::Broker;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Account {
    cash: Decimal,
    prices: HashMap<String, Decimal>,
    /// Signed share count, negative when short
    positions: HashMap<String, i64>,
    /// Exit legs of the entry that opened each position
    brackets: HashMap<String, (OrderSide, BracketParams)>,
    orders: Vec<Order>,
}

impl Account {
    fn last_price(&self, symbol: &str) -> Result<Decimal> {
        self.prices
            .get(symbol)
            .copied()
            .with_context(|| format!("no price for {symbol}"))
    }

    /// Books a fill against cash and position.
    fn settle(&mut self, symbol: &str, side: OrderSide, quantity: u64, price: Decimal, commission_rate: Decimal) {
        let notional = Decimal::from(quantity) * price;
        let commission = notional * commission_rate;
        #[allow(clippy::cast_possible_wrap)]
        let signed = quantity as i64;

        let position = self.positions.entry(symbol.to_string()).or_insert(0);
        match side {
            OrderSide::Buy => {
                self.cash -= notional + commission;
                *position += signed;
            }
            OrderSide::Sell => {
                self.cash += notional - commission;
                *position -= signed;
            }
        }
        if *position == 0 {
            self.positions.remove(symbol);
            self.brackets.remove(symbol);
        }
    }

    /// Flattens `symbol` at `price`, recording a filled market order.
    fn close(&mut self, symbol: &str, price: Decimal, commission_rate: Decimal) -> Option<Order> {
        let shares = self.positions.get(symbol).copied().unwrap_or(0);
        if shares == 0 {
            return None;
        }

        let side = if shares > 0 { OrderSide::Sell } else { OrderSide::Buy };
        let quantity = shares.unsigned_abs();
        self.settle(symbol, side, quantity, price, commission_rate);

        let mut order = Order::market(symbol, side, quantity);
        order.status = OrderStatus::Filled;
        order.fill_price = Some(price);
        self.orders.push(order.clone());
        Some(order)
    }

    fn equity(&self) -> Decimal {
        self.positions
            .iter()
            .map(|(symbol, shares)| {
                let price = self.prices.get(symbol).copied().unwrap_or(Decimal::ZERO);
                Decimal::from(*shares) * price
            })
            .fold(self.cash, |acc, value| acc + value)
    }
}

/// Broker that fills every order locally at the last known price.
///
/// Makes no network calls. Entries fill immediately with optional slippage
/// and commission. Bracket exits are evaluated whenever a price is updated
/// through [`PaperBroker::set_price`].
pub struct PaperBroker {
    account: Mutex<Account>,
    commission_rate: Decimal,
    slippage_bps: Decimal,
}

impl PaperBroker {
    #[must_use]
    pub fn new(cash: Decimal) -> Self {
        Self {
            account: Mutex::new(Account {
                cash,
                ..Account::default()
            }),
            commission_rate: Decimal::ZERO,
            slippage_bps: Decimal::ZERO,
        }
    }

    /// Commission as a fraction of notional (e.g., 0.001 = 0.1%).
    #[must_use]
    pub fn with_commission(mut self, commission_rate: Decimal) -> Self {
        self.commission_rate = commission_rate;
        self
    }

    /// Slippage in basis points, against the order side.
    #[must_use]
    pub fn with_slippage_bps(mut self, slippage_bps: Decimal) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    fn fill_price(&self, price: Decimal, side: OrderSide) -> Decimal {
        let slippage = price * self.slippage_bps / Decimal::from(10000);
        match side {
            OrderSide::Buy => price + slippage,
            OrderSide::Sell => price - slippage,
        }
    }

    #[must_use]
    pub fn with_price(self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.account.lock().prices.insert(symbol.into(), price);
        self
    }

    /// Updates the last price and triggers any bracket exit it crosses.
    ///
    /// Returns the exit order when a take-profit or stop-loss fired.
    pub fn set_price(&self, symbol: &str, price: Decimal) -> Option<Order> {
        let mut account = self.account.lock();
        account.prices.insert(symbol.to_string(), price);

        let (side, bracket) = account.brackets.get(symbol).copied()?;
        let hit = match side {
            OrderSide::Buy => {
                price >= bracket.take_profit_price || price <= bracket.stop_loss_price
            }
            OrderSide::Sell => {
                price <= bracket.take_profit_price || price >= bracket.stop_loss_price
            }
        };
        if !hit {
            return None;
        }

        let exit = account.close(symbol, price, self.commission_rate);
        if let Some(order) = &exit {
            info!(
                symbol,
                %price,
                side = %order.side,
                quantity = order.quantity,
                "Bracket exit filled"
            );
        }
        exit
    }

    /// Signed share count held in `symbol`.
    #[must_use]
    pub fn position(&self, symbol: &str) -> i64 {
        self.account.lock().positions.get(symbol).copied().unwrap_or(0)
    }

    /// Every order submitted so far, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.account.lock().orders.clone()
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn get_cash(&self) -> Result<Decimal> {
        Ok(self.account.lock().cash)
    }

    async fn get_last_price(&self, symbol: &str) -> Result<Decimal> {
        self.account.lock().last_price(symbol)
    }

    async fn create_order(&self, intent: &OrderIntent) -> Result<Order> {
        if intent.quantity == 0 {
            anyhow::bail!("order quantity for {} must be positive", intent.symbol);
        }
        Ok(Order::from_intent(intent))
    }

    async fn submit_order(&self, mut order: Order) -> Result<Order> {
        if order.status != OrderStatus::New {
            anyhow::bail!("order {} was already {}", order.id, order.status);
        }

        let mut account = self.account.lock();
        let last_price = account.last_price(&order.symbol)?;
        let fill_price = self.fill_price(last_price, order.side);

        if order.side == OrderSide::Buy {
            let cost = Decimal::from(order.quantity) * fill_price * (Decimal::ONE + self.commission_rate);
            if cost > account.cash {
                anyhow::bail!(
                    "insufficient cash for {} {}: need {cost}, have {}",
                    order.quantity,
                    order.symbol,
                    account.cash
                );
            }
        }

        account.settle(
            &order.symbol,
            order.side,
            order.quantity,
            fill_price,
            self.commission_rate,
        );
        if let Some(bracket) = order.bracket {
            if account.positions.contains_key(&order.symbol) {
                account.brackets.insert(order.symbol.clone(), (order.side, bracket));
            }
        }

        order.status = OrderStatus::Filled;
        order.fill_price = Some(fill_price);
        account.orders.push(order.clone());

        debug!(
            id = %order.id,
            symbol = %order.symbol,
            side = %order.side,
            quantity = order.quantity,
            %fill_price,
            "Paper order filled"
        );
        Ok(order)
    }

    async fn sell_all(&self, symbol: &str) -> Result<()> {
        let mut account = self.account.lock();
        let price = account.last_price(symbol)?;
        if let Some(order) = account.close(symbol, price, self.commission_rate) {
            info!(symbol, quantity = order.quantity, side = %order.side, "Position liquidated");
        }
        Ok(())
    }

    async fn get_account(&self) -> Result<AccountSnapshot> {
        let account = self.account.lock();
        Ok(AccountSnapshot {
            cash: account.cash,
            equity: account.equity(),
            open_positions: account.positions.len(),
        })
    }

    async fn list_orders(&self, status: OrderStatus) -> Result<Vec<Order>> {
        Ok(self
            .account
            .lock()
            .orders
            .iter()
            .filter(|order| order.status == status)
            .cloned()
            .collect())
    }
}
