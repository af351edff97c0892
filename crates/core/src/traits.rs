use crate::events::{AccountSnapshot, Order, OrderIntent, OrderStatus};
use crate::news::NewsItem;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Headlines for `symbol` published between `start` and `end` (inclusive), oldest first.
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<NewsItem>>;
}

#[async_trait]
pub trait Broker: Send + Sync {
    async fn get_cash(&self) -> Result<Decimal>;

    async fn get_last_price(&self, symbol: &str) -> Result<Decimal>;

    async fn create_order(&self, intent: &OrderIntent) -> Result<Order>;

    /// Submits an order; returns the order as accepted by the broker.
    async fn submit_order(&self, order: Order) -> Result<Order>;

    /// Closes the whole position in `symbol`, whichever side it is on.
    async fn sell_all(&self, symbol: &str) -> Result<()>;

    async fn get_account(&self) -> Result<AccountSnapshot>;

    async fn list_orders(&self, status: OrderStatus) -> Result<Vec<Order>>;
}
