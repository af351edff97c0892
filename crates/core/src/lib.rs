pub mod config;
pub mod config_loader;
pub mod events;
pub mod news;
pub mod position_sizing;
pub mod traits;

pub use config::{AggregationPolicy, AppConfig, SentimentConfig, TradingConfig};
pub use config_loader::ConfigLoader;
pub use events::{AccountSnapshot, BracketParams, Order, OrderIntent, OrderSide, OrderStatus};
pub use news::NewsItem;
pub use position_sizing::{calculate_position_size, position_notional};
pub use traits::{Broker, NewsFeed};
