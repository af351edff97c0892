pub mod feed;
pub mod paper;

pub use feed::InMemoryNewsFeed;
pub use paper::PaperBroker;
