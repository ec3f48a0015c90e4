pub mod models;
pub mod error;
pub mod config;
pub mod price_feed;
pub mod storage;

pub use error::{Error, Result};
pub use config::{AppConfig, SessionConfig};
pub use price_feed::{EnrichmentSource, NoEnrichment, PriceFeedService, SOL_MINT};
pub use storage::{FileStore, InMemoryStore, KeyValueStore};
