//! Shared domain types and infrastructure for the odds pipeline.
//!
//! Everything the provider adapters, persister, resolver, and detector have
//! in common lives here: the sport/provider registries, the raw record
//! shapes emitted by scrapers, the adapter contract, the provider error
//! taxonomy, and the HTTP fetch helper with per-provider rate limiting.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod registry;
pub mod traits;
pub mod types;

pub use config::{
    AppConfig, ArbitrageConfig, DatabaseConfig, ResolverConfig, RetentionConfig, ScrapeConfig,
    ServerConfig,
};
pub use config_loader::ConfigLoader;
pub use error::ProviderError;
pub use fetch::{FetchConfig, HttpFetcher};
pub use registry::{provider_by_name, FetchDriver, ProviderInfo, PROVIDERS};
pub use traits::{AdapterCounters, ProviderAdapter, ScrapeBatch};
pub use types::{BetTypeId, MarketKey, ProviderId, RawMatch, RawOdds, Sport};
