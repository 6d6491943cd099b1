//! The typed application context.
//!
//! One `Core` value is constructed at startup and holds everything the
//! pipeline shares: configuration, the store handle and repositories, the
//! enabled adapters, the publisher, and the stats counters.

use crate::publisher::Publisher;
use crate::stats::PipelineStats;
use anyhow::{Context, Result};
use arbscan_core::{provider_by_name, AppConfig, ProviderAdapter, ScrapeConfig};
use arbscan_data::{ArbitrageRepository, DatabaseClient, MatchRepository, OddsRepository, Sweeper};
use std::sync::Arc;

/// Builds the adapter roster from `providers_enabled`.
///
/// Unknown names are a configuration error — the only fatal kind.
///
/// # Errors
/// Returns an error for an unknown provider name or an adapter that fails
/// to construct.
pub fn build_adapters(scrape: &ScrapeConfig) -> Result<Vec<Arc<dyn ProviderAdapter>>> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    for name in &scrape.providers_enabled {
        let info = provider_by_name(name)
            .with_context(|| format!("unknown provider in providers_enabled: {name}"))?;
        if !info.enabled {
            tracing::info!(provider = name.as_str(), "provider disabled in registry, skipping");
            continue;
        }

        let adapter: Arc<dyn ProviderAdapter> = match name.as_str() {
            "mozzart" => Arc::new(arbscan_mozzart::MozzartAdapter::new(scrape)),
            "maxbet" => Arc::new(arbscan_maxbet::MaxbetAdapter::new(scrape)?),
            "admiral" => Arc::new(arbscan_admiral::AdmiralAdapter::new(scrape)?),
            "soccerbet" => Arc::new(arbscan_soccerbet::SoccerbetAdapter::new(scrape)?),
            "superbet" => Arc::new(arbscan_superbet::SuperbetAdapter::new(scrape)?),
            other => anyhow::bail!("provider {other} is registered but has no adapter"),
        };
        adapters.push(adapter);
    }

    Ok(adapters)
}

/// Everything the running pipeline shares.
pub struct Core {
    pub config: AppConfig,
    pub db: DatabaseClient,
    pub matches: MatchRepository,
    pub odds: OddsRepository,
    pub arbitrage: ArbitrageRepository,
    pub adapters: Vec<Arc<dyn ProviderAdapter>>,
    pub publisher: Arc<Publisher>,
    pub stats: Arc<PipelineStats>,
}

impl Core {
    /// Connects the store, bootstraps the schema, and wires the adapter
    /// roster.
    ///
    /// # Errors
    /// Returns an error on configuration or connection failure.
    pub async fn connect(config: AppConfig) -> Result<Self> {
        let db = DatabaseClient::connect(
            &config.database.url,
            config.database.max_connections,
        )
        .await?;
        db.ensure_schema().await?;

        let adapters = build_adapters(&config.scrape)?;
        let stats = Arc::new(PipelineStats::new(
            adapters
                .iter()
                .map(|a| (a.provider_id(), a.name().to_string())),
        ));

        let pool = db.pool().clone();
        Ok(Self {
            config,
            matches: MatchRepository::new(pool.clone()),
            odds: OddsRepository::new(pool.clone()),
            arbitrage: ArbitrageRepository::new(pool),
            db,
            adapters,
            publisher: Arc::new(Publisher::new()),
            stats,
        })
    }

    /// The retention sweeper bound to this store.
    #[must_use]
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.db.pool().clone(), self.config.retention.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_adapters_for_default_roster() {
        let adapters = build_adapters(&ScrapeConfig::default()).unwrap();
        assert_eq!(adapters.len(), 5);

        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert!(names.contains(&"maxbet"));
        assert!(names.contains(&"mozzart"));
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let scrape = ScrapeConfig {
            providers_enabled: vec!["pinnacle".to_string()],
            ..ScrapeConfig::default()
        };
        assert!(build_adapters(&scrape).is_err());
    }

    #[test]
    fn test_subset_roster() {
        let scrape = ScrapeConfig {
            providers_enabled: vec!["maxbet".to_string(), "superbet".to_string()],
            ..ScrapeConfig::default()
        };
        let adapters = build_adapters(&scrape).unwrap();
        assert_eq!(adapters.len(), 2);
    }
}
