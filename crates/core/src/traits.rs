//! The provider adapter contract.

use crate::error::ProviderError;
use crate::types::{ProviderId, RawMatch, Sport};
use async_trait::async_trait;
use futures_util::future::join_all;

/// Scrape-side counters an adapter exposes for the `/stats` surface.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct AdapterCounters {
    pub requests: u64,
    pub errors: u64,
    /// Vendor markets the codec could not map; dropped, never an error.
    pub unmapped_markets: u64,
}

/// Result of one adapter's scrape cycle across its supported sports.
#[derive(Debug)]
pub struct ScrapeBatch {
    pub provider: ProviderId,
    pub matches: Vec<RawMatch>,
    /// Per-sport failures. A failed sport never sinks the batch.
    pub sport_errors: Vec<(Sport, ProviderError)>,
}

/// One upstream sportsbook.
///
/// Adapters are stateless across cycles except for a lazily created session
/// and counters. They emit every price through the canonical market codec,
/// and they never touch the database.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    /// Short machine name, matching the provider registry.
    fn name(&self) -> &'static str;

    fn base_url(&self) -> &str;

    fn supported_sports(&self) -> &[Sport];

    /// Scrapes every offered event of one sport.
    async fn scrape_sport(&self, sport: Sport) -> Result<Vec<RawMatch>, ProviderError>;

    /// Tears down any session state so the next cycle starts clean.
    /// Called by the scheduler after a failed cycle.
    async fn reset_session(&self) {}

    fn counters(&self) -> AdapterCounters {
        AdapterCounters::default()
    }

    /// Scrapes all supported sports concurrently. Per-sport failures are
    /// collected, not propagated.
    async fn scrape_all(&self) -> ScrapeBatch {
        let sports = self.supported_sports().to_vec();
        let results = join_all(sports.iter().map(|&sport| self.scrape_sport(sport))).await;

        let mut matches = Vec::new();
        let mut sport_errors = Vec::new();
        for (sport, result) in sports.into_iter().zip(results) {
            match result {
                Ok(scraped) => {
                    tracing::debug!(
                        provider = self.name(),
                        sport = %sport,
                        matches = scraped.len(),
                        "sport scraped"
                    );
                    matches.extend(scraped);
                }
                Err(err) => {
                    tracing::warn!(provider = self.name(), sport = %sport, error = %err, "sport scrape failed");
                    sport_errors.push((sport, err));
                }
            }
        }

        ScrapeBatch {
            provider: self.provider_id(),
            matches,
            sport_errors,
        }
    }
}
