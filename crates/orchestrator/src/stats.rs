//! Pipeline counters behind the `/stats` surface.
//!
//! Every drop in the error-handling table lands in one of these counters;
//! nothing disappears silently.

use arbscan_core::{AdapterCounters, ProviderId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ProviderCounters {
    pub matches_persisted: AtomicU64,
    pub odds_rows_written: AtomicU64,
    pub odds_rows_deduped: AtomicU64,
    pub skipped_cycles: AtomicU64,
    pub failed_cycles: AtomicU64,
    pub deadline_cancellations: AtomicU64,
}

/// Point-in-time snapshot of one provider's counters.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSnapshot {
    pub provider: ProviderId,
    pub name: String,
    pub requests: u64,
    pub errors: u64,
    pub unmapped_markets: u64,
    pub matches_persisted: u64,
    pub odds_rows_written: u64,
    pub odds_rows_deduped: u64,
    pub skipped_cycles: u64,
    pub failed_cycles: u64,
    pub deadline_cancellations: u64,
}

/// Point-in-time snapshot of the whole pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub cycles: u64,
    pub arbitrage_found: u64,
    pub arbitrage_expired: u64,
    pub publisher_dropped: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_seconds: Option<f64>,
    pub providers: Vec<ProviderSnapshot>,
}

pub struct PipelineStats {
    cycles: AtomicU64,
    arbitrage_found: AtomicU64,
    arbitrage_expired: AtomicU64,
    last_cycle: Mutex<Option<(DateTime<Utc>, f64)>>,
    providers: HashMap<ProviderId, (String, ProviderCounters)>,
}

impl PipelineStats {
    /// Builds the counter set for a fixed roster of providers.
    #[must_use]
    pub fn new(providers: impl IntoIterator<Item = (ProviderId, String)>) -> Self {
        Self {
            cycles: AtomicU64::new(0),
            arbitrage_found: AtomicU64::new(0),
            arbitrage_expired: AtomicU64::new(0),
            last_cycle: Mutex::new(None),
            providers: providers
                .into_iter()
                .map(|(id, name)| (id, (name, ProviderCounters::default())))
                .collect(),
        }
    }

    pub fn record_cycle(&self, duration_seconds: f64) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        *self.last_cycle.lock().expect("stats lock") = Some((Utc::now(), duration_seconds));
    }

    pub fn record_arbitrage_found(&self) {
        self.arbitrage_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_arbitrage_expired(&self, count: u64) {
        self.arbitrage_expired.fetch_add(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn provider(&self, id: ProviderId) -> Option<&ProviderCounters> {
        self.providers.get(&id).map(|(_, counters)| counters)
    }

    /// Snapshot, merging the adapters' own fetch counters in.
    #[must_use]
    pub fn snapshot(
        &self,
        adapter_counters: &HashMap<ProviderId, AdapterCounters>,
        publisher_dropped: u64,
    ) -> StatsSnapshot {
        let mut providers: Vec<ProviderSnapshot> = self
            .providers
            .iter()
            .map(|(id, (name, counters))| {
                let fetch = adapter_counters.get(id).copied().unwrap_or_default();
                ProviderSnapshot {
                    provider: *id,
                    name: name.clone(),
                    requests: fetch.requests,
                    errors: fetch.errors,
                    unmapped_markets: fetch.unmapped_markets,
                    matches_persisted: counters.matches_persisted.load(Ordering::Relaxed),
                    odds_rows_written: counters.odds_rows_written.load(Ordering::Relaxed),
                    odds_rows_deduped: counters.odds_rows_deduped.load(Ordering::Relaxed),
                    skipped_cycles: counters.skipped_cycles.load(Ordering::Relaxed),
                    failed_cycles: counters.failed_cycles.load(Ordering::Relaxed),
                    deadline_cancellations: counters
                        .deadline_cancellations
                        .load(Ordering::Relaxed),
                }
            })
            .collect();
        providers.sort_by_key(|p| p.provider);

        let last = *self.last_cycle.lock().expect("stats lock");

        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            arbitrage_found: self.arbitrage_found.load(Ordering::Relaxed),
            arbitrage_expired: self.arbitrage_expired.load(Ordering::Relaxed),
            publisher_dropped,
            last_cycle_at: last.map(|(at, _)| at),
            last_cycle_seconds: last.map(|(_, secs)| secs),
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PipelineStats {
        PipelineStats::new([(ProviderId(3), "maxbet".to_string())])
    }

    #[test]
    fn test_cycle_and_arbitrage_counters() {
        let stats = stats();
        stats.record_cycle(1.25);
        stats.record_cycle(0.75);
        stats.record_arbitrage_found();
        stats.record_arbitrage_expired(3);

        let snapshot = stats.snapshot(&HashMap::new(), 0);
        assert_eq!(snapshot.cycles, 2);
        assert_eq!(snapshot.arbitrage_found, 1);
        assert_eq!(snapshot.arbitrage_expired, 3);
        assert_eq!(snapshot.last_cycle_seconds, Some(0.75));
    }

    #[test]
    fn test_provider_counters_merge_adapter_side() {
        let stats = stats();
        stats
            .provider(ProviderId(3))
            .unwrap()
            .matches_persisted
            .fetch_add(12, Ordering::Relaxed);

        let mut fetch = HashMap::new();
        fetch.insert(
            ProviderId(3),
            AdapterCounters {
                requests: 40,
                errors: 2,
                unmapped_markets: 7,
            },
        );

        let snapshot = stats.snapshot(&fetch, 5);
        assert_eq!(snapshot.providers.len(), 1);
        let provider = &snapshot.providers[0];
        assert_eq!(provider.requests, 40);
        assert_eq!(provider.unmapped_markets, 7);
        assert_eq!(provider.matches_persisted, 12);
        assert_eq!(snapshot.publisher_dropped, 5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = stats();
        let snapshot = stats.snapshot(&HashMap::new(), 0);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["providers"].is_array());
    }
}
