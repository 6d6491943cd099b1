//! The scrape scheduler and per-cycle pipeline.
//!
//! One cycle per configured interval: every enabled adapter scrapes as an
//! independent task under the cycle deadline, each provider's batch is
//! resolved and persisted (matches before odds, always), and only after
//! every provider has persisted or been skipped does arbitrage detection
//! run — never on a mid-cycle snapshot. A provider still running when the
//! next cycle starts is skipped there and counted.

use crate::context::Core;
use crate::publisher::OutboundEvent;
use arbscan_arbitrage::{ArbitrageDetector, DetectorConfig, MatchResolver, Resolution, ResolverConfig};
use arbscan_codec::{flip_orientation, normalize_league};
use arbscan_core::{AdapterCounters, ProviderAdapter, ProviderId, RawMatch, RawOdds, Sport};
use arbscan_data::{MatchKey, MatchUpsert, OddsWrite};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Scheduler {
    core: Arc<Core>,
    resolver: MatchResolver,
    detector: ArbitrageDetector,
    /// Providers with a pass still running. The sole cross-cycle state.
    in_flight: Mutex<HashSet<ProviderId>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(core: Arc<Core>) -> Self {
        let resolver = MatchResolver::new(ResolverConfig {
            match_similarity_threshold: core.config.resolver.match_similarity_threshold,
        });
        let detector = ArbitrageDetector::new(
            DetectorConfig::default()
                .with_min_profit(core.config.arbitrage.min_profit_percentage),
        );

        Self {
            core,
            resolver,
            detector,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn core(&self) -> &Arc<Core> {
        &self.core
    }

    /// Current stats snapshot, adapters' fetch counters folded in.
    #[must_use]
    pub fn snapshot(&self) -> crate::stats::StatsSnapshot {
        let adapter_counters: HashMap<ProviderId, AdapterCounters> = self
            .core
            .adapters
            .iter()
            .map(|a| (a.provider_id(), a.counters()))
            .collect();
        self.core
            .stats
            .snapshot(&adapter_counters, self.core.publisher.total_dropped())
    }

    /// Runs cycles forever on the configured cadence.
    pub async fn run(self: Arc<Self>) {
        let interval = Duration::from_secs_f64(self.core.config.scrape.interval_seconds.max(0.1));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(
            providers = self.core.adapters.len(),
            interval_seconds = self.core.config.scrape.interval_seconds,
            "scheduler started"
        );

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One pass of scrape → resolve → persist → detect → publish.
    pub async fn run_cycle(self: &Arc<Self>) {
        let started = std::time::Instant::now();
        let deadline = self.core.config.scrape.cycle_deadline();

        let mut handles = Vec::new();
        for adapter in &self.core.adapters {
            let id = adapter.provider_id();

            // Never two concurrent passes for the same provider.
            if !self.in_flight.lock().expect("in-flight lock").insert(id) {
                if let Some(counters) = self.core.stats.provider(id) {
                    counters.skipped_cycles.fetch_add(1, Ordering::Relaxed);
                }
                tracing::warn!(provider = adapter.name(), "previous pass still running, cycle skipped");
                continue;
            }

            let scheduler = self.clone();
            let adapter = adapter.clone();
            handles.push(tokio::spawn(async move {
                let name = adapter.name();
                let pass_started = std::time::Instant::now();
                match tokio::time::timeout(deadline, scheduler.provider_pass(adapter.clone())).await
                {
                    Ok(Ok(())) => {
                        tracing::debug!(
                            provider = name,
                            seconds = pass_started.elapsed().as_secs_f64(),
                            "provider pass complete"
                        );
                    }
                    Ok(Err(err)) => {
                        if let Some(counters) = scheduler.core.stats.provider(id) {
                            counters.failed_cycles.fetch_add(1, Ordering::Relaxed);
                        }
                        tracing::warn!(provider = name, error = %err, "provider cycle failed");
                        adapter.reset_session().await;
                    }
                    Err(_) => {
                        // Cancelled at the deadline; partial work discarded.
                        if let Some(counters) = scheduler.core.stats.provider(id) {
                            counters.deadline_cancellations.fetch_add(1, Ordering::Relaxed);
                        }
                        tracing::warn!(provider = name, "provider pass hit the cycle deadline");
                        adapter.reset_session().await;
                    }
                }
                scheduler
                    .in_flight
                    .lock()
                    .expect("in-flight lock")
                    .remove(&id);
            }));
        }

        // Wait for this cycle's providers; a small grace beyond the
        // deadline covers persist tail latency.
        let _ = tokio::time::timeout(deadline + Duration::from_secs(5), join_all(handles)).await;

        // Detection sees a settled snapshot: every provider persisted,
        // failed, or was skipped. An engine failure skips publishing for
        // this cycle only.
        if let Err(err) = self.detection_pass(Utc::now()).await {
            tracing::warn!(error = %err, "detection failed, publishing skipped this cycle");
        }

        let elapsed = started.elapsed().as_secs_f64();
        self.core.stats.record_cycle(elapsed);
        tracing::debug!(seconds = elapsed, "cycle complete");
    }

    /// One provider's scrape → resolve → persist, in that order.
    async fn provider_pass(&self, adapter: Arc<dyn ProviderAdapter>) -> anyhow::Result<()> {
        let batch = adapter.scrape_all().await;
        let provider = batch.provider;
        if batch.matches.is_empty() {
            return Ok(());
        }

        let candidates = self.load_candidates(&batch.matches).await?;
        let resolved = self.resolver.resolve_batch(batch.matches, &candidates);
        let merged = merge_resolved(provider, resolved);

        let upserts: Vec<MatchUpsert> = merged.iter().map(|(u, _)| u.clone()).collect();
        let ids = self.core.matches.bulk_upsert(&upserts).await?;

        let mut writes = Vec::new();
        for (upsert, odds) in merged {
            let Some(&match_id) = ids.get(&upsert.key()) else {
                continue;
            };
            for row in odds {
                writes.push(OddsWrite {
                    match_id,
                    provider,
                    bet_type: row.bet_type,
                    margin: row.margin,
                    selection: row.selection,
                    p1: row.p1,
                    p2: row.p2,
                    p3: row.p3,
                });
            }
        }
        let outcome = self.core.odds.bulk_upsert(writes).await?;

        if let Some(counters) = self.core.stats.provider(provider) {
            counters
                .matches_persisted
                .fetch_add(ids.len() as u64, Ordering::Relaxed);
            counters
                .odds_rows_written
                .fetch_add(outcome.written as u64, Ordering::Relaxed);
            counters
                .odds_rows_deduped
                .fetch_add(outcome.deduped as u64, Ordering::Relaxed);
        }

        for match_id in outcome.changed_matches {
            self.core
                .publisher
                .publish(&OutboundEvent::odds_update(match_id));
        }

        Ok(())
    }

    /// Candidate matches per sport covering the batch's start-time span.
    async fn load_candidates(
        &self,
        matches: &[RawMatch],
    ) -> anyhow::Result<Vec<arbscan_arbitrage::CandidateMatch>> {
        let mut spans: HashMap<Sport, (DateTime<Utc>, DateTime<Utc>)> = HashMap::new();
        for m in matches {
            let entry = spans.entry(m.sport).or_insert((m.start_time, m.start_time));
            entry.0 = entry.0.min(m.start_time);
            entry.1 = entry.1.max(m.start_time);
        }

        let mut candidates = Vec::new();
        for (sport, (min, max)) in spans {
            let half_span = (max - min) / 2;
            let around = min + half_span;
            let window = half_span + ChronoDuration::minutes(sport.time_window_minutes() * 4);
            candidates.extend(
                self.core
                    .matches
                    .find_candidates(sport, around, window)
                    .await?,
            );
        }
        Ok(candidates)
    }

    /// Detect, record, expire, publish. Runs once per cycle.
    async fn detection_pass(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let snapshot = self.core.odds.fetch_snapshot(now).await?;
        let opportunities = self.detector.detect(&snapshot, now);

        let mut live_hashes = Vec::with_capacity(opportunities.len());
        for opp in &opportunities {
            live_hashes.push(opp.content_hash.clone());
            // Hash collision with an active row means the same
            // opportunity: the record refreshes its last-seen timestamp.
            let is_new = self.core.arbitrage.record(opp).await?;
            if is_new {
                self.core.stats.record_arbitrage_found();
                self.core
                    .publisher
                    .publish(&OutboundEvent::arbitrage_new(opp));
            }
        }

        let expired = self.core.arbitrage.close_expired(now).await?;
        let stale = self.core.arbitrage.close_stale(&live_hashes, now).await?;
        self.core
            .stats
            .record_arbitrage_expired((expired.len() + stale.len()) as u64);

        for closed in expired.into_iter().chain(stale) {
            self.core.publisher.publish(&OutboundEvent::arbitrage_expired(
                closed.match_id,
                closed.bet_type,
                closed.margin,
            ));
        }

        Ok(())
    }
}

/// Folds resolved listings into upsert rows, merging duplicates on the
/// unique match key and reorienting odds for flipped merges.
#[must_use]
pub fn merge_resolved(
    provider: ProviderId,
    resolved: Vec<(RawMatch, Resolution)>,
) -> Vec<(MatchUpsert, Vec<RawOdds>)> {
    let mut order: Vec<(MatchUpsert, Vec<RawOdds>)> = Vec::new();
    let mut index: HashMap<MatchKey, usize> = HashMap::new();

    for (raw, resolution) in resolved {
        let mut odds = raw.odds;
        if resolution.swapped {
            let before = odds.len();
            odds = odds.into_iter().filter_map(flip_orientation).collect();
            let dropped = before - odds.len();
            if dropped > 0 {
                tracing::debug!(%provider, dropped, "rows unrepresentable after orientation flip");
            }
        }

        let upsert = MatchUpsert {
            team1_raw: raw.team1,
            team2_raw: raw.team2,
            team1_norm: resolution.team1_norm,
            team2_norm: resolution.team2_norm,
            sport: raw.sport,
            start_time: resolution.start_time,
            league: raw.league.map(|name| {
                let norm = normalize_league(&name);
                (name, norm)
            }),
            external_id: raw.external_id.map(|ext| (provider, ext)),
        };

        let key = upsert.key();
        match index.get(&key) {
            Some(&i) => order[i].1.extend(odds),
            None => {
                index.insert(key, order.len());
                order.push((upsert, odds));
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbscan_core::BetTypeId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn resolution(team1: &str, team2: &str, start: DateTime<Utc>, swapped: bool) -> Resolution {
        Resolution {
            existing_id: None,
            team1_norm: team1.to_string(),
            team2_norm: team2.to_string(),
            start_time: start,
            swapped,
        }
    }

    #[test]
    fn test_merge_folds_duplicate_listings() {
        // The same fixture arrives twice from one provider (two feeds);
        // the odds merge under one upsert.
        let mut a = RawMatch::new(ProviderId(3), "Arsenal", "Chelsea", Sport::Football, at(18));
        a.push_odds(RawOdds::three_way(BetTypeId(2), dec!(2.1), dec!(3.4), dec!(3.6), dec!(0)));
        let mut b = RawMatch::new(ProviderId(3), "Arsenal FC", "Chelsea FC", Sport::Football, at(18));
        b.push_odds(RawOdds::two_way(BetTypeId(8), dec!(1.8), dec!(1.9), dec!(0)));

        let resolved = vec![
            (a, resolution("arsenal", "chelsea", at(18), false)),
            (b, resolution("arsenal", "chelsea", at(18), false)),
        ];

        let merged = merge_resolved(ProviderId(3), resolved);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].1.len(), 2);
        assert_eq!(merged[0].0.team1_raw, "Arsenal");
    }

    #[test]
    fn test_merge_reorients_swapped_listing() {
        let mut raw = RawMatch::new(ProviderId(3), "Partizan", "Crvena Zvezda", Sport::Football, at(18));
        raw.push_odds(RawOdds::three_way(BetTypeId(2), dec!(3.6), dec!(3.4), dec!(2.1), dec!(0)));
        // Free-form combo cannot survive a flip and must drop.
        raw.push_odds(RawOdds::selection(BetTypeId(46), "GG&3+", dec!(4.0)));

        let resolved = vec![(raw, resolution("crvena zvezda", "partizan", at(18), true))];
        let merged = merge_resolved(ProviderId(3), resolved);

        assert_eq!(merged.len(), 1);
        let odds = &merged[0].1;
        assert_eq!(odds.len(), 1);
        // Outcome-1 now means the stored home side.
        assert_eq!(odds[0].p1, dec!(2.1));
        assert_eq!(odds[0].p3, Some(dec!(3.6)));
    }

    #[test]
    fn test_merge_carries_external_ids_and_league() {
        let mut raw = RawMatch::new(ProviderId(6), "Arsenal", "Chelsea", Sport::Football, at(18))
            .with_league("Premier League")
            .with_external_id("ev-9");
        raw.push_odds(RawOdds::two_way(BetTypeId(8), dec!(1.8), dec!(1.9), dec!(0)));

        let resolved = vec![(raw, resolution("arsenal", "chelsea", at(18), false))];
        let merged = merge_resolved(ProviderId(6), resolved);

        let upsert = &merged[0].0;
        assert_eq!(
            upsert.external_id,
            Some((ProviderId(6), "ev-9".to_string()))
        );
        assert_eq!(
            upsert.league,
            Some(("Premier League".to_string(), "premier league".to_string()))
        );
    }
}
