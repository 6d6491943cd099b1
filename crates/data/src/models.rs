//! Row shapes exchanged with the store.

use arbscan_core::{BetTypeId, ProviderId, Sport};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// The unique key of a match row. Resolver and persister agree on it
/// byte-for-byte because both use the codec normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub team1_norm: String,
    pub team2_norm: String,
    pub sport: Sport,
    pub start_time: DateTime<Utc>,
}

/// One match heading into the bulk upsert.
#[derive(Debug, Clone)]
pub struct MatchUpsert {
    pub team1_raw: String,
    pub team2_raw: String,
    pub team1_norm: String,
    pub team2_norm: String,
    pub sport: Sport,
    pub start_time: DateTime<Utc>,
    /// Raw and normalized league name, when the provider offers one.
    pub league: Option<(String, String)>,
    /// Provider-local event id, merged into the `external_ids` map.
    pub external_id: Option<(ProviderId, String)>,
}

impl MatchUpsert {
    #[must_use]
    pub fn key(&self) -> MatchKey {
        MatchKey {
            team1_norm: self.team1_norm.clone(),
            team2_norm: self.team2_norm.clone(),
            sport: self.sport,
            start_time: self.start_time,
        }
    }

    #[must_use]
    pub fn external_ids_json(&self) -> serde_json::Value {
        match &self.external_id {
            Some((provider, ext)) => {
                serde_json::json!({ provider.0.to_string(): ext })
            }
            None => serde_json::json!({}),
        }
    }
}

/// One odds row heading into the bulk write, keyed by the full five-tuple.
#[derive(Debug, Clone)]
pub struct OddsWrite {
    pub match_id: i64,
    pub provider: ProviderId,
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    pub selection: String,
    pub p1: Decimal,
    pub p2: Option<Decimal>,
    pub p3: Option<Decimal>,
}

impl OddsWrite {
    /// The primary-key tuple, margin normalized so `2.5` and `2.50` are
    /// one key.
    #[must_use]
    pub fn key(&self) -> (i64, ProviderId, BetTypeId, Decimal, String) {
        (
            self.match_id,
            self.provider,
            self.bet_type,
            self.margin.normalize(),
            self.selection.clone(),
        )
    }
}

/// What the odds write reported back.
#[derive(Debug, Clone, Default)]
pub struct OddsWriteOutcome {
    /// Rows written after in-memory dedupe.
    pub written: usize,
    /// Rows dropped by the dedupe.
    pub deduped: usize,
    /// Matches whose prices actually changed this cycle (inserted rows or
    /// price movements), for the `odds.update` fan-out.
    pub changed_matches: Vec<i64>,
}

/// Dedupes a batch by the five-tuple primary key, first observation wins.
#[must_use]
pub fn dedupe_odds(rows: Vec<OddsWrite>) -> (Vec<OddsWrite>, usize) {
    let mut seen = std::collections::HashSet::new();
    let before = rows.len();
    let kept: Vec<OddsWrite> = rows
        .into_iter()
        .filter(|row| seen.insert(row.key()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
