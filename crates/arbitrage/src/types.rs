//! Value objects shared by the resolver, the detector, and the persister.

use arbscan_core::{BetTypeId, ProviderId, Sport};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// Resolver input
// =============================================================================

/// A stored match the resolver may fold a new listing into.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub id: i64,
    pub team1: String,
    pub team2: String,
    pub team1_norm: String,
    pub team2_norm: String,
    pub sport: Sport,
    pub league_norm: Option<String>,
    pub start_time: DateTime<Utc>,
}

// =============================================================================
// Detector input
// =============================================================================

/// One current-odds row, as the detector sees it: the full five-tuple key
/// plus prices and the match start time for expiry.
#[derive(Debug, Clone)]
pub struct OddsSnapshotRow {
    pub match_id: i64,
    pub provider: ProviderId,
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    pub selection: String,
    pub p1: Decimal,
    pub p2: Option<Decimal>,
    pub p3: Option<Decimal>,
    pub match_start: DateTime<Utc>,
}

impl OddsSnapshotRow {
    /// Price of 1-based outcome `i`, when present.
    #[must_use]
    pub fn price(&self, outcome: u8) -> Option<Decimal> {
        match outcome {
            1 => Some(self.p1),
            2 => self.p2,
            3 => self.p3,
            _ => None,
        }
    }
}

// =============================================================================
// Opportunities
// =============================================================================

/// One leg of an opportunity: the provider offering the best price for one
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub provider: ProviderId,
    /// 1-based outcome index; for partition groups, the position in the
    /// declared partition.
    pub outcome: u8,
    pub price: Decimal,
    /// Selection key for partition legs; empty for fixed-arity markets.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selection: String,
}

/// A detected arbitrage: a set of legs whose implied probabilities sum
/// below one, with the stake split that locks the profit in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub match_id: i64,
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    /// Percent, rounded to the 0.01 tick.
    pub profit_pct: Decimal,
    pub legs: Vec<Leg>,
    /// Normalized to unit stake; same order as `legs`.
    pub stakes: Vec<Decimal>,
    pub content_hash: String,
    pub detected_at: DateTime<Utc>,
    /// Opportunities die when the match starts.
    pub expires_at: DateTime<Utc>,
}

impl Opportunity {
    /// Sum of implied probabilities of the legs.
    #[must_use]
    pub fn implied_sum(&self) -> Decimal {
        self.legs.iter().map(|l| Decimal::ONE / l.price).sum()
    }
}

/// Deterministic content hash over the identity of an opportunity.
///
/// Hashes `(match, bet_type, margin)` plus the leg multiset sorted by
/// outcome then provider, with prices rounded to the 0.001 tick — so leg
/// permutations and sub-tick price noise produce the same hash and
/// re-detection is a no-op.
#[must_use]
pub fn content_hash(
    match_id: i64,
    bet_type: BetTypeId,
    margin: Decimal,
    legs: &[Leg],
) -> String {
    let mut sorted: Vec<&Leg> = legs.iter().collect();
    sorted.sort_by_key(|l| (l.outcome, l.provider));

    let mut hasher = Sha256::new();
    hasher.update(match_id.to_le_bytes());
    hasher.update(bet_type.0.to_le_bytes());
    hasher.update(margin.normalize().to_string().as_bytes());
    for leg in sorted {
        hasher.update([leg.outcome]);
        hasher.update(leg.provider.0.to_le_bytes());
        hasher.update(leg.price.round_dp(3).normalize().to_string().as_bytes());
        hasher.update(leg.selection.as_bytes());
    }

    hex_digest(&hasher.finalize())
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(provider: i16, outcome: u8, price: Decimal) -> Leg {
        Leg {
            provider: ProviderId(provider),
            outcome,
            price,
            selection: String::new(),
        }
    }

    #[test]
    fn test_hash_stable_under_leg_permutation() {
        let legs = vec![leg(3, 1, dec!(2.30)), leg(4, 2, dec!(3.60)), leg(6, 3, dec!(4.20))];
        let mut shuffled = legs.clone();
        shuffled.rotate_left(1);

        let a = content_hash(10, BetTypeId(2), dec!(0), &legs);
        let b = content_hash(10, BetTypeId(2), dec!(0), &shuffled);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_insensitive_to_sub_tick_noise() {
        let a = content_hash(10, BetTypeId(2), dec!(0), &[leg(3, 1, dec!(2.3001))]);
        let b = content_hash(10, BetTypeId(2), dec!(0), &[leg(3, 1, dec!(2.3004))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_sensitive_to_real_changes() {
        let base = content_hash(10, BetTypeId(2), dec!(0), &[leg(3, 1, dec!(2.30))]);
        assert_ne!(
            base,
            content_hash(10, BetTypeId(2), dec!(0), &[leg(3, 1, dec!(2.35))])
        );
        assert_ne!(
            base,
            content_hash(10, BetTypeId(2), dec!(0), &[leg(4, 1, dec!(2.30))])
        );
        assert_ne!(
            base,
            content_hash(11, BetTypeId(2), dec!(0), &[leg(3, 1, dec!(2.30))])
        );
    }

    #[test]
    fn test_hash_margin_scale_insensitive() {
        let a = content_hash(10, BetTypeId(9), dec!(1.0), &[leg(3, 1, dec!(2.0))]);
        let b = content_hash(10, BetTypeId(9), dec!(1.00), &[leg(3, 1, dec!(2.0))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_row_price_indexing() {
        let row = OddsSnapshotRow {
            match_id: 1,
            provider: ProviderId(3),
            bet_type: BetTypeId(2),
            margin: dec!(0),
            selection: String::new(),
            p1: dec!(2.1),
            p2: Some(dec!(3.5)),
            p3: None,
            match_start: Utc::now(),
        };

        assert_eq!(row.price(1), Some(dec!(2.1)));
        assert_eq!(row.price(2), Some(dec!(3.5)));
        assert_eq!(row.price(3), None);
        assert_eq!(row.price(4), None);
    }
}
