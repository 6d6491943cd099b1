//! Arbitrage detection over the latest odds.
//!
//! Groups current odds by `(match, bet_type, margin)`, takes the best price
//! per outcome across providers, and emits an opportunity whenever the
//! implied probabilities sum below one. Selection-bearing bet types are
//! only combined when their vocabulary entry declares a complete outcome
//! partition; the partitions are data, never hard-coded here.

use crate::types::{content_hash, Leg, OddsSnapshotRow, Opportunity};
use arbscan_codec::{bet_type, Arity};
use arbscan_core::BetTypeId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Profit percentages are reported on a fixed tick.
const PROFIT_TICK_DP: u32 = 2;

/// Configuration for the detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Publishing floor, percent.
    pub min_profit_percentage: Decimal,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_profit_percentage: Decimal::ONE,
        }
    }
}

impl DetectorConfig {
    #[must_use]
    pub fn with_min_profit(mut self, pct: Decimal) -> Self {
        self.min_profit_percentage = pct;
        self
    }
}

/// Detects profitable price combinations across providers.
#[derive(Debug, Default)]
pub struct ArbitrageDetector {
    config: DetectorConfig,
}

impl ArbitrageDetector {
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs detection over a snapshot of current odds.
    ///
    /// Rows for matches that have already started are ignored; detection
    /// never runs on a mid-cycle snapshot, the scheduler guarantees that.
    #[must_use]
    pub fn detect(&self, rows: &[OddsSnapshotRow], now: DateTime<Utc>) -> Vec<Opportunity> {
        let mut groups: HashMap<(i64, BetTypeId, Decimal), Vec<&OddsSnapshotRow>> = HashMap::new();
        for row in rows {
            if row.match_start <= now {
                continue;
            }
            groups
                .entry((row.match_id, row.bet_type, row.margin.normalize()))
                .or_default()
                .push(row);
        }

        let mut opportunities = Vec::new();
        for ((match_id, bet_type_id, margin), group) in groups {
            if group.len() < 2 {
                continue;
            }
            let Some(def) = bet_type(bet_type_id) else {
                continue;
            };

            let legs = match def.arity {
                Arity::Two | Arity::Three => best_legs_fixed(&group, def.arity.price_count()),
                Arity::One => best_legs_partition(&group, def.partition),
            };
            let Some(legs) = legs else { continue };

            let implied_sum: Decimal = legs.iter().map(|l| Decimal::ONE / l.price).sum();
            if implied_sum >= Decimal::ONE {
                continue;
            }

            let profit_pct =
                ((Decimal::ONE / implied_sum - Decimal::ONE) * dec!(100)).round_dp(PROFIT_TICK_DP);
            if profit_pct < self.config.min_profit_percentage {
                continue;
            }

            let stakes: Vec<Decimal> = legs
                .iter()
                .map(|l| (Decimal::ONE / l.price) / implied_sum)
                .collect();

            let match_start = group[0].match_start;
            let hash = content_hash(match_id, bet_type_id, margin, &legs);

            tracing::info!(
                match_id,
                bet_type = %bet_type_id,
                %margin,
                profit_pct = %profit_pct,
                legs = legs.len(),
                "arbitrage detected"
            );

            opportunities.push(Opportunity {
                match_id,
                bet_type: bet_type_id,
                margin,
                profit_pct,
                legs,
                stakes,
                content_hash: hash,
                detected_at: now,
                expires_at: match_start,
            });
        }

        // Deterministic output order for idempotent downstream handling.
        opportunities.sort_by(|a, b| {
            a.match_id
                .cmp(&b.match_id)
                .then(a.bet_type.cmp(&b.bet_type))
                .then(a.margin.cmp(&b.margin))
        });
        opportunities
    }
}

/// Best price per outcome for a fixed-arity group. Ties go to the lowest
/// provider id.
fn best_legs_fixed(group: &[&OddsSnapshotRow], outcomes: usize) -> Option<Vec<Leg>> {
    let mut legs = Vec::with_capacity(outcomes);
    for outcome in 1..=outcomes as u8 {
        let mut best: Option<Leg> = None;
        for row in group {
            let Some(price) = row.price(outcome) else {
                continue;
            };
            let wins = match &best {
                None => true,
                Some(current) => {
                    price > current.price
                        || (price == current.price && row.provider < current.provider)
                }
            };
            if wins {
                best = Some(Leg {
                    provider: row.provider,
                    outcome,
                    price,
                    selection: String::new(),
                });
            }
        }
        legs.push(best?);
    }
    Some(legs)
}

/// Best price per partition member for a selection-bearing group. The
/// group only forms an opportunity when the bet type declares a complete
/// partition and every member is priced.
fn best_legs_partition(
    group: &[&OddsSnapshotRow],
    partition: Option<&'static [&'static str]>,
) -> Option<Vec<Leg>> {
    let partition = partition?;

    let mut legs = Vec::with_capacity(partition.len());
    for (index, selection) in partition.iter().enumerate() {
        let mut best: Option<Leg> = None;
        for row in group {
            if row.selection != *selection {
                continue;
            }
            let price = row.p1;
            let wins = match &best {
                None => true,
                Some(current) => {
                    price > current.price
                        || (price == current.price && row.provider < current.provider)
                }
            };
            if wins {
                best = Some(Leg {
                    provider: row.provider,
                    outcome: (index + 1) as u8,
                    price,
                    selection: (*selection).to_string(),
                });
            }
        }
        legs.push(best?);
    }
    Some(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbscan_core::ProviderId;
    use chrono::{Duration, TimeZone};

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        kickoff() - Duration::hours(2)
    }

    fn three_way_row(
        provider: i16,
        p1: Decimal,
        p2: Decimal,
        p3: Decimal,
    ) -> OddsSnapshotRow {
        OddsSnapshotRow {
            match_id: 10,
            provider: ProviderId(provider),
            bet_type: BetTypeId(2),
            margin: dec!(0),
            selection: String::new(),
            p1,
            p2: Some(p2),
            p3: Some(p3),
            match_start: kickoff(),
        }
    }

    fn selection_row(provider: i16, selection: &str, p1: Decimal) -> OddsSnapshotRow {
        OddsSnapshotRow {
            match_id: 10,
            provider: ProviderId(provider),
            bet_type: BetTypeId(24),
            margin: dec!(0),
            selection: selection.to_string(),
            p1,
            p2: None,
            p3: None,
            match_start: kickoff(),
        }
    }

    // ==================== Three-Way Detection Tests ====================

    #[test]
    fn test_worked_1x2_example() {
        // Two books on the same 1X2 market; best legs 2.30 / 3.60 / 4.20.
        let detector = ArbitrageDetector::default();
        let rows = vec![
            three_way_row(3, dec!(2.10), dec!(3.50), dec!(4.20)),
            three_way_row(4, dec!(2.30), dec!(3.60), dec!(3.80)),
        ];

        let opportunities = detector.detect(&rows, now());
        assert_eq!(opportunities.len(), 1);

        let opp = &opportunities[0];
        assert_eq!(opp.profit_pct, dec!(5.19));
        assert_eq!(opp.legs[0].provider, ProviderId(4));
        assert_eq!(opp.legs[0].price, dec!(2.30));
        assert_eq!(opp.legs[1].provider, ProviderId(4));
        assert_eq!(opp.legs[1].price, dec!(3.60));
        assert_eq!(opp.legs[2].provider, ProviderId(3));
        assert_eq!(opp.legs[2].price, dec!(4.20));

        // Implied sum below one, stakes sum to one.
        assert!(opp.implied_sum() < Decimal::ONE);
        let stake_sum: Decimal = opp.stakes.iter().sum();
        assert!((stake_sum - Decimal::ONE).abs() < dec!(0.000000001));

        // Stake proportions from the worked example.
        assert_eq!(opp.stakes[0].round_dp(3), dec!(0.457));
        assert_eq!(opp.stakes[1].round_dp(3), dec!(0.292));
        assert_eq!(opp.stakes[2].round_dp(3), dec!(0.250));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let detector = ArbitrageDetector::default();
        let rows = vec![
            three_way_row(3, dec!(2.10), dec!(3.50), dec!(4.20)),
            three_way_row(4, dec!(2.30), dec!(3.60), dec!(3.80)),
        ];

        let first = detector.detect(&rows, now());
        let second = detector.detect(&rows, now());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].content_hash, second[0].content_hash);
    }

    #[test]
    fn test_no_opportunity_when_sum_exceeds_one() {
        let detector = ArbitrageDetector::default();
        let rows = vec![
            three_way_row(3, dec!(2.00), dec!(3.20), dec!(3.50)),
            three_way_row(4, dec!(1.95), dec!(3.30), dec!(3.40)),
        ];

        assert!(detector.detect(&rows, now()).is_empty());
    }

    #[test]
    fn test_profit_floor_filters() {
        let detector =
            ArbitrageDetector::new(DetectorConfig::default().with_min_profit(dec!(10)));
        let rows = vec![
            three_way_row(3, dec!(2.10), dec!(3.50), dec!(4.20)),
            three_way_row(4, dec!(2.30), dec!(3.60), dec!(3.80)),
        ];

        // 5.19 % is below the 10 % floor.
        assert!(detector.detect(&rows, now()).is_empty());
    }

    #[test]
    fn test_tie_breaks_to_lowest_provider_id() {
        let detector = ArbitrageDetector::default();
        let rows = vec![
            three_way_row(6, dec!(2.30), dec!(3.60), dec!(4.20)),
            three_way_row(3, dec!(2.30), dec!(3.10), dec!(3.80)),
        ];

        let opportunities = detector.detect(&rows, now());
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].legs[0].provider, ProviderId(3));
    }

    #[test]
    fn test_single_provider_group_skipped() {
        let detector = ArbitrageDetector::default();
        let rows = vec![three_way_row(3, dec!(2.10), dec!(3.50), dec!(4.20))];
        assert!(detector.detect(&rows, now()).is_empty());
    }

    #[test]
    fn test_started_match_ignored() {
        let detector = ArbitrageDetector::default();
        let rows = vec![
            three_way_row(3, dec!(2.10), dec!(3.50), dec!(4.20)),
            three_way_row(4, dec!(2.30), dec!(3.60), dec!(3.80)),
        ];

        let after_kickoff = kickoff() + Duration::minutes(1);
        assert!(detector.detect(&rows, after_kickoff).is_empty());
    }

    #[test]
    fn test_margin_groups_do_not_mix() {
        // Same bet type, different lines: never combined.
        let detector = ArbitrageDetector::default();
        let mut over_25 = three_way_row(3, dec!(2.30), dec!(3.60), dec!(4.20));
        over_25.bet_type = BetTypeId(5);
        over_25.margin = dec!(2.5);
        over_25.p3 = None;
        let mut over_35 = three_way_row(4, dec!(2.40), dec!(3.70), dec!(4.00));
        over_35.bet_type = BetTypeId(5);
        over_35.margin = dec!(3.5);
        over_35.p3 = None;

        assert!(detector.detect(&[over_25, over_35], now()).is_empty());
    }

    // ==================== Partition Detection Tests ====================

    #[test]
    fn test_htft_partition_combines_when_complete() {
        let detector = ArbitrageDetector::default();
        // Nine selections, all priced generously enough that the implied
        // sum drops below one (1/11 * 9 ≈ 0.818).
        let mut rows = Vec::new();
        let selections = ["1/1", "1/X", "1/2", "X/1", "X/X", "X/2", "2/1", "2/X", "2/2"];
        for (i, sel) in selections.iter().enumerate() {
            let provider = if i % 2 == 0 { 3 } else { 4 };
            rows.push(selection_row(provider, sel, dec!(11.0)));
        }

        let opportunities = detector.detect(&rows, now());
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].legs.len(), 9);
        assert_eq!(opportunities[0].legs[0].selection, "1/1");
    }

    #[test]
    fn test_htft_partition_incomplete_never_combines() {
        let detector = ArbitrageDetector::default();
        let rows = vec![
            selection_row(3, "1/1", dec!(20.0)),
            selection_row(4, "2/2", dec!(20.0)),
        ];

        assert!(detector.detect(&rows, now()).is_empty());
    }

    #[test]
    fn test_undeclared_partition_never_combines() {
        // Correct score declares no partition, so even a complete-looking
        // book never forms an opportunity.
        let detector = ArbitrageDetector::default();
        let mut rows: Vec<OddsSnapshotRow> = vec![
            selection_row(3, "1:0", dec!(50.0)),
            selection_row(4, "0:1", dec!(50.0)),
        ];
        for row in &mut rows {
            row.bet_type = BetTypeId(23);
        }

        assert!(detector.detect(&rows, now()).is_empty());
    }
}
