//! Cross-provider audit: the same real-world wager must produce
//! byte-identical canonical keys no matter which adapter saw it, and the
//! detector must be able to combine the results.

use arbscan_arbitrage::{ArbitrageDetector, OddsSnapshotRow};
use arbscan_codec::fold_negated_handicap;
use arbscan_core::{BetTypeId, ProviderId, RawOdds, Sport};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
}

fn snapshot_row(provider: i16, row: &RawOdds, match_id: i64) -> OddsSnapshotRow {
    OddsSnapshotRow {
        match_id,
        provider: ProviderId(provider),
        bet_type: row.bet_type,
        margin: row.margin,
        selection: row.selection.clone(),
        p1: row.p1,
        p2: row.p2,
        p3: row.p3,
        match_start: kickoff(),
    }
}

// =============================================================================
// HT/FT separator convergence
// =============================================================================

/// One provider spells the platform code `10`, another compresses it to
/// `PK_1-1`, a third ships structured halves. All three must persist
/// `(ht_ft, "1/1", 0)`.
#[test]
fn test_htft_encodes_identically_across_providers() {
    // Soccerbet: platform code 10 under a NULL param cell.
    let mut bet_map: arbscan_soccerbet::BetMap = HashMap::new();
    bet_map.entry("10".to_string()).or_default().insert(
        "NULL".to_string(),
        arbscan_soccerbet::OddsCell { ov: dec!(4.60) },
    );
    let (soccerbet_rows, _) = arbscan_soccerbet::parse_bet_map(&bet_map, Sport::Football);

    // SuperBet: compressed overview code with a dash separator.
    let decoded = arbscan_superbet::markets::decode(Sport::Football, "PK_1-1").unwrap();
    let mut superbet_rows = Vec::new();
    let mut buffer = arbscan_superbet::markets::PairBuffer::default();
    buffer.feed(decoded, None, dec!(4.70), &mut superbet_rows);
    buffer.flush(&mut superbet_rows);

    // Structured form: half and full results assembled by hand.
    let structured = RawOdds::selection(BetTypeId(24), "1/1", dec!(4.80));

    let a = &soccerbet_rows[0];
    let b = &superbet_rows[0];
    assert_eq!(a.key(), b.key());
    assert_eq!(a.key(), structured.key());
    assert_eq!(a.selection, "1/1");

    // And an inferior 1/X price elsewhere stays a distinct key.
    let other = RawOdds::selection(BetTypeId(24), "1/X", dec!(6.0));
    assert_ne!(a.key(), other.key());
}

// =============================================================================
// Handicap sign convergence
// =============================================================================

/// Provider X (negated family) reports `hcp = -1.0`; provider Y reports
/// `+1.0` in the canonical convention. Both encode to `margin = +1.0`, and
/// the detector sees four comparable prices on one line.
#[test]
fn test_handicap_sign_agrees_and_groups() {
    let x_line = fold_negated_handicap(dec!(-1.0));
    let x = RawOdds::two_way(BetTypeId(9), dec!(1.70), dec!(2.10), x_line);

    let y = RawOdds::two_way(BetTypeId(9), dec!(1.72), dec!(2.05), dec!(1.0));

    assert_eq!(x.margin, dec!(1.0));
    assert_eq!(x.key(), y.key());

    // Grouped by the shared key, the detector picks the single strongest
    // line per outcome: 1.72 home (provider 4), 2.10 away (provider 3).
    let detector = ArbitrageDetector::default();
    let rows = vec![snapshot_row(3, &x, 7), snapshot_row(4, &y, 7)];
    let now = kickoff() - chrono::Duration::hours(1);

    // 1/1.72 + 1/2.10 > 1, so no opportunity; the point is the grouping.
    assert!(detector.detect(&rows, now).is_empty());

    let best_home = rows
        .iter()
        .map(|r| (r.provider, r.p1))
        .max_by_key(|(_, p)| *p)
        .unwrap();
    assert_eq!(best_home, (ProviderId(4), dec!(1.72)));
}

// =============================================================================
// Admiral vs platform-family equivalence
// =============================================================================

/// A structured-feed total and a flat-platform total for the same line
/// carry the same canonical key.
#[test]
fn test_total_line_agrees_across_shapes() {
    let admiral_bets = vec![arbscan_admiral::Bet {
        bet_type_id: Some(137),
        bet_type_name: "Ukupno golova".to_string(),
        bet_outcomes: vec![
            arbscan_admiral::BetOutcome {
                name: "Manje".to_string(),
                odd: Some(dec!(1.85)),
                order_no: 1,
                s_bv: Some("2.5".to_string()),
            },
            arbscan_admiral::BetOutcome {
                name: "Više".to_string(),
                odd: Some(dec!(1.95)),
                order_no: 2,
                s_bv: Some("2.5".to_string()),
            },
        ],
    }];
    let (admiral_rows, _) = arbscan_admiral::markets::parse_bets(&admiral_bets, Sport::Football);

    let platform_row = RawOdds::two_way(BetTypeId(5), dec!(1.83), dec!(1.97), dec!(2.5));

    assert_eq!(admiral_rows.len(), 1);
    assert_eq!(admiral_rows[0].key(), platform_row.key());
    // Under is outcome-1 everywhere.
    assert_eq!(admiral_rows[0].p1, dec!(1.85));
}

// =============================================================================
// The worked 1X2 example, end to end through detection
// =============================================================================

#[test]
fn test_worked_example_across_two_providers() {
    let a = RawOdds::three_way(BetTypeId(2), dec!(2.10), dec!(3.50), dec!(4.20), dec!(0));
    let b = RawOdds::three_way(BetTypeId(2), dec!(2.30), dec!(3.60), dec!(3.80), dec!(0));

    let detector = ArbitrageDetector::default();
    let rows = vec![snapshot_row(3, &a, 99), snapshot_row(4, &b, 99)];
    let now = kickoff() - chrono::Duration::hours(1);

    let found = detector.detect(&rows, now);
    assert_eq!(found.len(), 1);
    let opp = &found[0];

    assert_eq!(opp.profit_pct, dec!(5.19));
    let prices: Vec<Decimal> = opp.legs.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![dec!(2.30), dec!(3.60), dec!(4.20)]);

    // Re-running produces the identical hash: re-detection is a no-op.
    let again = detector.detect(&rows, now);
    assert_eq!(opp.content_hash, again[0].content_hash);

    let stake_sum: Decimal = opp.stakes.iter().sum();
    assert!((stake_sum - Decimal::ONE).abs() < dec!(0.000000001));
}
