//! Admiral bet-type projection.
//!
//! Football and basketball bets carry stable numeric `betTypeId`s; tennis,
//! hockey, and table tennis are matched on the localized bet-type name the
//! way the offer document presents them.

use crate::{Bet, BetOutcome};
use arbscan_core::{BetTypeId, RawOdds, Sport};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Admiral bet-type id → canonical id, football.
const FOOTBALL_IDS: &[(i64, i16)] = &[
    (135, 2),  // 1X2 full time
    (148, 3),  // 1X2 first half
    (149, 4),  // 1X2 second half
    (151, 8),  // both teams to score
];

/// Over/under markets, football: admiral id → canonical id.
const FOOTBALL_TOTALS: &[(i64, i16)] = &[(137, 5), (143, 6), (144, 7)];

/// Basketball: winner, total points, handicap.
const BASKETBALL_WINNER: i64 = 186;
const BASKETBALL_TOTAL: i64 = 213;
const BASKETBALL_HANDICAP: i64 = 191;

fn sorted_outcomes(bet: &Bet) -> Vec<&BetOutcome> {
    let mut outcomes: Vec<&BetOutcome> = bet.bet_outcomes.iter().collect();
    outcomes.sort_by_key(|o| o.order_no);
    outcomes
}

fn line_of(outcome: &BetOutcome) -> Option<Decimal> {
    Decimal::from_str(outcome.s_bv.as_deref()?.trim()).ok()
}

fn is_over(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("vi") || lower.contains("over")
}

/// Groups an over/under bet's outcomes by line and emits one row per
/// complete pair.
fn parse_totals(bet: &Bet, bet_type: BetTypeId, out: &mut Vec<RawOdds>) {
    let mut by_line: HashMap<Decimal, (Option<Decimal>, Option<Decimal>)> = HashMap::new();

    for outcome in &bet.bet_outcomes {
        let (Some(line), Some(odd)) = (line_of(outcome), outcome.odd) else {
            continue;
        };
        let entry = by_line.entry(line.normalize()).or_default();
        if is_over(&outcome.name) {
            entry.1 = Some(odd);
        } else {
            entry.0 = Some(odd);
        }
    }

    for (line, (under, over)) in by_line {
        if let (Some(under), Some(over)) = (under, over) {
            out.push(RawOdds::two_way(bet_type, under, over, line));
        }
    }
}

/// Groups a handicap bet's outcomes ("1"/"2") by line. Admiral reports the
/// line in the canonical sign convention already.
fn parse_handicap(bet: &Bet, bet_type: BetTypeId, out: &mut Vec<RawOdds>) {
    let mut by_line: HashMap<Decimal, (Option<Decimal>, Option<Decimal>)> = HashMap::new();

    for outcome in &bet.bet_outcomes {
        let (Some(line), Some(odd)) = (line_of(outcome), outcome.odd) else {
            continue;
        };
        let entry = by_line.entry(line.normalize()).or_default();
        match outcome.name.trim() {
            "1" => entry.0 = Some(odd),
            "2" => entry.1 = Some(odd),
            _ => {}
        }
    }

    for (line, (home, away)) in by_line {
        if let (Some(home), Some(away)) = (home, away) {
            out.push(RawOdds::two_way(bet_type, home, away, line));
        }
    }
}

fn parse_fixed_arity(bet: &Bet, bet_type: BetTypeId, arity: usize, out: &mut Vec<RawOdds>) {
    let outcomes = sorted_outcomes(bet);
    if outcomes.len() < arity {
        return;
    }
    let odds: Vec<Decimal> = outcomes
        .iter()
        .take(arity)
        .filter_map(|o| o.odd)
        .collect();
    if odds.len() < arity {
        return;
    }

    match arity {
        2 => out.push(RawOdds::two_way(bet_type, odds[0], odds[1], Decimal::ZERO)),
        3 => out.push(RawOdds::three_way(
            bet_type,
            odds[0],
            odds[1],
            odds[2],
            Decimal::ZERO,
        )),
        _ => {}
    }
}

fn parse_football(bets: &[Bet], out: &mut Vec<RawOdds>, unmapped: &mut u64) {
    for bet in bets {
        let Some(vendor_id) = bet.bet_type_id else {
            *unmapped += 1;
            continue;
        };

        if let Some((_, canonical)) = FOOTBALL_IDS.iter().find(|(id, _)| *id == vendor_id) {
            let bet_type = BetTypeId(*canonical);
            let arity = if *canonical == 8 { 2 } else { 3 };
            parse_fixed_arity(bet, bet_type, arity, out);
        } else if let Some((_, canonical)) =
            FOOTBALL_TOTALS.iter().find(|(id, _)| *id == vendor_id)
        {
            parse_totals(bet, BetTypeId(*canonical), out);
        } else {
            *unmapped += 1;
        }
    }
}

fn parse_basketball(bets: &[Bet], out: &mut Vec<RawOdds>, unmapped: &mut u64) {
    for bet in bets {
        match bet.bet_type_id {
            Some(BASKETBALL_WINNER) => parse_fixed_arity(bet, BetTypeId(1), 2, out),
            Some(BASKETBALL_TOTAL) => parse_totals(bet, BetTypeId(10), out),
            Some(BASKETBALL_HANDICAP) => parse_handicap(bet, BetTypeId(9), out),
            _ => *unmapped += 1,
        }
    }
}

fn parse_by_name(bets: &[Bet], sport: Sport, out: &mut Vec<RawOdds>, unmapped: &mut u64) {
    for bet in bets {
        match (sport, bet.bet_type_name.as_str()) {
            (Sport::Tennis | Sport::TableTennis, "Pobednik") => {
                parse_fixed_arity(bet, BetTypeId(1), 2, out);
            }
            (Sport::Tennis, "1.set - Pobednik") => {
                parse_fixed_arity(bet, BetTypeId(57), 2, out);
            }
            (Sport::Hockey, "Konacan ishod") => {
                parse_fixed_arity(bet, BetTypeId(2), 3, out);
            }
            _ => *unmapped += 1,
        }
    }
}

/// Projects one event's bets into canonical rows; returns the rows and the
/// unmapped-market count.
#[must_use]
pub fn parse_bets(bets: &[Bet], sport: Sport) -> (Vec<RawOdds>, u64) {
    let mut out = Vec::new();
    let mut unmapped = 0u64;

    match sport {
        Sport::Football => parse_football(bets, &mut out, &mut unmapped),
        Sport::Basketball => parse_basketball(bets, &mut out, &mut unmapped),
        Sport::Tennis | Sport::Hockey | Sport::TableTennis => {
            parse_by_name(bets, sport, &mut out, &mut unmapped);
        }
    }

    if unmapped > 0 {
        tracing::debug!(provider = "admiral", unmapped, "unmapped vendor markets dropped");
    }
    (out, unmapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn outcome(name: &str, odd: Decimal, order: i64, sbv: Option<&str>) -> BetOutcome {
        BetOutcome {
            name: name.to_string(),
            odd: Some(odd),
            order_no: order,
            s_bv: sbv.map(str::to_string),
        }
    }

    #[test]
    fn test_football_1x2_by_vendor_id() {
        let bets = vec![Bet {
            bet_type_id: Some(135),
            bet_type_name: "Konacan ishod".into(),
            bet_outcomes: vec![
                outcome("1", dec!(2.10), 1, None),
                outcome("X", dec!(3.40), 2, None),
                outcome("2", dec!(3.60), 3, None),
            ],
        }];

        let (rows, unmapped) = parse_bets(&bets, Sport::Football);
        assert_eq!(rows.len(), 1);
        assert_eq!(unmapped, 0);
        assert_eq!(rows[0].bet_type, BetTypeId(2));
        assert_eq!(rows[0].p2, Some(dec!(3.40)));
    }

    #[test]
    fn test_totals_pair_by_line() {
        let bets = vec![Bet {
            bet_type_id: Some(137),
            bet_type_name: "Ukupno golova".into(),
            bet_outcomes: vec![
                outcome("Manje", dec!(1.85), 1, Some("2.5")),
                outcome("Više", dec!(1.95), 2, Some("2.5")),
                outcome("Manje", dec!(1.30), 3, Some("3.5")),
                // 3.5 over side missing: that line is dropped.
            ],
        }];

        let (rows, _) = parse_bets(&bets, Sport::Football);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].margin, dec!(2.5));
        assert_eq!(rows[0].p1, dec!(1.85));
    }

    #[test]
    fn test_basketball_handicap_keeps_sign() {
        let bets = vec![Bet {
            bet_type_id: Some(191),
            bet_type_name: "Hendikep".into(),
            bet_outcomes: vec![
                outcome("1", dec!(1.90), 1, Some("-4.5")),
                outcome("2", dec!(1.90), 2, Some("-4.5")),
            ],
        }];

        let (rows, _) = parse_bets(&bets, Sport::Basketball);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(9));
        assert_eq!(rows[0].margin, dec!(-4.5));
    }

    #[test]
    fn test_tennis_matches_by_name() {
        let bets = vec![Bet {
            bet_type_id: Some(999),
            bet_type_name: "Pobednik".into(),
            bet_outcomes: vec![
                outcome("1", dec!(1.55), 1, None),
                outcome("2", dec!(2.40), 2, None),
            ],
        }];

        let (rows, _) = parse_bets(&bets, Sport::Tennis);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(1));
    }

    #[test]
    fn test_unknown_vendor_bets_counted() {
        let bets = vec![Bet {
            bet_type_id: Some(12345),
            bet_type_name: "Nesto egzoticno".into(),
            bet_outcomes: vec![],
        }];

        let (rows, unmapped) = parse_bets(&bets, Sport::Football);
        assert!(rows.is_empty());
        assert_eq!(unmapped, 1);
    }
}
