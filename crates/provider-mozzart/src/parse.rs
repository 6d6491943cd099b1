//! Mozzart odds parsing.
//!
//! The match document groups odds by `oddsGroup[].odds[]`, each odd naming
//! its game, subgame, and (for parameterized markets) a special value with
//! a type tag (`MARGIN`, `HANDICAP`). Labels are localized; half-scoped
//! combos use Roman-numeral prefixes and `Tim1`/`Tim2` team labels, all
//! folded through the codec before anything leaves this module.

use arbscan_codec::{fold_half_token, fold_or_token, validate_row};
use arbscan_core::{BetTypeId, RawOdds, Sport};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDocument {
    #[serde(rename = "match")]
    pub match_info: Option<MatchInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub id: i64,
    pub home: Option<Participant>,
    pub visitor: Option<Participant>,
    pub start_time: Option<serde_json::Value>,
    pub competition: Option<Competition>,
    #[serde(default)]
    pub special_match_group_id: Option<i64>,
    #[serde(default)]
    pub odds_group: Vec<OddsGroup>,
}

#[derive(Debug, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsGroup {
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub odds: Vec<Odd>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Odd {
    pub game: Option<Game>,
    pub subgame: Option<Subgame>,
    #[serde(default)]
    pub special_odd_value: String,
    pub value: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub special_odd_value_type: String,
}

#[derive(Debug, Deserialize)]
pub struct Subgame {
    #[serde(default)]
    pub name: String,
}

#[derive(Default)]
struct ThreeWaySlots {
    one: Option<Decimal>,
    x: Option<Decimal>,
    two: Option<Decimal>,
}

impl ThreeWaySlots {
    fn set(&mut self, subgame: &str, value: Decimal) {
        match subgame {
            "1" => self.one = Some(value),
            "X" => self.x = Some(value),
            "2" => self.two = Some(value),
            _ => {}
        }
    }

    fn emit(self, bet_type: BetTypeId, out: &mut Vec<RawOdds>) {
        if let (Some(p1), Some(px), Some(p2)) = (self.one, self.x, self.two) {
            out.push(RawOdds::three_way(bet_type, p1, px, p2, Decimal::ZERO));
        }
    }
}

/// Pairs keyed by line: `(under, over)` or `(home, away)`.
type LinePairs = HashMap<Decimal, (Option<Decimal>, Option<Decimal>)>;

fn emit_pairs(pairs: LinePairs, bet_type: BetTypeId, negate: bool, out: &mut Vec<RawOdds>) {
    for (line, (first, second)) in pairs {
        if let (Some(p1), Some(p2)) = (first, second) {
            let margin = if negate { -line } else { line };
            out.push(RawOdds::two_way(bet_type, p1, p2, margin));
        }
    }
}

fn special_line(odd: &Odd) -> Option<Decimal> {
    Decimal::from_str(odd.special_odd_value.trim()).ok()
}

fn parse_football(info: &MatchInfo, out: &mut Vec<RawOdds>, unmapped: &mut u64) {
    let mut ft = ThreeWaySlots::default();
    let mut h1 = ThreeWaySlots::default();
    let mut h2 = ThreeWaySlots::default();
    let mut btts = (None, None);
    let mut totals: LinePairs = HashMap::new();
    let mut totals_h1: LinePairs = HashMap::new();
    let mut totals_h2: LinePairs = HashMap::new();

    for group in &info.odds_group {
        let group_name = group.group_name.to_lowercase();
        for odd in &group.odds {
            let (Some(game), Some(subgame), Some(value)) =
                (odd.game.as_ref(), odd.subgame.as_ref(), odd.value)
            else {
                continue;
            };
            let sub = subgame.name.trim();

            if game.name == "Konačan ishod" && !group_name.contains("poluvreme") {
                ft.set(sub, value);
            } else if group_name.contains("1. poluvreme") || game.name == "Prvo poluvreme" {
                h1.set(sub, value);
            } else if group_name.contains("2. poluvreme") || game.name == "Drugo poluvreme" {
                h2.set(sub, value);
            } else if game.name == "Oba tima daju gol" {
                match sub {
                    "da" => btts.0 = Some(value),
                    "ne" => btts.1 = Some(value),
                    _ => {}
                }
            } else if game.special_odd_value_type == "MARGIN" {
                let Some(line) = special_line(odd) else {
                    continue;
                };
                let target = if group_name.contains("1. poluvreme") {
                    &mut totals_h1
                } else if group_name.contains("2. poluvreme") {
                    &mut totals_h2
                } else {
                    &mut totals
                };
                let entry = target.entry(line.normalize()).or_default();
                match sub {
                    "manje" => entry.0 = Some(value),
                    "više" => entry.1 = Some(value),
                    _ => {}
                }
            } else if game.name == "Golovi u oba poluvremena" {
                // Half-scoped combos with Roman-numeral and Tim labels.
                let folded = if sub.contains('v') {
                    fold_or_token(sub)
                } else {
                    sub.split('&')
                        .map(fold_half_token)
                        .collect::<Vec<_>>()
                        .join("&")
                };
                out.push(RawOdds::selection(BetTypeId(35), folded, value));
            } else {
                *unmapped += 1;
            }
        }
    }

    ft.emit(BetTypeId(2), out);
    h1.emit(BetTypeId(3), out);
    h2.emit(BetTypeId(4), out);
    if let (Some(gg), Some(ng)) = btts {
        out.push(RawOdds::two_way(BetTypeId(8), gg, ng, Decimal::ZERO));
    }
    emit_pairs(totals, BetTypeId(5), false, out);
    emit_pairs(totals_h1, BetTypeId(6), false, out);
    emit_pairs(totals_h2, BetTypeId(7), false, out);
}

fn parse_two_way_sport(
    info: &MatchInfo,
    winner_game: &str,
    out: &mut Vec<RawOdds>,
    unmapped: &mut u64,
) {
    let mut winner = (None, None);
    let mut handicaps: LinePairs = HashMap::new();
    let mut totals: LinePairs = HashMap::new();

    for group in &info.odds_group {
        let group_name = group.group_name.to_lowercase();
        if group_name.contains("poluvreme") {
            continue;
        }
        for odd in &group.odds {
            let (Some(game), Some(subgame), Some(value)) =
                (odd.game.as_ref(), odd.subgame.as_ref(), odd.value)
            else {
                continue;
            };
            let sub = subgame.name.trim();

            if game.name == winner_game {
                match sub {
                    "1" => winner.0 = Some(value),
                    "2" => winner.1 = Some(value),
                    _ => {}
                }
            } else if game.special_odd_value_type == "HANDICAP" {
                let Some(line) = special_line(odd) else {
                    continue;
                };
                let entry = handicaps.entry(line.normalize()).or_default();
                match sub {
                    "1" => entry.0 = Some(value),
                    "2" => entry.1 = Some(value),
                    _ => {}
                }
            } else if game.special_odd_value_type == "MARGIN" {
                let Some(line) = special_line(odd) else {
                    continue;
                };
                let entry = totals.entry(line.normalize()).or_default();
                match sub {
                    "manje" => entry.0 = Some(value),
                    "više" => entry.1 = Some(value),
                    _ => {}
                }
            } else {
                *unmapped += 1;
            }
        }
    }

    if let (Some(p1), Some(p2)) = winner {
        out.push(RawOdds::two_way(BetTypeId(1), p1, p2, Decimal::ZERO));
    }
    emit_pairs(handicaps, BetTypeId(9), false, out);
    emit_pairs(totals, BetTypeId(10), false, out);
}

fn parse_hockey(info: &MatchInfo, out: &mut Vec<RawOdds>, unmapped: &mut u64) {
    let mut ft = ThreeWaySlots::default();

    for group in &info.odds_group {
        for odd in &group.odds {
            let (Some(game), Some(subgame), Some(value)) =
                (odd.game.as_ref(), odd.subgame.as_ref(), odd.value)
            else {
                continue;
            };
            if game.name == "Konačan ishod" {
                ft.set(subgame.name.trim(), value);
            } else {
                *unmapped += 1;
            }
        }
    }

    ft.emit(BetTypeId(2), out);
}

/// Projects one match document into canonical rows.
#[must_use]
pub fn parse_match_odds(info: &MatchInfo, sport: Sport) -> (Vec<RawOdds>, u64) {
    // Specials (outrights, season markets) never map to the vocabulary.
    if info.special_match_group_id.is_some() {
        return (Vec::new(), 0);
    }

    let mut out = Vec::new();
    let mut unmapped = 0u64;

    match sport {
        Sport::Football => parse_football(info, &mut out, &mut unmapped),
        Sport::Basketball => parse_two_way_sport(info, "Pobednik meča", &mut out, &mut unmapped),
        Sport::Tennis | Sport::TableTennis => {
            parse_two_way_sport(info, "Pobednik", &mut out, &mut unmapped);
        }
        Sport::Hockey => parse_hockey(info, &mut out, &mut unmapped),
    }

    if unmapped > 0 {
        tracing::debug!(provider = "mozzart", unmapped, "unmapped vendor markets dropped");
    }

    let rows = out
        .into_iter()
        .filter(|row| match validate_row(row) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(provider = "mozzart", error = %err, "price row rejected");
                false
            }
        })
        .collect();

    (rows, unmapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn doc(json: serde_json::Value) -> MatchInfo {
        let document: MatchDocument = serde_json::from_value(json).unwrap();
        document.match_info.unwrap()
    }

    fn football_fixture() -> MatchInfo {
        doc(serde_json::json!({
            "match": {
                "id": 42,
                "home": {"name": "Crvena Zvezda"},
                "visitor": {"name": "Partizan"},
                "startTime": 1_770_000_000_000i64,
                "competition": {"name": "Superliga"},
                "oddsGroup": [
                    {
                        "groupName": "Osnovne igre",
                        "odds": [
                            {"game": {"name": "Konačan ishod"}, "subgame": {"name": "1"}, "value": 2.05},
                            {"game": {"name": "Konačan ishod"}, "subgame": {"name": "X"}, "value": 3.30},
                            {"game": {"name": "Konačan ishod"}, "subgame": {"name": "2"}, "value": 3.70},
                            {"game": {"name": "Oba tima daju gol"}, "subgame": {"name": "da"}, "value": 1.75},
                            {"game": {"name": "Oba tima daju gol"}, "subgame": {"name": "ne"}, "value": 2.00}
                        ]
                    },
                    {
                        "groupName": "Golovi",
                        "odds": [
                            {"game": {"name": "Ukupno golova", "specialOddValueType": "MARGIN"},
                             "subgame": {"name": "manje"}, "specialOddValue": "2.5", "value": 1.85},
                            {"game": {"name": "Ukupno golova", "specialOddValueType": "MARGIN"},
                             "subgame": {"name": "više"}, "specialOddValue": "2.5", "value": 1.95}
                        ]
                    },
                    {
                        "groupName": "Kombinacije",
                        "odds": [
                            {"game": {"name": "Golovi u oba poluvremena"},
                             "subgame": {"name": "I1+&II1+"}, "value": 2.40},
                            {"game": {"name": "Golovi u oba poluvremena"},
                             "subgame": {"name": "I GG"}, "value": 3.10}
                        ]
                    }
                ]
            }
        }))
    }

    // ==================== Football Parsing Tests ====================

    #[test]
    fn test_parse_football_core_markets() {
        let info = football_fixture();
        let (rows, unmapped) = parse_match_odds(&info, Sport::Football);

        assert_eq!(unmapped, 0);

        let result = rows.iter().find(|r| r.bet_type == BetTypeId(2)).unwrap();
        assert_eq!(result.p1, dec!(2.05));
        assert_eq!(result.p3, Some(dec!(3.70)));

        let btts = rows.iter().find(|r| r.bet_type == BetTypeId(8)).unwrap();
        assert_eq!(btts.p1, dec!(1.75));

        let total = rows.iter().find(|r| r.bet_type == BetTypeId(5)).unwrap();
        assert_eq!(total.margin, dec!(2.5));
    }

    #[test]
    fn test_roman_half_combos_fold_to_grammar() {
        let info = football_fixture();
        let (rows, _) = parse_match_odds(&info, Sport::Football);

        let combos: Vec<&RawOdds> =
            rows.iter().filter(|r| r.bet_type == BetTypeId(35)).collect();
        assert_eq!(combos.len(), 2);

        let selections: Vec<&str> = combos.iter().map(|r| r.selection.as_str()).collect();
        assert!(selections.contains(&"H1:1+&H2:1+"));
        assert!(selections.contains(&"GG_H1"));
    }

    #[test]
    fn test_specials_are_skipped_entirely() {
        let info = doc(serde_json::json!({
            "match": {
                "id": 43,
                "specialMatchGroupId": 7,
                "oddsGroup": [{
                    "groupName": "x",
                    "odds": [{"game": {"name": "Konačan ishod"}, "subgame": {"name": "1"}, "value": 1.10}]
                }]
            }
        }));

        let (rows, unmapped) = parse_match_odds(&info, Sport::Football);
        assert!(rows.is_empty());
        assert_eq!(unmapped, 0);
    }

    // ==================== Basketball Parsing Tests ====================

    #[test]
    fn test_basketball_winner_and_handicap() {
        let info = doc(serde_json::json!({
            "match": {
                "id": 50,
                "oddsGroup": [{
                    "groupName": "Košarka",
                    "odds": [
                        {"game": {"name": "Pobednik meča"}, "subgame": {"name": "1"}, "value": 1.60},
                        {"game": {"name": "Pobednik meča"}, "subgame": {"name": "2"}, "value": 2.30},
                        {"game": {"name": "Hendikep", "specialOddValueType": "HANDICAP"},
                         "subgame": {"name": "1"}, "specialOddValue": "-4.5", "value": 1.90},
                        {"game": {"name": "Hendikep", "specialOddValueType": "HANDICAP"},
                         "subgame": {"name": "2"}, "specialOddValue": "-4.5", "value": 1.90}
                    ]
                }]
            }
        }));

        let (rows, _) = parse_match_odds(&info, Sport::Basketball);

        let winner = rows.iter().find(|r| r.bet_type == BetTypeId(1)).unwrap();
        assert_eq!(winner.p1, dec!(1.60));

        let handicap = rows.iter().find(|r| r.bet_type == BetTypeId(9)).unwrap();
        assert_eq!(handicap.margin, dec!(-4.5));
    }

    #[test]
    fn test_incomplete_three_way_never_emits() {
        let info = doc(serde_json::json!({
            "match": {
                "id": 60,
                "oddsGroup": [{
                    "groupName": "Osnovne igre",
                    "odds": [
                        {"game": {"name": "Konačan ishod"}, "subgame": {"name": "1"}, "value": 2.05},
                        {"game": {"name": "Konačan ishod"}, "subgame": {"name": "X"}, "value": 3.30}
                    ]
                }]
            }
        }));

        let (rows, _) = parse_match_odds(&info, Sport::Football);
        assert!(rows.is_empty());
    }
}
