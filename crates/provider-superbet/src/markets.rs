//! Decode tables for the compressed overview codes.
//!
//! An overview item's `n` is `<market>_<outcome>`: `KI_1` is the home leg
//! of the full-time result, `UG_M` the under leg of the total (line in
//! `h`), `PK_1-1` a halftime/fulltime selection. Codes not in these tables
//! are unmapped markets: dropped and counted, never an error.

use arbscan_codec::fold_htft_separator;
use arbscan_core::{BetTypeId, RawOdds, Sport};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// What one overview code means.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// One leg of a fixed-arity market.
    Outcome {
        bet_type: BetTypeId,
        /// 1-based price slot.
        slot: u8,
        arity: u8,
        /// Whether the market's identity includes the `h` line.
        takes_line: bool,
    },
    /// A complete selection-bearing row.
    Selection {
        bet_type: BetTypeId,
        selection: String,
    },
}

fn outcome(bet_type: i16, slot: u8, arity: u8, takes_line: bool) -> Option<Decoded> {
    Some(Decoded::Outcome {
        bet_type: BetTypeId(bet_type),
        slot,
        arity,
        takes_line,
    })
}

fn three_way(outcome_code: &str, bet_type: i16) -> Option<Decoded> {
    let slot = match outcome_code {
        "1" => 1,
        "0" => 2,
        "2" => 3,
        _ => return None,
    };
    outcome(bet_type, slot, 3, false)
}

fn under_over(outcome_code: &str, bet_type: i16) -> Option<Decoded> {
    let slot = match outcome_code {
        "M" => 1, // manje / under
        "V" => 2, // više / over
        _ => return None,
    };
    outcome(bet_type, slot, 2, true)
}

fn two_sided(outcome_code: &str, bet_type: i16, takes_line: bool) -> Option<Decoded> {
    let slot = match outcome_code {
        "1" => 1,
        "2" => 2,
        _ => return None,
    };
    outcome(bet_type, slot, 2, takes_line)
}

/// Decodes one overview code for one sport.
#[must_use]
pub fn decode(sport: Sport, n: &str) -> Option<Decoded> {
    let (market, outcome_code) = n.split_once('_')?;

    match (sport, market) {
        (Sport::Football, "KI") => three_way(outcome_code, 2),
        (Sport::Football, "P1") => three_way(outcome_code, 3),
        (Sport::Football, "P2") => three_way(outcome_code, 4),
        (Sport::Football, "GG") => two_sided(outcome_code, 8, false),
        (Sport::Football, "UG") => under_over(outcome_code, 5),
        (Sport::Football, "U1") => under_over(outcome_code, 6),
        (Sport::Football, "U2") => under_over(outcome_code, 7),
        (Sport::Football, "PK") => Some(Decoded::Selection {
            bet_type: BetTypeId(24),
            selection: fold_htft_separator(outcome_code),
        }),

        (Sport::Basketball, "PB") => two_sided(outcome_code, 1, false),
        (Sport::Basketball, "HE") => two_sided(outcome_code, 9, true),
        (Sport::Basketball, "UP") => under_over(outcome_code, 10),

        (Sport::Tennis, "PB") => two_sided(outcome_code, 1, false),
        (Sport::Tennis, "S1") => two_sided(outcome_code, 57, false),

        (Sport::Hockey, "KI") => three_way(outcome_code, 2),
        (Sport::Hockey, "UG") => under_over(outcome_code, 5),

        (Sport::TableTennis, "PB") => two_sided(outcome_code, 1, false),

        _ => None,
    }
}

/// Accumulates fixed-arity legs until a market's slots fill up.
///
/// The overview interleaves legs freely; rows only emit once complete, so
/// a half-quoted market never reaches the persister.
#[derive(Default)]
pub struct PairBuffer {
    slots: HashMap<(i16, Option<Decimal>), (u8, [Option<Decimal>; 3])>,
}

impl PairBuffer {
    /// Feeds one decoded leg. Selections emit immediately; outcome legs
    /// buffer by `(bet type, line)`.
    pub fn feed(
        &mut self,
        decoded: Decoded,
        line: Option<Decimal>,
        price: Decimal,
        out: &mut Vec<RawOdds>,
    ) {
        match decoded {
            Decoded::Selection {
                bet_type,
                selection,
            } => {
                let (bet_type, selection) =
                    arbscan_codec::reroute_goal_range(bet_type, &selection);
                out.push(RawOdds::selection(bet_type, selection, price));
            }
            Decoded::Outcome {
                bet_type,
                slot,
                arity,
                takes_line,
            } => {
                let key_line = if takes_line {
                    match line {
                        Some(l) => Some(l.normalize()),
                        // A line-taking market without a line is malformed.
                        None => return,
                    }
                } else {
                    None
                };

                let entry = self
                    .slots
                    .entry((bet_type.0, key_line))
                    .or_insert((arity, [None; 3]));
                if (1..=3).contains(&slot) {
                    entry.1[(slot - 1) as usize] = Some(price);
                }
            }
        }
    }

    /// Emits every market whose slots are complete.
    pub fn flush(self, out: &mut Vec<RawOdds>) {
        for ((bet_type, line), (arity, slots)) in self.slots {
            let margin = line.unwrap_or_default();
            match (arity, slots) {
                (2, [Some(p1), Some(p2), _]) => {
                    out.push(RawOdds::two_way(BetTypeId(bet_type), p1, p2, margin));
                }
                (3, [Some(p1), Some(p2), Some(p3)]) => {
                    out.push(RawOdds::three_way(BetTypeId(bet_type), p1, p2, p3, margin));
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_result_codes() {
        assert_eq!(
            decode(Sport::Football, "KI_0"),
            Some(Decoded::Outcome {
                bet_type: BetTypeId(2),
                slot: 2,
                arity: 3,
                takes_line: false
            })
        );
        assert!(decode(Sport::Football, "KI_X").is_none());
        assert!(decode(Sport::Football, "nonsense").is_none());
    }

    #[test]
    fn test_decode_is_sport_scoped() {
        // Hockey knows KI, tennis does not.
        assert!(decode(Sport::Hockey, "KI_1").is_some());
        assert!(decode(Sport::Tennis, "KI_1").is_none());
    }

    #[test]
    fn test_buffer_emits_only_complete_markets() {
        let mut buffer = PairBuffer::default();
        let mut out = Vec::new();

        buffer.feed(
            decode(Sport::Football, "UG_M").unwrap(),
            Some(dec!(2.5)),
            dec!(1.85),
            &mut out,
        );
        buffer.feed(
            decode(Sport::Football, "UG_V").unwrap(),
            Some(dec!(2.5)),
            dec!(1.95),
            &mut out,
        );
        // A second line with only one side.
        buffer.feed(
            decode(Sport::Football, "UG_M").unwrap(),
            Some(dec!(3.5)),
            dec!(1.30),
            &mut out,
        );

        buffer.flush(&mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].margin, dec!(2.5));
        assert_eq!(out[0].p1, dec!(1.85));
        assert_eq!(out[0].p2, Some(dec!(1.95)));
    }

    #[test]
    fn test_lines_keep_markets_apart() {
        let mut buffer = PairBuffer::default();
        let mut out = Vec::new();

        for (line, under, over) in [
            (dec!(2.5), dec!(1.85), dec!(1.95)),
            (dec!(3.5), dec!(1.30), dec!(3.20)),
        ] {
            buffer.feed(
                decode(Sport::Football, "UG_M").unwrap(),
                Some(line),
                under,
                &mut out,
            );
            buffer.feed(
                decode(Sport::Football, "UG_V").unwrap(),
                Some(line),
                over,
                &mut out,
            );
        }
        buffer.flush(&mut out);

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_htft_selection_folds_separator() {
        let mut buffer = PairBuffer::default();
        let mut out = Vec::new();

        buffer.feed(
            decode(Sport::Football, "PK_X-2").unwrap(),
            None,
            dec!(15.0),
            &mut out,
        );
        buffer.flush(&mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].selection, "X/2");
        assert_eq!(out[0].bet_type, BetTypeId(24));
    }
}
