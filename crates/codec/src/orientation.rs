//! Reorienting odds when a listing merges into a match with the opposite
//! team order.
//!
//! Outcome-1 always means the stored match's home side, so a flipped
//! listing's team-dependent rows must swap before persisting. Rows whose
//! selections cannot be safely remapped (free-form combos) are dropped and
//! counted rather than persisted wrong.

use arbscan_core::{BetTypeId, RawOdds};

fn swap_p1_p2(mut row: RawOdds) -> RawOdds {
    if let Some(p2) = row.p2 {
        row.p2 = Some(row.p1);
        row.p1 = p2;
    }
    row
}

fn swap_p1_p3(mut row: RawOdds) -> RawOdds {
    if let Some(p3) = row.p3 {
        let old_p1 = row.p1;
        row.p1 = p3;
        row.p3 = Some(old_p1);
    }
    row
}

fn swap_score(selection: &str) -> Option<String> {
    let (home, away) = selection.split_once(':')?;
    Some(format!("{away}:{home}"))
}

fn swap_result_token(token: &str) -> Option<&'static str> {
    Some(match token {
        "1" => "2",
        "2" => "1",
        "X" => "X",
        "1X" => "X2",
        "X2" => "1X",
        "12" => "12",
        _ => return None,
    })
}

fn swap_htft(selection: &str) -> Option<String> {
    let (ht, ft) = selection.split_once('/')?;
    Some(format!("{}/{}", swap_result_token(ht)?, swap_result_token(ft)?))
}

/// Reorients one encoded row for a home/away flip.
///
/// Returns `None` when the row cannot be represented in the flipped
/// orientation and must be dropped.
#[must_use]
pub fn flip_orientation(row: RawOdds) -> Option<RawOdds> {
    match row.bet_type.0 {
        // Symmetric markets: totals, BTTS, odd/even, tiebreaks.
        5 | 6 | 7 | 8 | 10 | 15 | 19 | 53 | 59 | 60 | 61 | 62 | 63 | 77 | 78 => Some(row),

        // Two-way winner-shaped markets: swap sides.
        1 | 12 | 14 | 16 | 17 | 21 | 22 | 57 => Some(swap_p1_p2(row)),

        // Handicaps: swap sides and negate the line.
        9 | 11 | 50 | 56 | 58 => {
            let mut row = swap_p1_p2(row);
            row.margin = -row.margin;
            Some(row)
        }

        // Three-way result markets: outcome-1 and outcome-3 trade places.
        2 | 3 | 4 | 13 | 18 | 20 | 89 | 100 => Some(swap_p1_p3(row)),
        80 => {
            let mut row = swap_p1_p3(row);
            row.margin = -row.margin;
            Some(row)
        }

        // Team-scoped markets keep their prices but swap bet types.
        27 => Some(retyped(row, 28)),
        28 => Some(retyped(row, 27)),
        31 => Some(retyped(row, 32)),
        32 => Some(retyped(row, 31)),
        33 => Some(retyped(row, 34)),
        34 => Some(retyped(row, 33)),
        48 => Some(retyped(row, 49)),
        49 => Some(retyped(row, 48)),
        51 => Some(retyped(row, 52)),
        52 => Some(retyped(row, 51)),
        70 => Some(retyped(row, 72)),
        72 => Some(retyped(row, 70)),
        119 => Some(retyped(row, 120)),
        120 => Some(retyped(row, 119)),

        // Correct scores flip the score.
        23 | 79 => {
            let swapped = swap_score(&row.selection)?;
            Some(RawOdds {
                selection: swapped,
                ..row
            })
        }
        65 => {
            let swapped = swap_score(&row.selection)?;
            Some(RawOdds {
                selection: swapped,
                ..row
            })
        }

        // HT/FT flips each side of the pair.
        24 | 37 => {
            let swapped = swap_htft(&row.selection)?;
            Some(RawOdds {
                selection: swapped,
                ..row
            })
        }

        // Team-agnostic selection ranges survive as-is.
        25 | 26 | 29 | 30 | 54 => Some(row),

        // Everything else (free-form combos) cannot be remapped safely.
        _ => None,
    }
}

fn retyped(mut row: RawOdds, id: i16) -> RawOdds {
    row.bet_type = BetTypeId(id);
    row
}
