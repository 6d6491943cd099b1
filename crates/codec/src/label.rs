//! Human-readable rendering of canonical keys, used by the event publisher.

use crate::bet_types::bet_type;
use arbscan_core::BetTypeId;
use rust_decimal::Decimal;

fn base_label(id: BetTypeId) -> String {
    let human = match id.0 {
        1 => "Winner",
        2 => "Full-time result (1X2)",
        3 => "First-half result (1X2)",
        4 => "Second-half result (1X2)",
        5 => "Total goals over/under",
        6 => "First-half total over/under",
        7 => "Second-half total over/under",
        8 => "Both teams to score",
        9 => "Asian handicap",
        10 => "Total points over/under",
        13 => "Double chance",
        14 => "Draw no bet",
        15 => "Odd/even total",
        18 => "First goal",
        23 => "Correct score",
        24 => "Halftime/fulltime",
        25 => "Total goals range",
        26 => "Exact goals",
        56 => "Set handicap",
        57 => "First-set winner",
        80 => "European handicap",
        _ => "",
    };

    if !human.is_empty() {
        return human.to_string();
    }

    // Fall back to the vocabulary name with the underscores opened up.
    bet_type(id)
        .map(|def| def.name.replace('_', " "))
        .unwrap_or_else(|| format!("bet type {id}"))
}

/// Renders a canonical key as a human label.
///
/// `describe(BetTypeId(5), "", 2.5)` → `"Total goals over/under 2.5"`,
/// `describe(BetTypeId(24), "1/1", 0)` → `"Halftime/fulltime 1/1"`.
#[must_use]
pub fn describe(bet_type_id: BetTypeId, selection: &str, margin: Decimal) -> String {
    let mut label = base_label(bet_type_id);

    if !margin.is_zero() {
        label.push(' ');
        label.push_str(&margin.normalize().to_string());
    }
    if !selection.is_empty() {
        label.push(' ');
        label.push_str(selection);
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_market() {
        assert_eq!(describe(BetTypeId(2), "", dec!(0)), "Full-time result (1X2)");
    }

    #[test]
    fn test_margin_market() {
        assert_eq!(
            describe(BetTypeId(5), "", dec!(2.5)),
            "Total goals over/under 2.5"
        );
        assert_eq!(describe(BetTypeId(9), "", dec!(-1.0)), "Asian handicap -1");
    }

    #[test]
    fn test_selection_market() {
        assert_eq!(describe(BetTypeId(24), "1/1", dec!(0)), "Halftime/fulltime 1/1");
        assert_eq!(describe(BetTypeId(26), "T3", dec!(0)), "Exact goals T3");
    }

    #[test]
    fn test_fallback_uses_vocabulary_name() {
        assert_eq!(describe(BetTypeId(46), "GG&3+", dec!(0)), "btts combo GG&3+");
    }
}
