//! The closed bet-type vocabulary.
//!
//! Indexed by small integers, append-only. Each entry fixes the arity —
//! how many price fields a row of that type carries — and, for
//! selection-bearing types whose selections form a complete outcome
//! partition, declares that partition so the detector can combine them
//! soundly. A type without a partition declaration is never combined into
//! an arbitrage.

use arbscan_core::BetTypeId;

/// How many outcomes (and therefore price fields) a bet type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Arity {
    /// Selection-bearing: one price per row, non-empty selection key.
    One,
    /// Two outcomes: p1/p2.
    Two,
    /// Three outcomes: p1/p2/p3 (outcome-1 / outcome-2 / draw-or-third).
    Three,
}

impl Arity {
    #[must_use]
    pub const fn price_count(self) -> usize {
        match self {
            Arity::One => 1,
            Arity::Two => 2,
            Arity::Three => 3,
        }
    }
}

/// One vocabulary entry.
#[derive(Debug, Clone, Copy)]
pub struct BetTypeDef {
    pub id: BetTypeId,
    pub name: &'static str,
    pub arity: Arity,
    /// For arity-1 types only: the complete set of selections that
    /// partitions the outcome space, when one exists. The detector may only
    /// combine arity-1 rows of a type that declares this.
    pub partition: Option<&'static [&'static str]>,
}

/// HT/FT: nine selections partition the outcome space.
const HTFT_PARTITION: &[&str] = &[
    "1/1", "1/X", "1/2", "X/1", "X/X", "X/2", "2/1", "2/X", "2/2",
];

/// First set + match winner (best-of-three tennis): four selections.
const SET_MATCH_PARTITION: &[&str] = &["1/1", "1/2", "2/1", "2/2"];

/// Exact sets in best-of-three tennis.
const EXACT_SETS_PARTITION: &[&str] = &["2:0", "2:1", "1:2", "0:2"];

macro_rules! bt {
    ($id:expr, $name:expr, $arity:expr) => {
        BetTypeDef {
            id: BetTypeId($id),
            name: $name,
            arity: $arity,
            partition: None,
        }
    };
    ($id:expr, $name:expr, $arity:expr, $partition:expr) => {
        BetTypeDef {
            id: BetTypeId($id),
            name: $name,
            arity: $arity,
            partition: Some($partition),
        }
    };
}

/// The vocabulary. Ids are stable and append-only.
pub const BET_TYPES: &[BetTypeDef] = &[
    bt!(1, "winner", Arity::Two),
    bt!(2, "1x2", Arity::Three),
    bt!(3, "1x2_h1", Arity::Three),
    bt!(4, "1x2_h2", Arity::Three),
    bt!(5, "total_over_under", Arity::Two),
    bt!(6, "total_h1", Arity::Two),
    bt!(7, "total_h2", Arity::Two),
    bt!(8, "btts", Arity::Two),
    bt!(9, "handicap", Arity::Two),
    bt!(10, "total_points", Arity::Two),
    bt!(11, "spread", Arity::Two),
    bt!(12, "moneyline", Arity::Two),
    bt!(13, "double_chance", Arity::Three),
    bt!(14, "draw_no_bet", Arity::Two),
    bt!(15, "odd_even", Arity::Two),
    bt!(16, "double_win", Arity::Two),
    bt!(17, "win_to_nil", Arity::Two),
    bt!(18, "first_goal", Arity::Three),
    bt!(19, "half_with_more_goals", Arity::Three),
    bt!(20, "double_chance_h1", Arity::Three),
    bt!(21, "draw_no_bet_h1", Arity::Two),
    bt!(22, "to_qualify", Arity::Two),
    bt!(23, "correct_score", Arity::One),
    bt!(24, "ht_ft", Arity::One, HTFT_PARTITION),
    bt!(25, "total_goals_range", Arity::One),
    bt!(26, "exact_goals", Arity::One),
    bt!(27, "team1_goals", Arity::One),
    bt!(28, "team2_goals", Arity::One),
    bt!(29, "h1_total_goals_range", Arity::One),
    bt!(30, "h2_total_goals_range", Arity::One),
    bt!(31, "team1_goals_h1", Arity::One),
    bt!(32, "team2_goals_h1", Arity::One),
    bt!(33, "team1_goals_h2", Arity::One),
    bt!(34, "team2_goals_h2", Arity::One),
    bt!(35, "goals_h1_h2_combo", Arity::One),
    bt!(36, "first_goal_result", Arity::One),
    bt!(37, "ht_ft_double_chance", Arity::One),
    bt!(38, "result_total_goals", Arity::One),
    bt!(39, "result_combo", Arity::One),
    bt!(40, "result_half_goals", Arity::One),
    bt!(41, "dc_total_goals", Arity::One),
    bt!(42, "dc_half_goals", Arity::One),
    bt!(43, "dc_combo", Arity::One),
    bt!(44, "ht_ft_total_goals", Arity::One),
    bt!(45, "ht_ft_combo", Arity::One),
    bt!(46, "btts_combo", Arity::One),
    bt!(48, "team1_total_points", Arity::Two),
    bt!(49, "team2_total_points", Arity::Two),
    bt!(50, "handicap_h1", Arity::Two),
    bt!(51, "team1_total_h1", Arity::Two),
    bt!(52, "team2_total_h1", Arity::Two),
    bt!(53, "best_quarter_total", Arity::Two),
    bt!(54, "quarter_most_points", Arity::One),
    bt!(55, "h1_result_total", Arity::One),
    bt!(56, "handicap_sets", Arity::Two),
    bt!(57, "first_set_winner", Arity::Two),
    bt!(58, "handicap_games_s1", Arity::Two),
    bt!(59, "odd_even_s1", Arity::Two),
    bt!(60, "tiebreak_s1", Arity::Two),
    bt!(61, "odd_even_s2", Arity::Two),
    bt!(62, "tiebreak_s2", Arity::Two),
    bt!(63, "set_with_more_games", Arity::Three),
    bt!(64, "first_set_match_combo", Arity::One, SET_MATCH_PARTITION),
    bt!(65, "exact_sets", Arity::One, EXACT_SETS_PARTITION),
    bt!(66, "games_range_s1", Arity::One),
    bt!(67, "games_range_s2", Arity::One),
    bt!(68, "winner_total_games", Arity::One),
    bt!(69, "p1_win_games_s1", Arity::One),
    bt!(70, "p1_win_odd_even_s1", Arity::Two),
    bt!(71, "p2_win_games_s1", Arity::One),
    bt!(72, "p2_win_odd_even_s1", Arity::Two),
    bt!(73, "winner_set_more_games", Arity::One),
    bt!(74, "p1_result_total_goals", Arity::One),
    bt!(77, "odd_even_h1", Arity::Two),
    bt!(78, "odd_even_h2", Arity::Two),
    bt!(79, "correct_score_h1", Arity::One),
    bt!(80, "european_handicap", Arity::Three),
    bt!(89, "last_goal", Arity::Three),
    bt!(100, "first_goal_h1", Arity::Three),
    bt!(114, "result_or_total", Arity::One),
    bt!(118, "multi_correct_score", Arity::One),
    bt!(119, "team1_goals_combo", Arity::One),
    bt!(120, "team2_goals_combo", Arity::One),
    bt!(124, "ht_ft_or_total", Arity::One),
];

/// Looks a bet type up by id.
#[must_use]
pub fn bet_type(id: BetTypeId) -> Option<&'static BetTypeDef> {
    BET_TYPES.iter().find(|b| b.id == id)
}

/// Looks a bet type up by name.
#[must_use]
pub fn bet_type_by_name(name: &str) -> Option<&'static BetTypeDef> {
    BET_TYPES.iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_and_ascending() {
        let ids: Vec<i16> = BET_TYPES.iter().map(|b| b.id.0).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, ids, "table must stay in id order");
    }

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = BET_TYPES.iter().map(|b| b.name).collect();
        assert_eq!(names.len(), BET_TYPES.len());
    }

    #[test]
    fn test_partitions_only_on_arity_one() {
        for def in BET_TYPES {
            if def.partition.is_some() {
                assert_eq!(def.arity, Arity::One, "{} declares a partition", def.name);
            }
        }
    }

    #[test]
    fn test_partition_selections_are_valid_grammar() {
        for def in BET_TYPES {
            if let Some(partition) = def.partition {
                assert!(partition.len() >= 2);
                for sel in partition {
                    assert!(
                        crate::selection::is_valid_selection(sel),
                        "{} partition member {sel} fails the grammar",
                        def.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_htft_partition_is_nine() {
        let htft = bet_type(BetTypeId(24)).unwrap();
        assert_eq!(htft.partition.unwrap().len(), 9);
    }

    #[test]
    fn test_correct_score_has_no_partition() {
        // Correct score opens to an "any other" option only when declared;
        // we deliberately declare none, so it is never combined.
        let cs = bet_type(BetTypeId(23)).unwrap();
        assert!(cs.partition.is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(bet_type_by_name("1x2").unwrap().id, BetTypeId(2));
        assert_eq!(bet_type_by_name("exact_goals").unwrap().arity, Arity::One);
        assert!(bet_type_by_name("nonsense").is_none());
    }
}
