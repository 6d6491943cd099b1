//! Canonical market codec.
//!
//! The codec defines the closed vocabulary every provider market is
//! projected into: a fixed table of bet types with arities, a strictly
//! typed ASCII selection grammar, and the normalization rules that make two
//! providers' renderings of the same real-world wager byte-identical.
//!
//! It also carries the team/event normalizer used by the identity resolver
//! and the persister, since both sides of the fuzzy join must agree on the
//! normal form.

pub mod bet_types;
pub mod label;
pub mod normalize;
pub mod orientation;
pub mod selection;
pub mod validate;

pub use bet_types::{bet_type, bet_type_by_name, Arity, BetTypeDef, BET_TYPES};
pub use label::describe;
pub use normalize::{normalize_league, normalize_team, normalize_tennis_player};
pub use orientation::flip_orientation;
pub use selection::{
    fold_half_token, fold_htft_separator, fold_or_token, is_valid_selection, reroute_goal_range,
};
pub use validate::{validate_row, ValidationError};

use rust_decimal::Decimal;

/// Folds a handicap line reported in the negated sign convention into the
/// canonical one (positive = home advantage).
///
/// The flat-platform backend family reports the home line with the opposite
/// sign: their `-1.5` is a line the home side must overcome, which is
/// canonical `+1.5`.
#[must_use]
pub fn fold_negated_handicap(line: Decimal) -> Decimal {
    -line
}
