//! Price-row validation against the vocabulary contract.

use crate::bet_types::{bet_type, Arity};
use crate::selection::is_valid_selection;
use arbscan_core::{BetTypeId, RawOdds};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a price row was rejected. Rejected rows are dropped and counted,
/// never forwarded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown bet type {0}")]
    UnknownBetType(BetTypeId),

    #[error("bet type {bet_type} carries {expected} prices, row has {actual}")]
    ArityMismatch {
        bet_type: BetTypeId,
        expected: usize,
        actual: usize,
    },

    #[error("bet type {0} requires a selection")]
    MissingSelection(BetTypeId),

    #[error("bet type {0} does not take a selection")]
    UnexpectedSelection(BetTypeId),

    #[error("selection {0:?} violates the grammar")]
    BadSelection(String),

    #[error("price {0} is not a decimal odd")]
    BadPrice(Decimal),
}

/// Validates one encoded row: arity ↔ price count, selection rules, and
/// decimal-odds sanity. For any bet type of arity k, exactly the first k
/// price fields are set.
///
/// # Errors
/// Returns the first violated rule.
pub fn validate_row(row: &RawOdds) -> Result<(), ValidationError> {
    let def =
        bet_type(row.bet_type).ok_or(ValidationError::UnknownBetType(row.bet_type))?;

    let expected = def.arity.price_count();
    let actual = row.price_count();
    if actual != expected {
        return Err(ValidationError::ArityMismatch {
            bet_type: row.bet_type,
            expected,
            actual,
        });
    }

    match def.arity {
        Arity::One => {
            if row.selection.is_empty() {
                return Err(ValidationError::MissingSelection(row.bet_type));
            }
            if !is_valid_selection(&row.selection) {
                return Err(ValidationError::BadSelection(row.selection.clone()));
            }
        }
        Arity::Two | Arity::Three => {
            if !row.selection.is_empty() {
                return Err(ValidationError::UnexpectedSelection(row.bet_type));
            }
        }
    }

    for price in [Some(row.p1), row.p2, row.p3].into_iter().flatten() {
        if price <= Decimal::ONE {
            return Err(ValidationError::BadPrice(price));
        }
    }

    Ok(())
}
