//! Core domain types shared across the pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Stable small-integer id of an upstream sportsbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub i16);

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id into the closed bet-type vocabulary.
///
/// The vocabulary itself (names, arities, outcome partitions) is defined by
/// the codec crate; this id is shared so records can carry it without
/// pulling the whole table in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetTypeId(pub i16);

impl std::fmt::Display for BetTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Sports
// =============================================================================

/// The sports the pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Football,
    Basketball,
    Tennis,
    Hockey,
    TableTennis,
}

impl Sport {
    /// All sports, in id order.
    pub const ALL: [Sport; 5] = [
        Sport::Football,
        Sport::Basketball,
        Sport::Tennis,
        Sport::Hockey,
        Sport::TableTennis,
    ];

    /// Stable small-integer id used in the store.
    #[must_use]
    pub const fn id(self) -> i16 {
        match self {
            Sport::Football => 1,
            Sport::Basketball => 2,
            Sport::Tennis => 3,
            Sport::Hockey => 4,
            Sport::TableTennis => 5,
        }
    }

    /// Looks a sport up by its stable id.
    #[must_use]
    pub fn from_id(id: i16) -> Option<Sport> {
        Sport::ALL.into_iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::Tennis => "tennis",
            Sport::Hockey => "hockey",
            Sport::TableTennis => "table_tennis",
        }
    }

    /// Start-time window (minutes) inside which two listings of the same
    /// sport may be the same real-world event. Short-format sports get
    /// tight windows.
    #[must_use]
    pub const fn time_window_minutes(self) -> i64 {
        match self {
            Sport::Football => 30,
            Sport::Basketball => 20,
            Sport::Tennis => 10,
            Sport::Hockey => 20,
            Sport::TableTennis => 5,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Canonical market key
// =============================================================================

/// The provider-independent name of a real-world wager.
///
/// Two providers offering the identical wager must produce byte-identical
/// keys. Signed margins (handicap lines) follow the convention
/// positive = home advantage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub bet_type: BetTypeId,
    /// Outcome identifier for selection-bearing bet types; empty otherwise.
    pub selection: String,
    /// Numeric parameter of the wager (line, total threshold); zero when
    /// the bet type has none.
    pub margin: Decimal,
}

impl MarketKey {
    #[must_use]
    pub fn new(bet_type: BetTypeId, margin: Decimal) -> Self {
        Self {
            bet_type,
            selection: String::new(),
            margin,
        }
    }

    #[must_use]
    pub fn with_selection(bet_type: BetTypeId, selection: impl Into<String>) -> Self {
        Self {
            bet_type,
            selection: selection.into(),
            margin: Decimal::ZERO,
        }
    }
}

// =============================================================================
// Raw scrape records
// =============================================================================

/// One priced market scraped from a provider, already encoded through the
/// canonical market codec.
///
/// `p1`/`p2`/`p3` are outcome-1 / outcome-2 / draw-or-third. An arity-k bet
/// type fills exactly the first k fields; the rest stay `None` and are
/// never consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOdds {
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    #[serde(default)]
    pub selection: String,
    pub p1: Decimal,
    pub p2: Option<Decimal>,
    pub p3: Option<Decimal>,
}

impl RawOdds {
    /// Two-way row (over/under, BTTS, handicap, ...).
    #[must_use]
    pub fn two_way(bet_type: BetTypeId, p1: Decimal, p2: Decimal, margin: Decimal) -> Self {
        Self {
            bet_type,
            margin,
            selection: String::new(),
            p1,
            p2: Some(p2),
            p3: None,
        }
    }

    /// Three-way row (1X2, double chance, European handicap, ...).
    #[must_use]
    pub fn three_way(
        bet_type: BetTypeId,
        p1: Decimal,
        p2: Decimal,
        p3: Decimal,
        margin: Decimal,
    ) -> Self {
        Self {
            bet_type,
            margin,
            selection: String::new(),
            p1,
            p2: Some(p2),
            p3: Some(p3),
        }
    }

    /// Selection-bearing row; only `p1` is meaningful.
    #[must_use]
    pub fn selection(bet_type: BetTypeId, selection: impl Into<String>, p1: Decimal) -> Self {
        Self {
            bet_type,
            margin: Decimal::ZERO,
            selection: selection.into(),
            p1,
            p2: None,
            p3: None,
        }
    }

    /// The canonical key of this row.
    #[must_use]
    pub fn key(&self) -> MarketKey {
        MarketKey {
            bet_type: self.bet_type,
            selection: self.selection.clone(),
            margin: self.margin,
        }
    }

    /// Number of populated price fields.
    #[must_use]
    pub fn price_count(&self) -> usize {
        1 + usize::from(self.p2.is_some()) + usize::from(self.p3.is_some())
    }
}

/// One event scraped from a provider, carrying its priced markets.
///
/// Created per scrape cycle, consumed by the identity resolver, never
/// persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    pub provider: ProviderId,
    pub team1: String,
    pub team2: String,
    pub sport: Sport,
    pub start_time: DateTime<Utc>,
    pub league: Option<String>,
    /// Provider-local event id, merged into the match id map on resolve.
    pub external_id: Option<String>,
    pub odds: Vec<RawOdds>,
}

impl RawMatch {
    #[must_use]
    pub fn new(
        provider: ProviderId,
        team1: impl Into<String>,
        team2: impl Into<String>,
        sport: Sport,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            provider,
            team1: team1.into(),
            team2: team2.into(),
            sport,
            start_time,
            league: None,
            external_id: None,
            odds: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn push_odds(&mut self, odds: RawOdds) {
        self.odds.push(odds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ==================== Sport Tests ====================

    #[test]
    fn test_sport_ids_round_trip() {
        for sport in Sport::ALL {
            assert_eq!(Sport::from_id(sport.id()), Some(sport));
        }
    }

    #[test]
    fn test_sport_unknown_id() {
        assert!(Sport::from_id(0).is_none());
        assert!(Sport::from_id(99).is_none());
    }

    #[test]
    fn test_sport_time_windows_tighten_with_format() {
        assert!(Sport::TableTennis.time_window_minutes() < Sport::Tennis.time_window_minutes());
        assert!(Sport::Tennis.time_window_minutes() < Sport::Football.time_window_minutes());
    }

    // ==================== RawOdds Tests ====================

    #[test]
    fn test_raw_odds_arity_shapes() {
        let two = RawOdds::two_way(BetTypeId(5), dec!(1.85), dec!(1.95), dec!(2.5));
        assert_eq!(two.price_count(), 2);
        assert!(two.selection.is_empty());

        let three = RawOdds::three_way(BetTypeId(2), dec!(2.1), dec!(3.5), dec!(4.2), dec!(0));
        assert_eq!(three.price_count(), 3);

        let sel = RawOdds::selection(BetTypeId(24), "1/1", dec!(4.8));
        assert_eq!(sel.price_count(), 1);
        assert_eq!(sel.key().selection, "1/1");
        assert_eq!(sel.margin, Decimal::ZERO);
    }

    #[test]
    fn test_market_key_equality_is_exact() {
        let a = MarketKey::new(BetTypeId(9), dec!(1.0));
        let b = MarketKey::new(BetTypeId(9), dec!(1.0));
        let c = MarketKey::new(BetTypeId(9), dec!(-1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    // ==================== RawMatch Tests ====================

    #[test]
    fn test_raw_match_builder() {
        let m = RawMatch::new(ProviderId(3), "Arsenal", "Chelsea", Sport::Football, Utc::now())
            .with_league("Premier League")
            .with_external_id("12345");

        assert_eq!(m.league.as_deref(), Some("Premier League"));
        assert_eq!(m.external_id.as_deref(), Some("12345"));
        assert!(m.odds.is_empty());
    }
}
