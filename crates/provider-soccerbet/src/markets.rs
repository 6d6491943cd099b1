//! Soccerbet market code tables, per sport.
//!
//! Same code space as the rest of the platform family, resolved against
//! the nested `betMap` payload.

use arbscan_core::{BetTypeId, Sport};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct ThreeWay {
    pub bet_type: BetTypeId,
    pub codes: [&'static str; 3],
}

pub struct TwoWay {
    pub bet_type: BetTypeId,
    pub codes: [&'static str; 2],
}

pub struct FixedTotal {
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    pub under: &'static str,
    pub over: &'static str,
}

/// Pair whose nested param keys carry the line.
pub struct ParamPair {
    pub bet_type: BetTypeId,
    pub home: &'static str,
    pub away: &'static str,
    /// Family handicaps report the line with the opposite sign.
    pub negated_line: bool,
}

pub struct SelectionMarket {
    pub bet_type: BetTypeId,
    pub codes: &'static [(&'static str, &'static str)],
}

pub struct SportTables {
    pub three_way: &'static [ThreeWay],
    pub two_way: &'static [TwoWay],
    pub fixed_totals: &'static [FixedTotal],
    pub param_pairs: &'static [ParamPair],
    pub selections: &'static [SelectionMarket],
}

macro_rules! bt {
    ($id:expr) => {
        BetTypeId($id)
    };
}

const FOOTBALL: SportTables = SportTables {
    three_way: &[
        ThreeWay { bet_type: bt!(2), codes: ["1", "2", "3"] },
        ThreeWay { bet_type: bt!(3), codes: ["4", "5", "6"] },
        ThreeWay { bet_type: bt!(4), codes: ["235", "236", "237"] },
        ThreeWay { bet_type: bt!(13), codes: ["7", "8", "9"] },
    ],
    two_way: &[
        TwoWay { bet_type: bt!(8), codes: ["272", "273"] },
        TwoWay { bet_type: bt!(15), codes: ["231", "232"] },
        TwoWay { bet_type: bt!(14), codes: ["264", "265"] },
    ],
    fixed_totals: &[
        FixedTotal { bet_type: bt!(5), margin: dec!(1.5), under: "21", over: "242" },
        FixedTotal { bet_type: bt!(5), margin: dec!(2.5), under: "22", over: "24" },
        FixedTotal { bet_type: bt!(5), margin: dec!(3.5), under: "219", over: "25" },
        FixedTotal { bet_type: bt!(5), margin: dec!(4.5), under: "453", over: "27" },
        FixedTotal { bet_type: bt!(6), margin: dec!(0.5), under: "267", over: "207" },
        FixedTotal { bet_type: bt!(6), margin: dec!(1.5), under: "211", over: "208" },
        FixedTotal { bet_type: bt!(6), margin: dec!(2.5), under: "472", over: "209" },
        FixedTotal { bet_type: bt!(7), margin: dec!(0.5), under: "269", over: "213" },
        FixedTotal { bet_type: bt!(7), margin: dec!(1.5), under: "217", over: "214" },
        FixedTotal { bet_type: bt!(7), margin: dec!(2.5), under: "474", over: "215" },
    ],
    param_pairs: &[
        ParamPair { bet_type: bt!(9), home: "201", away: "203", negated_line: true },
    ],
    selections: &[SelectionMarket {
        bet_type: bt!(24),
        codes: &[
            ("10", "1/1"), ("11", "1/X"), ("12", "1/2"),
            ("13", "X/1"), ("14", "X/X"), ("15", "X/2"),
            ("16", "2/1"), ("17", "2/X"), ("18", "2/2"),
        ],
    }],
};

const BASKETBALL: SportTables = SportTables {
    three_way: &[],
    two_way: &[TwoWay { bet_type: bt!(1), codes: ["1", "3"] }],
    fixed_totals: &[],
    param_pairs: &[
        ParamPair { bet_type: bt!(9), home: "50458", away: "50459", negated_line: true },
    ],
    selections: &[],
};

const TENNIS: SportTables = SportTables {
    three_way: &[],
    two_way: &[TwoWay { bet_type: bt!(1), codes: ["1", "3"] }],
    fixed_totals: &[],
    param_pairs: &[],
    selections: &[],
};

const HOCKEY: SportTables = SportTables {
    three_way: &[ThreeWay { bet_type: bt!(2), codes: ["1", "2", "3"] }],
    two_way: &[],
    fixed_totals: &[],
    param_pairs: &[],
    selections: &[],
};

const TABLE_TENNIS: SportTables = SportTables {
    three_way: &[],
    two_way: &[TwoWay { bet_type: bt!(1), codes: ["1", "3"] }],
    fixed_totals: &[],
    param_pairs: &[],
    selections: &[],
};

#[must_use]
pub fn for_sport(sport: Sport) -> &'static SportTables {
    match sport {
        Sport::Football => &FOOTBALL,
        Sport::Basketball => &BASKETBALL,
        Sport::Tennis => &TENNIS,
        Sport::Hockey => &HOCKEY,
        Sport::TableTennis => &TABLE_TENNIS,
    }
}
