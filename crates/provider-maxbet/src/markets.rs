//! MaxBet market code tables.
//!
//! The upstream returns a flat `odds` dict (tip-type code → price) and a
//! `params` dict (param key → line) per match. These tables project those
//! codes into the canonical vocabulary. Derived from the platform's
//! configuration endpoint; append new codes here, never special-case them
//! in the parser.

use arbscan_core::BetTypeId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Simple 3-way market: canonical bet type and the three outcome codes.
pub struct ThreeWay {
    pub bet_type: BetTypeId,
    pub codes: [&'static str; 3],
}

/// Simple 2-way market.
pub struct TwoWay {
    pub bet_type: BetTypeId,
    pub codes: [&'static str; 2],
}

/// Over/under pair whose line is baked into the codes.
pub struct FixedTotal {
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    pub under: &'static str,
    pub over: &'static str,
}

/// Over/under pair whose line arrives in the match params.
pub struct ParamTotal {
    pub bet_type: BetTypeId,
    pub param: &'static str,
    pub under: &'static str,
    pub over: &'static str,
}

/// Handicap pair (or triple) whose line arrives in the match params.
/// The platform family reports lines in the negated sign convention.
pub struct ParamHandicap2 {
    pub bet_type: BetTypeId,
    pub param: &'static str,
    pub home: &'static str,
    pub away: &'static str,
}

pub struct ParamHandicap3 {
    pub bet_type: BetTypeId,
    pub param: &'static str,
    pub home: &'static str,
    pub draw: &'static str,
    pub away: &'static str,
}

/// Selection-bearing market: each code is one selection.
pub struct SelectionMarket {
    pub bet_type: BetTypeId,
    pub codes: &'static [(&'static str, &'static str)],
}

macro_rules! bt {
    ($id:expr) => {
        BetTypeId($id)
    };
}

// =============================================================================
// Football
// =============================================================================

pub const FOOTBALL_3WAY: &[ThreeWay] = &[
    ThreeWay { bet_type: bt!(2), codes: ["1", "2", "3"] },
    ThreeWay { bet_type: bt!(3), codes: ["4", "5", "6"] },
    ThreeWay { bet_type: bt!(4), codes: ["235", "236", "237"] },
    ThreeWay { bet_type: bt!(13), codes: ["7", "8", "9"] },
    ThreeWay { bet_type: bt!(20), codes: ["397", "398", "399"] },
    ThreeWay { bet_type: bt!(18), codes: ["204", "205", "206"] },
    ThreeWay { bet_type: bt!(19), codes: ["29", "30", "31"] },
];

pub const FOOTBALL_2WAY: &[TwoWay] = &[
    TwoWay { bet_type: bt!(8), codes: ["272", "273"] },
    TwoWay { bet_type: bt!(15), codes: ["231", "232"] },
    TwoWay { bet_type: bt!(14), codes: ["264", "265"] },
    TwoWay { bet_type: bt!(16), codes: ["295", "296"] },
    TwoWay { bet_type: bt!(17), codes: ["282", "283"] },
    TwoWay { bet_type: bt!(21), codes: ["611", "612"] },
];

pub const FOOTBALL_FIXED_TOTALS: &[FixedTotal] = &[
    FixedTotal { bet_type: bt!(5), margin: dec!(1.5), under: "21", over: "242" },
    FixedTotal { bet_type: bt!(5), margin: dec!(2.5), under: "22", over: "24" },
    FixedTotal { bet_type: bt!(5), margin: dec!(3.5), under: "219", over: "25" },
    FixedTotal { bet_type: bt!(5), margin: dec!(4.5), under: "453", over: "27" },
    FixedTotal { bet_type: bt!(5), margin: dec!(5.5), under: "266", over: "223" },
    FixedTotal { bet_type: bt!(6), margin: dec!(0.5), under: "267", over: "207" },
    FixedTotal { bet_type: bt!(6), margin: dec!(1.5), under: "211", over: "208" },
    FixedTotal { bet_type: bt!(6), margin: dec!(2.5), under: "472", over: "209" },
    FixedTotal { bet_type: bt!(7), margin: dec!(0.5), under: "269", over: "213" },
    FixedTotal { bet_type: bt!(7), margin: dec!(1.5), under: "217", over: "214" },
    FixedTotal { bet_type: bt!(7), margin: dec!(2.5), under: "474", over: "215" },
];

pub const FOOTBALL_PARAM_TOTALS: &[ParamTotal] = &[
    ParamTotal { bet_type: bt!(48), param: "homeOverUnder", under: "355", over: "356" },
    ParamTotal { bet_type: bt!(49), param: "awayOverUnder", under: "357", over: "358" },
    ParamTotal { bet_type: bt!(51), param: "homeOverUnderFirstHalf", under: "371", over: "372" },
    ParamTotal { bet_type: bt!(52), param: "awayOverUnderFirstHalf", under: "373", over: "374" },
];

pub const FOOTBALL_PARAM_HANDICAPS_3WAY: &[ParamHandicap3] = &[
    ParamHandicap3 { bet_type: bt!(80), param: "hd2", home: "201", draw: "202", away: "203" },
    ParamHandicap3 { bet_type: bt!(80), param: "handicap2", home: "421", draw: "422", away: "423" },
    ParamHandicap3 { bet_type: bt!(80), param: "handicap3", home: "424", draw: "425", away: "426" },
];

pub const FOOTBALL_PARAM_HANDICAPS_2WAY: &[ParamHandicap2] = &[
    ParamHandicap2 { bet_type: bt!(50), param: "hdp", home: "224", away: "226" },
];

pub const FOOTBALL_SELECTIONS: &[SelectionMarket] = &[
    SelectionMarket {
        bet_type: bt!(23),
        codes: &[
            ("51", "0:0"), ("52", "1:0"), ("54", "2:0"), ("56", "3:0"), ("58", "4:0"),
            ("53", "0:1"), ("67", "1:1"), ("68", "2:1"), ("70", "3:1"), ("72", "4:1"),
            ("55", "0:2"), ("69", "1:2"), ("82", "2:2"), ("83", "3:2"), ("85", "4:2"),
            ("57", "0:3"), ("71", "1:3"), ("84", "2:3"), ("95", "3:3"), ("96", "4:3"),
            ("59", "0:4"), ("73", "1:4"), ("86", "2:4"), ("97", "3:4"), ("106", "4:4"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(24),
        codes: &[
            ("10", "1/1"), ("11", "1/X"), ("12", "1/2"),
            ("13", "X/1"), ("14", "X/X"), ("15", "X/2"),
            ("16", "2/1"), ("17", "2/X"), ("18", "2/2"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(37),
        codes: &[
            ("831", "1X/1X"), ("832", "1X/12"), ("833", "1X/X2"),
            ("834", "12/1X"), ("835", "12/12"), ("836", "12/X2"),
            ("837", "X2/1X"), ("838", "X2/12"), ("839", "X2/X2"),
            ("840", "1/1X"), ("841", "1/12"), ("842", "1/X2"),
            ("843", "X/1X"), ("844", "X/12"), ("845", "X/X2"),
            ("846", "2/1X"), ("847", "2/12"), ("848", "2/X2"),
            ("849", "1X/1"), ("850", "1X/X"), ("851", "1X/2"),
            ("852", "12/1"), ("853", "12/X"), ("854", "12/2"),
            ("855", "X2/1"), ("856", "X2/X"), ("857", "X2/2"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(26),
        codes: &[("320", "1"), ("221", "2"), ("222", "3"), ("321", "4")],
    },
    SelectionMarket {
        bet_type: bt!(25),
        codes: &[
            ("278", "1-2"), ("279", "1-3"), ("280", "1-4"), ("380", "1-5"), ("381", "1-6"),
            ("23", "2-3"), ("243", "2-4"), ("333", "2-5"), ("220", "2-6"),
            ("244", "3-4"), ("281", "3-5"), ("382", "3-6"),
            ("379", "4-5"), ("26", "4-6"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(27),
        codes: &[
            ("247", "0-1"), ("551", "0-2"), ("553", "0-3"),
            ("478", "1-2"), ("479", "1-3"), ("480", "2-3"),
            ("248", "2+"), ("276", "3+"), ("555", "4+"),
            ("323", "T1"), ("324", "T2"), ("484", "T3"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(28),
        codes: &[
            ("249", "0-1"), ("552", "0-2"), ("554", "0-3"),
            ("481", "1-2"), ("482", "1-3"), ("483", "2-3"),
            ("250", "2+"), ("277", "3+"), ("556", "4+"),
            ("325", "T1"), ("326", "T2"), ("485", "T3"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(29),
        codes: &[
            ("268", "T1"), ("777", "T2"), ("779", "T3"),
            ("476", "1-2"), ("477", "1-3"), ("212", "2-3"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(30),
        codes: &[
            ("270", "T1"), ("782", "T2"), ("784", "T3"),
            ("606", "1-2"), ("607", "1-3"), ("218", "2-3"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(31),
        codes: &[
            ("337", "T0"), ("341", "T1"),
            ("307", "1+"), ("274", "2+"), ("349", "3+"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(32),
        codes: &[
            ("338", "T0"), ("342", "T1"),
            ("308", "1+"), ("275", "2+"), ("350", "3+"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(33),
        codes: &[
            ("339", "T0"), ("343", "T1"),
            ("312", "1+"), ("297", "2+"), ("351", "3+"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(34),
        codes: &[
            ("340", "T0"), ("344", "T1"),
            ("313", "1+"), ("298", "2+"), ("352", "3+"),
        ],
    },
];

// =============================================================================
// Basketball
// =============================================================================

pub const BASKETBALL_2WAY: &[TwoWay] = &[
    TwoWay { bet_type: bt!(1), codes: ["50291", "50293"] },
];

pub const BASKETBALL_PARAM_HANDICAPS: &[ParamHandicap2] = &[
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime", home: "50458", away: "50459" },
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime2", home: "50432", away: "50433" },
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime3", home: "50434", away: "50435" },
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime4", home: "50436", away: "50437" },
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime5", home: "50438", away: "50439" },
    ParamHandicap2 { bet_type: bt!(9), param: "handicapOvertime6", home: "50440", away: "50441" },
    ParamHandicap2 { bet_type: bt!(50), param: "handicapFirstHalf", home: "50460", away: "50461" },
];

pub const BASKETBALL_PARAM_TOTALS: &[ParamTotal] = &[
    ParamTotal { bet_type: bt!(10), param: "overUnderOvertime", under: "50444", over: "50445" },
    ParamTotal { bet_type: bt!(10), param: "overUnderOvertime3", under: "50448", over: "50449" },
    ParamTotal { bet_type: bt!(10), param: "overUnderOvertime4", under: "50450", over: "50451" },
    ParamTotal { bet_type: bt!(10), param: "overUnderOvertime5", under: "50452", over: "50453" },
    ParamTotal { bet_type: bt!(6), param: "overUnderFirstHalf", under: "50446", over: "50447" },
    ParamTotal { bet_type: bt!(48), param: "homeOverUnderOvertime", under: "50462", over: "50463" },
    ParamTotal { bet_type: bt!(49), param: "awayOverUnderOvertime", under: "50464", over: "50465" },
    ParamTotal { bet_type: bt!(51), param: "homeOverUnderFirstHalf", under: "50466", over: "50467" },
    ParamTotal { bet_type: bt!(52), param: "awayOverUnderFirstHalf", under: "50468", over: "50469" },
];

// =============================================================================
// Tennis
// =============================================================================

pub const TENNIS_2WAY: &[TwoWay] = &[
    TwoWay { bet_type: bt!(1), codes: ["1", "3"] },
    TwoWay { bet_type: bt!(57), codes: ["50510", "50511"] },
    TwoWay { bet_type: bt!(60), codes: ["51196", "51197"] },
    TwoWay { bet_type: bt!(59), codes: ["50520", "50521"] },
];

pub const TENNIS_3WAY: &[ThreeWay] = &[
    ThreeWay { bet_type: bt!(63), codes: ["51061", "51062", "51063"] },
];

pub const TENNIS_PARAM_TOTALS: &[ParamTotal] = &[
    ParamTotal { bet_type: bt!(5), param: "overUnderGames", under: "254", over: "256" },
];

pub const TENNIS_PARAM_HANDICAPS: &[ParamHandicap2] = &[
    ParamHandicap2 { bet_type: bt!(56), param: "hd2", home: "251", away: "253" },
    ParamHandicap2 { bet_type: bt!(58), param: "handicapGames", home: "50538", away: "50539" },
];

pub const TENNIS_SELECTIONS: &[SelectionMarket] = &[
    SelectionMarket {
        bet_type: bt!(65),
        codes: &[
            ("50544", "2:0"), ("50545", "0:2"),
            ("50548", "2:1"), ("50549", "1:2"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(64),
        codes: &[
            ("50540", "1/1"), ("50541", "1/2"),
            ("50542", "2/1"), ("50543", "2/2"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(66),
        codes: &[
            ("51198", "T6"), ("51199", "7-8"), ("51200", "9-12"), ("51201", "T13"),
        ],
    },
    SelectionMarket {
        bet_type: bt!(67),
        codes: &[
            ("51202", "T6"), ("51203", "7-8"), ("51204", "9-12"), ("51205", "T13"),
        ],
    },
];

// =============================================================================
// Hockey
// =============================================================================

pub const HOCKEY_3WAY: &[ThreeWay] = &[
    ThreeWay { bet_type: bt!(2), codes: ["1", "2", "3"] },
    ThreeWay { bet_type: bt!(13), codes: ["7", "8", "9"] },
    ThreeWay { bet_type: bt!(3), codes: ["50495", "50496", "50497"] },
    ThreeWay { bet_type: bt!(4), codes: ["50498", "50499", "50500"] },
];

pub const HOCKEY_2WAY: &[TwoWay] = &[
    TwoWay { bet_type: bt!(14), codes: ["264", "265"] },
    TwoWay { bet_type: bt!(8), codes: ["272", "273"] },
    TwoWay { bet_type: bt!(15), codes: ["231", "232"] },
];

pub const HOCKEY_PARAM_TOTALS: &[ParamTotal] = &[
    ParamTotal { bet_type: bt!(5), param: "overUnder", under: "228", over: "227" },
    ParamTotal { bet_type: bt!(5), param: "overUnder2", under: "427", over: "429" },
    ParamTotal { bet_type: bt!(5), param: "overUnder3", under: "430", over: "432" },
    ParamTotal { bet_type: bt!(6), param: "overUnderFirstPeriod", under: "50504", over: "50505" },
    ParamTotal { bet_type: bt!(48), param: "homeOverUnder", under: "355", over: "356" },
    ParamTotal { bet_type: bt!(49), param: "awayOverUnder", under: "357", over: "358" },
];

pub const HOCKEY_PARAM_HANDICAPS: &[ParamHandicap2] = &[
    ParamHandicap2 { bet_type: bt!(9), param: "hd2", home: "201", away: "203" },
];

pub const HOCKEY_SELECTIONS: &[SelectionMarket] = &[
    SelectionMarket {
        bet_type: bt!(74),
        codes: &[
            ("50818", "1&U"), ("50819", "X&U"), ("50820", "2&U"),
            ("50821", "1&O"), ("50822", "X&O"), ("50823", "2&O"),
        ],
    },
];

// =============================================================================
// Table tennis
// =============================================================================

pub const TABLE_TENNIS_2WAY: &[TwoWay] = &[
    TwoWay { bet_type: bt!(1), codes: ["1", "3"] },
];
