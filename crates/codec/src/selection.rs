//! The selection grammar.
//!
//! A strictly typed ASCII encoding for the outcome identifiers of
//! selection-bearing bet types, designed so two providers can never
//! disagree on form:
//!
//! - `H1:` / `H2:` half prefixes, `FT:` full-time prefix inside combos
//! - `H` (home) / `A` (away) team sides
//! - `&` AND combo separator, `|` OR separator, `!` negation
//! - `/` halftime/fulltime separator (never `-`)
//! - `X:Y` correct scores, `T`-prefixed exact counts
//! - `A-B` and `N+` goal ranges
//! - `GG` / `NG` both-teams-to-score tokens (with `_H1` / `_H2` variants)
//!
//! The folding helpers in this module translate the vendor spellings the
//! adapters actually see (dash-separated HT/FT, Roman-numeral half
//! suffixes, localized team labels) into this grammar.

use arbscan_core::BetTypeId;

// =============================================================================
// Validation
// =============================================================================

/// True when `selection` conforms to the grammar.
#[must_use]
pub fn is_valid_selection(selection: &str) -> bool {
    if selection.is_empty() || !selection.is_ascii() {
        return false;
    }

    selection.split('|').all(|part| {
        let part = part.strip_prefix('!').unwrap_or(part);
        !part.is_empty() && part.split('&').all(is_valid_atom)
    })
}

fn is_result_token(s: &str) -> bool {
    matches!(s, "1" | "X" | "2" | "1X" | "12" | "X2")
}

fn is_range(s: &str) -> bool {
    // "A-B" closed range or "N+" open range.
    if let Some(stripped) = s.strip_suffix('+') {
        return is_small_int(stripped);
    }
    if let Some((lo, hi)) = s.split_once('-') {
        return is_small_int(lo) && is_small_int(hi);
    }
    false
}

fn is_small_int(s: &str) -> bool {
    !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_atom(atom: &str) -> bool {
    let atom = atom.strip_prefix('!').unwrap_or(atom);
    if atom.is_empty() {
        return false;
    }

    // Result tokens, team sides, over/under legs, BTTS tokens.
    if is_result_token(atom) || matches!(atom, "H" | "A" | "O" | "U" | "GG" | "NG" | "none") {
        return true;
    }

    // First-goal sides and half comparisons.
    if matches!(atom, "H_first" | "A_first" | "H1>H2" | "H1<H2" | "H1=H2") {
        return true;
    }

    // Half-scoped result / BTTS tokens: "1_H1", "GG_H2", "1X_H1".
    if let Some((base, half)) = atom.rsplit_once('_') {
        if matches!(half, "H1" | "H2") {
            return is_result_token(base) || matches!(base, "GG" | "NG");
        }
    }

    // Halftime/fulltime pair: "1/X".
    if let Some((ht, ft)) = atom.split_once('/') {
        return is_result_token(ht) && is_result_token(ft);
    }

    // Correct score: "2:1".
    if let Some((home, away)) = atom.split_once(':') {
        if is_small_int(home) && is_small_int(away) {
            return true;
        }
    }

    // Exact count: "T0", "T13".
    if let Some(count) = atom.strip_prefix('T') {
        if is_small_int(count) {
            return true;
        }
    }

    // Scoped goal expressions: "H1:0-1", "H2:2+", "FT:2+", "H1:T0".
    for prefix in ["H1:", "H2:", "FT:"] {
        if let Some(rest) = atom.strip_prefix(prefix) {
            if is_range(rest) {
                return true;
            }
            if let Some(count) = rest.strip_prefix('T') {
                return is_small_int(count);
            }
            return false;
        }
    }

    // Team-scoped goal expressions: "H2+", "A0-1".
    if let Some(rest) = atom.strip_prefix('H').or_else(|| atom.strip_prefix('A')) {
        if is_range(rest) {
            return true;
        }
    }

    // Bare ranges: "0-2", "3+".
    is_range(atom)
}

// =============================================================================
// Vendor folding
// =============================================================================

/// Folds a halftime/fulltime selection that uses `-` as separator into the
/// canonical `/` form. `NE`-prefixed negations become `!`.
///
/// `"1-1"` → `"1/1"`, `"NE 1-1"` → `"!1/1"`, `"1/1"` stays put.
#[must_use]
pub fn fold_htft_separator(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed.strip_prefix("NE ") {
        return format!("!{}", inner.trim().replace('-', "/"));
    }
    trimmed.replace('-', "/")
}

/// Folds one vendor combo token into grammar form.
///
/// Handles the Roman-numeral half spellings (`I`, `II`), localized team
/// labels (`Tim1`/`Tim2`, `D`/`G`), first-goal codes, and half
/// comparisons. Tokens already in grammar form pass through unchanged.
#[must_use]
pub fn fold_half_token(raw: &str) -> String {
    let t = raw.trim();

    // Half BTTS, with and without the space.
    match t {
        "I GG" | "IGG" => return "GG_H1".to_string(),
        "II GG" | "IIGG" => return "GG_H2".to_string(),
        "I NG" | "ING" => return "NG_H1".to_string(),
        "II NG" | "IING" => return "NG_H2".to_string(),
        "NE I GG" => return "!GG_H1".to_string(),
        "NE II GG" => return "!GG_H2".to_string(),
        // Half comparisons.
        "I >" | "I>" => return "H1>H2".to_string(),
        "II >" | "II>" => return "H1<H2".to_string(),
        "I = II" | "I=II" => return "H1=H2".to_string(),
        _ => {}
    }

    // First-goal codes: "PDG1" home scores first, "PDG Niko" nobody.
    if let Some(rest) = t.strip_prefix("PDG") {
        let rest = rest.trim();
        return match rest {
            "1" => "H_first".to_string(),
            "2" => "A_first".to_string(),
            _ => "none".to_string(),
        };
    }

    // Half-scoped results: "I 1" → "1_H1", "II X" → "X_H2", "I 1X" → "1X_H1".
    for (prefix, half) in [("II ", "H2"), ("I ", "H1")] {
        if let Some(rest) = t.strip_prefix(prefix) {
            let rest = rest.trim();
            if matches!(rest, "1" | "X" | "2" | "1X" | "12" | "X2") {
                return format!("{rest}_{half}");
            }
        }
    }

    // Localized team labels.
    for (vendor, side) in [("Tim1", 'H'), ("Tim2", 'A')] {
        if let Some(rest) = t.strip_prefix(vendor) {
            let rest = rest.trim();
            if rest.is_empty() {
                return side.to_string();
            }
            return format!("{side}{rest}");
        }
    }

    // Team+half goal expressions must fold before bare halves:
    // "DI1+" → "H1:1+", "GII0-1" → "H2:0-1" (team is carried by the bet type).
    for (prefix, scope) in [("DII", "H2:"), ("GII", "H2:"), ("DI", "H1:"), ("GI", "H1:")] {
        if let Some(rest) = strip_goal_prefix(t, prefix) {
            return format!("{scope}{rest}");
        }
    }

    // Roman half goal expressions: "II2+" → "H2:2+", "I 0-1" → "H1:0-1".
    for (prefix, scope) in [("II", "H2:"), ("I", "H1:")] {
        if let Some(rest) = strip_goal_prefix(t, prefix) {
            return format!("{scope}{rest}");
        }
    }

    // Team letters: "D2+" → "H2+", "G0-1" → "A0-1".
    for (prefix, side) in [("D", "H"), ("G", "A")] {
        if let Some(rest) = strip_goal_prefix(t, prefix) {
            return format!("{side}{rest}");
        }
    }

    t.to_string()
}

/// Strips `prefix` (plus optional space) when what follows is a goal
/// expression starting with a digit.
fn strip_goal_prefix<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = token.strip_prefix(prefix)?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    rest.bytes().next().filter(u8::is_ascii_digit)?;
    Some(rest)
}

/// Folds a vendor OR combination (`v`-separated) into `|`-separated grammar
/// form, folding each side.
///
/// `"1v3+"` → `"1|3+"`, `"IGGvII GG"` → `"GG_H1|GG_H2"`.
#[must_use]
pub fn fold_or_token(raw: &str) -> String {
    raw.trim()
        .split('v')
        .map(fold_half_token)
        .collect::<Vec<_>>()
        .join("|")
}

/// Reroutes standalone digit selections inside goal-range bet types.
///
/// A bare `"3"` on the total-goals-range type is really the exact-goals
/// wager and must land there as `"T3"`; on team/half range types the digit
/// stays in place but still gains the `T` prefix.
#[must_use]
pub fn reroute_goal_range(bet_type: BetTypeId, selection: &str) -> (BetTypeId, String) {
    let trimmed = selection.trim();
    let is_bare_digit = is_small_int(trimmed);

    if !is_bare_digit {
        return (bet_type, trimmed.to_string());
    }

    match bet_type.0 {
        // total_goals_range → exact_goals
        25 => (BetTypeId(26), format!("T{trimmed}")),
        // team/half range types keep the id, gain the prefix
        26..=34 | 66 | 67 => (bet_type, format!("T{trimmed}")),
        _ => (bet_type, trimmed.to_string()),
    }
}
