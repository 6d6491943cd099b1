//! Team and event name normalization.
//!
//! A deterministic, side-effect-free pipeline used by both the identity
//! resolver and the persister (the normalized forms back the store's
//! unique constraint, so both must agree byte-for-byte):
//!
//! 1. Serbian Cyrillic → Latin transliteration, NFKD + combining-mark strip
//! 2. lowercase
//! 3. club-affix and year-token removal, punctuation strip
//! 4. whitespace collapse
//!
//! Tennis gets a sport override reducing `"Last, First"`, `"First Last"`,
//! and `"N. Last"` forms to a canonical `"surname initial"` token.

use unicode_normalization::UnicodeNormalization;

/// Club affixes dropped as standalone tokens.
const AFFIXES: &[&str] = &[
    "fc", "fk", "sk", "bc", "hc", "kk", "rk", "ok", "sc", "ac", "as", "cd", "cf", "sd", "ud",
    "rc", "afc", "sfc", "club",
];

/// Markers that must agree between two listings before any fuzzy score is
/// considered (an U21 side is never the senior side).
const CATEGORY_MARKERS: &[&str] = &[
    "u15", "u16", "u17", "u18", "u19", "u20", "u21", "u23", "women", "zene", "ladies",
    "reserves", "youth", "amateur", "esports",
];

fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'а' | 'А' => "a",
        'б' | 'Б' => "b",
        'в' | 'В' => "v",
        'г' | 'Г' => "g",
        'д' | 'Д' => "d",
        'ђ' | 'Ђ' | 'đ' | 'Đ' => "dj",
        'е' | 'Е' => "e",
        'ж' | 'Ж' => "z",
        'з' | 'З' => "z",
        'и' | 'И' => "i",
        'ј' | 'Ј' => "j",
        'к' | 'К' => "k",
        'л' | 'Л' => "l",
        'љ' | 'Љ' => "lj",
        'м' | 'М' => "m",
        'н' | 'Н' => "n",
        'њ' | 'Њ' => "nj",
        'о' | 'О' => "o",
        'п' | 'П' => "p",
        'р' | 'Р' => "r",
        'с' | 'С' => "s",
        'т' | 'Т' => "t",
        'ћ' | 'Ћ' => "c",
        'у' | 'У' => "u",
        'ф' | 'Ф' => "f",
        'х' | 'Х' => "h",
        'ц' | 'Ц' => "c",
        'ч' | 'Ч' => "c",
        'џ' | 'Џ' => "dz",
        'ш' | 'Ш' => "s",
        _ => return None,
    })
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn fold_chars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if let Some(latin) = transliterate(c) {
            out.push_str(latin);
            continue;
        }
        for d in c.nfkd() {
            if is_combining_mark(d) {
                continue;
            }
            if d.is_alphanumeric() {
                out.extend(d.to_lowercase());
            } else {
                out.push(' ');
            }
        }
    }
    out
}

fn is_year_token(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Normalizes a team name. Idempotent.
#[must_use]
pub fn normalize_team(raw: &str) -> String {
    let folded = fold_chars(raw);
    folded
        .split_whitespace()
        .filter(|t| !AFFIXES.contains(t) && !is_year_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a league/competition name. Same pipeline as teams.
#[must_use]
pub fn normalize_league(raw: &str) -> String {
    normalize_team(raw)
}

/// Category markers present in a pair of team names. Used by the resolver
/// as a hard filter: both listings must carry the identical marker set.
#[must_use]
pub fn category_markers(team1: &str, team2: &str) -> Vec<&'static str> {
    let combined = format!("{} {}", fold_chars(team1), fold_chars(team2));
    let tokens: Vec<&str> = combined.split_whitespace().collect();
    let mut found: Vec<&'static str> = CATEGORY_MARKERS
        .iter()
        .copied()
        .filter(|m| tokens.contains(m))
        .collect();
    found.dedup();
    found
}

/// Tennis override: reduces a player name to `"surname initial"` so
/// `"Novak Djokovic"`, `"Djokovic, Novak"`, and `"N. Djokovic"` all meet
/// at `"djokovic n"`.
#[must_use]
pub fn normalize_tennis_player(raw: &str) -> String {
    // "Last, First" → "First Last" before the shared pipeline.
    let reordered = match raw.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => raw.to_string(),
    };

    let normalized = normalize_team(&reordered);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    match tokens.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, .., last] => {
            let initial = first.chars().next().map(String::from).unwrap_or_default();
            format!("{last} {initial}")
        }
    }
}
