//! Cross-provider match identity.
//!
//! Folds each provider's raw listing into a stable internal match using a
//! weighted score over normalized team names, start-time proximity, league
//! identity, and price coherence. The resolver only decides identity; the
//! persister's upsert is the authoritative merge.

use crate::types::CandidateMatch;
use arbscan_codec::{normalize_league, normalize_team, normalize_tennis_player};
use arbscan_core::{RawMatch, Sport};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

// Score weights. Team similarity dominates; the rest disambiguates.
const WEIGHT_TEAM: f64 = 0.50;
const WEIGHT_TIME: f64 = 0.25;
const WEIGHT_LEAGUE: f64 = 0.15;
const WEIGHT_PRICE: f64 = 0.10;

/// Confidence at or above which a candidate is reused outright.
const AUTO_MERGE: f64 = 85.0;

/// Well-known alternate club names that survive normalization. Folded to
/// one canonical spelling before similarity scoring.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("red star belgrade", "crvena zvezda"),
    ("red star", "crvena zvezda"),
    ("inter milan", "inter"),
    ("internazionale", "inter"),
    ("bayern munchen", "bayern munich"),
    ("olympique de marseille", "marseille"),
    ("olympique marseille", "marseille"),
];

/// Configuration for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Lower confidence tier (0-100): reuse requires the time delta to be
    /// within 30 minutes as well.
    pub match_similarity_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_similarity_threshold: 70.0,
        }
    }
}

/// Component breakdown of one comparison.
#[derive(Debug, Clone, Copy)]
pub struct MatchScore {
    pub confidence: f64,
    pub team_score: f64,
    pub time_score: f64,
    pub league_score: f64,
    pub price_score: f64,
    /// The better orientation compared team1 against the candidate's team2.
    pub swapped: bool,
}

/// Outcome of resolving one raw listing.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Reused match id, or `None` to create a new match.
    pub existing_id: Option<i64>,
    /// Normalized keys the persister must use: the reused match's own keys
    /// on a merge, the listing's keys otherwise.
    pub team1_norm: String,
    pub team2_norm: String,
    pub start_time: DateTime<Utc>,
    /// Set when the winning orientation was flipped relative to the stored
    /// match; team-dependent odds must be reoriented before persisting.
    pub swapped: bool,
}

/// Weighted fuzzy resolver.
#[derive(Debug, Default)]
pub struct MatchResolver {
    config: ResolverConfig,
}

impl MatchResolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Normalizes one side for similarity scoring, sport overrides and
    /// aliases applied.
    fn normal_form(name: &str, sport: Sport) -> String {
        let normalized = if sport == Sport::Tennis {
            normalize_tennis_player(name)
        } else {
            normalize_team(name)
        };
        for (alias, canonical) in TEAM_ALIASES {
            if normalized == *alias {
                return (*canonical).to_string();
            }
        }
        normalized
    }

    /// Token-sort ratio on 0-100: tokens sorted, then normalized
    /// Levenshtein similarity.
    fn token_sort_ratio(a: &str, b: &str) -> f64 {
        let sort = |s: &str| {
            let mut tokens: Vec<&str> = s.split_whitespace().collect();
            tokens.sort_unstable();
            tokens.join(" ")
        };
        strsim::normalized_levenshtein(&sort(a), &sort(b)) * 100.0
    }

    /// Pair similarity over both orientations; returns the better score and
    /// whether it came from the flipped orientation.
    fn team_pair_score(
        raw: &RawMatch,
        candidate: &CandidateMatch,
    ) -> (f64, bool) {
        // Category markers are a hard filter: U21 is never the senior side.
        let raw_cats = arbscan_codec::normalize::category_markers(&raw.team1, &raw.team2);
        let cand_cats =
            arbscan_codec::normalize::category_markers(&candidate.team1, &candidate.team2);
        if raw_cats != cand_cats {
            return (0.0, false);
        }

        let t1a = Self::normal_form(&raw.team1, raw.sport);
        let t2a = Self::normal_form(&raw.team2, raw.sport);
        let t1b = Self::normal_form(&candidate.team1, raw.sport);
        let t2b = Self::normal_form(&candidate.team2, raw.sport);

        let straight = (Self::token_sort_ratio(&t1a, &t1b)
            + Self::token_sort_ratio(&t2a, &t2b))
            / 2.0;
        let flipped = (Self::token_sort_ratio(&t1a, &t2b)
            + Self::token_sort_ratio(&t2a, &t1b))
            / 2.0;

        if flipped > straight {
            (flipped, true)
        } else {
            (straight, false)
        }
    }

    /// Start-time proximity on 0-100 with linear decay inside the sport
    /// window, fading to zero by four windows out.
    fn time_score(a: DateTime<Utc>, b: DateTime<Utc>, sport: Sport) -> f64 {
        let window = sport.time_window_minutes() as f64;
        let diff = (a - b).num_seconds().abs() as f64 / 60.0;

        if diff <= 5.0 {
            100.0
        } else if diff <= window {
            100.0 - (diff / window) * 20.0
        } else if diff <= window * 4.0 {
            (80.0 - (diff - window) * 2.0).max(0.0)
        } else {
            0.0
        }
    }

    fn league_score(raw: Option<&str>, candidate: Option<&str>) -> f64 {
        match (raw, candidate) {
            (Some(a), Some(b)) => {
                let ratio =
                    Self::token_sort_ratio(&normalize_league(a), b);
                if ratio >= 80.0 {
                    100.0
                } else if ratio >= 60.0 {
                    50.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    /// Price coherence on 0-100: any common market whose prices agree
    /// within 20 % counts as coherent.
    fn price_score(a: Option<&[Decimal]>, b: Option<&[Decimal]>) -> f64 {
        let (Some(a), Some(b)) = (a, b) else {
            return 0.0;
        };
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }

        let coherent = a.iter().zip(b).all(|(x, y)| {
            let (lo, hi) = if x < y { (x, y) } else { (y, x) };
            !hi.is_zero() && lo / hi >= Decimal::new(80, 2)
        });

        if coherent {
            100.0
        } else {
            0.0
        }
    }

    /// Scores one candidate against one raw listing.
    #[must_use]
    pub fn score(
        &self,
        raw: &RawMatch,
        candidate: &CandidateMatch,
        candidate_prices: Option<&[Decimal]>,
        raw_prices: Option<&[Decimal]>,
    ) -> MatchScore {
        let (team_score, swapped) = Self::team_pair_score(raw, candidate);
        let time_score = Self::time_score(raw.start_time, candidate.start_time, raw.sport);
        let league_score =
            Self::league_score(raw.league.as_deref(), candidate.league_norm.as_deref());
        let price_score = Self::price_score(raw_prices, candidate_prices);

        let confidence = team_score * WEIGHT_TEAM
            + time_score * WEIGHT_TIME
            + league_score * WEIGHT_LEAGUE
            + price_score * WEIGHT_PRICE;

        MatchScore {
            confidence,
            team_score,
            time_score,
            league_score,
            price_score,
            swapped,
        }
    }

    fn accepts(&self, score: &MatchScore, raw: &RawMatch, candidate: &CandidateMatch) -> bool {
        if score.confidence >= AUTO_MERGE {
            return true;
        }
        let dt = (raw.start_time - candidate.start_time).num_minutes().abs();
        score.confidence >= self.config.match_similarity_threshold && dt <= 30
    }

    /// Resolves one listing against the candidate set.
    #[must_use]
    pub fn resolve(&self, raw: &RawMatch, candidates: &[CandidateMatch]) -> Resolution {
        let window = Duration::minutes(raw.sport.time_window_minutes() * 4);

        let mut best: Option<(&CandidateMatch, MatchScore)> = None;
        for candidate in candidates {
            if candidate.sport != raw.sport {
                continue;
            }
            if (candidate.start_time - raw.start_time).abs() > window {
                continue;
            }

            let score = self.score(raw, candidate, None, None);
            if !self.accepts(&score, raw, candidate) {
                continue;
            }
            let better = match &best {
                Some((_, current)) => score.confidence > current.confidence,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) => {
                tracing::debug!(
                    team1 = %raw.team1,
                    team2 = %raw.team2,
                    matched_id = candidate.id,
                    confidence = score.confidence,
                    swapped = score.swapped,
                    "listing folded into existing match"
                );
                Resolution {
                    existing_id: Some(candidate.id),
                    team1_norm: candidate.team1_norm.clone(),
                    team2_norm: candidate.team2_norm.clone(),
                    start_time: candidate.start_time,
                    swapped: score.swapped,
                }
            }
            None => Resolution {
                existing_id: None,
                team1_norm: Self::normal_form(&raw.team1, raw.sport),
                team2_norm: Self::normal_form(&raw.team2, raw.sport),
                start_time: raw.start_time,
                swapped: false,
            },
        }
    }

    /// Resolves a whole provider batch in deterministic order (sport, then
    /// start time, then input order), so two providers that agree exactly
    /// on inputs always produce the same resolution.
    #[must_use]
    pub fn resolve_batch(
        &self,
        batch: Vec<RawMatch>,
        candidates: &[CandidateMatch],
    ) -> Vec<(RawMatch, Resolution)> {
        let mut indexed: Vec<(usize, RawMatch)> = batch.into_iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            a.sport
                .id()
                .cmp(&b.sport.id())
                .then(a.start_time.cmp(&b.start_time))
                .then(ia.cmp(ib))
        });

        indexed
            .into_iter()
            .map(|(_, raw)| {
                let resolution = self.resolve(&raw, candidates);
                (raw, resolution)
            })
            .collect()
    }
}
