//! Soccerbet adapter.
//!
//! Same backend family as MaxBet, but the per-match payload nests every
//! price under `betMap[code][param].ov`: no-param markets sit under the
//! literal `"NULL"` key, parameterized markets (handicaps, alternate
//! totals) under their line. Handicap lines follow the family's negated
//! sign convention and are folded to canonical on the way through.

pub mod markets;

use arbscan_codec::{fold_negated_handicap, validate_row};
use arbscan_core::{
    parse, AdapterCounters, FetchConfig, HttpFetcher, ProviderAdapter, ProviderError, ProviderId,
    RawMatch, RawOdds, ScrapeConfig, Sport,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const PROVIDER_ID: ProviderId = ProviderId(5);
pub const BASE_URL: &str = "https://www.soccerbet.rs/restapi/offer/sr";

const SUPPORTED: [Sport; 5] = [
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::Hockey,
    Sport::TableTennis,
];

#[must_use]
pub fn sport_code(sport: Sport) -> &'static str {
    match sport {
        Sport::Football => "S",
        Sport::Basketball => "B",
        Sport::Tennis => "T",
        Sport::Hockey => "H",
        Sport::TableTennis => "TT",
    }
}

// =============================================================================
// Response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct LeaguesResponse {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueMatchesResponse {
    #[serde(default)]
    es_matches: Vec<MatchSummary>,
}

#[derive(Debug, Deserialize)]
struct MatchSummary {
    id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsCell {
    pub ov: Decimal,
}

/// `betMap[code][param] → {ov: price}`.
pub type BetMap = HashMap<String, HashMap<String, OddsCell>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub id: i64,
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub away: String,
    pub kick_off_time: Option<serde_json::Value>,
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub bet_map: BetMap,
}

// =============================================================================
// Adapter
// =============================================================================

pub struct SoccerbetAdapter {
    fetcher: HttpFetcher,
    base_url: String,
    unmapped: AtomicU64,
}

impl SoccerbetAdapter {
    /// Builds the adapter from scrape configuration.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` on HTTP client failure.
    pub fn new(scrape: &ScrapeConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(scrape, BASE_URL)
    }

    /// Test constructor pointing at a mock upstream.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` on HTTP client failure.
    pub fn with_base_url(scrape: &ScrapeConfig, base_url: &str) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("*/*"));
        headers.insert(
            "Origin",
            HeaderValue::from_static("https://www.soccerbet.rs"),
        );

        let fetcher = HttpFetcher::new(
            FetchConfig::default()
                .with_timeout(Duration::from_secs(scrape.request_timeout_seconds))
                .with_max_concurrent(scrape.max_concurrent_requests)
                .with_headers(headers),
        )?;

        Ok(Self {
            fetcher,
            base_url: base_url.to_string(),
            unmapped: AtomicU64::new(0),
        })
    }

    fn common_params() -> Vec<(&'static str, String)> {
        vec![
            ("annex", "0".to_string()),
            ("desktopVersion", "2.36.3.9".to_string()),
            ("locale", "sr".to_string()),
        ]
    }

    async fn fetch_leagues(&self, sport: Sport) -> Result<Vec<Category>, ProviderError> {
        let url = format!(
            "{}/categories/ext/sport/{}/g",
            self.base_url,
            sport_code(sport)
        );
        let response: LeaguesResponse = self.fetcher.get_json(&url, &Self::common_params()).await?;
        Ok(response.categories)
    }

    async fn fetch_league_matches(
        &self,
        sport: Sport,
        league_id: i64,
    ) -> Result<Vec<MatchSummary>, ProviderError> {
        let url = format!(
            "{}/sport/{}/league-group/{}/mob",
            self.base_url,
            sport_code(sport),
            league_id
        );
        let response: LeagueMatchesResponse =
            self.fetcher.get_json(&url, &Self::common_params()).await?;
        Ok(response.es_matches)
    }

    async fn fetch_match_detail(&self, match_id: i64) -> Result<MatchDetail, ProviderError> {
        let url = format!("{}/match/{}", self.base_url, match_id);
        self.fetcher.get_json(&url, &Self::common_params()).await
    }

    fn parse_match(&self, detail: MatchDetail, sport: Sport) -> Option<RawMatch> {
        if detail.home.is_empty() || detail.away.is_empty() {
            return None;
        }
        let start_time = detail
            .kick_off_time
            .as_ref()
            .and_then(parse::parse_timestamp)?;

        let (odds, unmapped) = parse_bet_map(&detail.bet_map, sport);
        self.unmapped.fetch_add(unmapped, Ordering::Relaxed);
        if odds.is_empty() {
            return None;
        }

        let mut raw = RawMatch::new(PROVIDER_ID, detail.home, detail.away, sport, start_time)
            .with_external_id(detail.id.to_string());
        if let Some(league) = detail.league_name.filter(|l| !l.is_empty()) {
            raw = raw.with_league(league);
        }
        raw.odds = odds;
        Some(raw)
    }
}

#[async_trait]
impl ProviderAdapter for SoccerbetAdapter {
    fn provider_id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "soccerbet"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn supported_sports(&self) -> &[Sport] {
        &SUPPORTED
    }

    fn counters(&self) -> AdapterCounters {
        AdapterCounters {
            requests: self.fetcher.request_count(),
            errors: self.fetcher.error_count(),
            unmapped_markets: self.unmapped.load(Ordering::Relaxed),
        }
    }

    async fn scrape_sport(&self, sport: Sport) -> Result<Vec<RawMatch>, ProviderError> {
        let leagues = self.fetch_leagues(sport).await?;

        let league_lists =
            join_all(leagues.iter().map(|l| self.fetch_league_matches(sport, l.id))).await;

        let mut match_ids = Vec::new();
        for list in league_lists.into_iter().flatten() {
            match_ids.extend(list.into_iter().map(|m| m.id));
        }

        let details = join_all(match_ids.iter().map(|&id| self.fetch_match_detail(id))).await;

        let mut matches = Vec::new();
        for detail in details {
            match detail {
                Ok(detail) => {
                    if let Some(raw) = self.parse_match(detail, sport) {
                        matches.push(raw);
                    }
                }
                Err(err) => {
                    tracing::debug!(provider = "soccerbet", error = %err, "match detail dropped");
                }
            }
        }

        Ok(matches)
    }
}

// =============================================================================
// betMap parsing
// =============================================================================

fn cell<'a>(bet_map: &'a BetMap, code: &str) -> Option<&'a HashMap<String, OddsCell>> {
    bet_map.get(code)
}

fn null_price(bet_map: &BetMap, code: &str) -> Option<Decimal> {
    Some(cell(bet_map, code)?.get("NULL")?.ov)
}

/// Projects one betMap into canonical rows. Returns the rows plus the count
/// of codes nothing consumed.
#[must_use]
pub fn parse_bet_map(bet_map: &BetMap, sport: Sport) -> (Vec<RawOdds>, u64) {
    let mut out = Vec::new();
    let mut consumed: std::collections::HashSet<&str> = std::collections::HashSet::new();

    let tables = markets::for_sport(sport);

    for entry in tables.three_way {
        let [c1, c2, c3] = entry.codes;
        if let (Some(p1), Some(p2), Some(p3)) = (
            null_price(bet_map, c1),
            null_price(bet_map, c2),
            null_price(bet_map, c3),
        ) {
            out.push(RawOdds::three_way(entry.bet_type, p1, p2, p3, Decimal::ZERO));
            consumed.extend([c1, c2, c3]);
        }
    }

    for entry in tables.two_way {
        let [c1, c2] = entry.codes;
        if let (Some(p1), Some(p2)) = (null_price(bet_map, c1), null_price(bet_map, c2)) {
            out.push(RawOdds::two_way(entry.bet_type, p1, p2, Decimal::ZERO));
            consumed.extend([c1, c2]);
        }
    }

    for entry in tables.fixed_totals {
        if let (Some(under), Some(over)) = (
            null_price(bet_map, entry.under),
            null_price(bet_map, entry.over),
        ) {
            out.push(RawOdds::two_way(entry.bet_type, under, over, entry.margin));
            consumed.extend([entry.under, entry.over]);
        }
    }

    // Parameterized pairs: the nested keys are the lines themselves, one
    // row per line present on both sides.
    for entry in tables.param_pairs {
        let (Some(home_cells), Some(away_cells)) =
            (cell(bet_map, entry.home), cell(bet_map, entry.away))
        else {
            continue;
        };
        for (param, home) in home_cells {
            if param == "NULL" {
                continue;
            }
            let Some(away) = away_cells.get(param) else {
                continue;
            };
            let Ok(line) = Decimal::from_str(param.trim()) else {
                continue;
            };
            let margin = if entry.negated_line {
                fold_negated_handicap(line)
            } else {
                line
            };
            out.push(RawOdds::two_way(entry.bet_type, home.ov, away.ov, margin));
        }
        consumed.extend([entry.home, entry.away]);
    }

    for market in tables.selections {
        for (code, selection) in market.codes {
            if let Some(price) = null_price(bet_map, code) {
                let (bet_type, selection) =
                    arbscan_codec::reroute_goal_range(market.bet_type, selection);
                out.push(RawOdds::selection(bet_type, selection, price));
                consumed.insert(code);
            }
        }
    }

    let unmapped = bet_map
        .keys()
        .filter(|code| !consumed.contains(code.as_str()))
        .count() as u64;
    if unmapped > 0 {
        tracing::debug!(provider = "soccerbet", unmapped, "unmapped vendor markets dropped");
    }

    let rows = out
        .into_iter()
        .filter(|row| match validate_row(row) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(provider = "soccerbet", error = %err, "price row rejected");
                false
            }
        })
        .collect();

    (rows, unmapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbscan_core::BetTypeId;
    use rust_decimal_macros::dec;

    fn bet_map(entries: &[(&str, &str, Decimal)]) -> BetMap {
        let mut map: BetMap = HashMap::new();
        for (code, param, price) in entries {
            map.entry((*code).to_string())
                .or_default()
                .insert((*param).to_string(), OddsCell { ov: *price });
        }
        map
    }

    // ==================== betMap Parsing Tests ====================

    #[test]
    fn test_parse_1x2_from_null_cells() {
        let map = bet_map(&[
            ("1", "NULL", dec!(2.05)),
            ("2", "NULL", dec!(3.30)),
            ("3", "NULL", dec!(3.70)),
        ]);

        let (rows, unmapped) = parse_bet_map(&map, Sport::Football);
        assert_eq!(rows.len(), 1);
        assert_eq!(unmapped, 0);
        assert_eq!(rows[0].bet_type, BetTypeId(2));
        assert_eq!(rows[0].p2, Some(dec!(3.30)));
    }

    #[test]
    fn test_parse_param_handicap_negated_sign() {
        // The family reports +1.0; canonical is -1.0 (away advantage).
        let map = bet_map(&[("201", "1.0", dec!(1.72)), ("203", "1.0", dec!(2.05))]);

        let (rows, _) = parse_bet_map(&map, Sport::Football);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(9));
        assert_eq!(rows[0].margin, dec!(-1.0));
        assert_eq!(rows[0].p1, dec!(1.72));
    }

    #[test]
    fn test_param_lines_must_pair() {
        // Home side has a 2.5 line, away side only 3.5: nothing pairs.
        let map = bet_map(&[("201", "2.5", dec!(1.80)), ("203", "3.5", dec!(1.90))]);

        let (rows, _) = parse_bet_map(&map, Sport::Football);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_htft_codes_emit_canonical_slash() {
        let map = bet_map(&[("10", "NULL", dec!(4.60))]);

        let (rows, _) = parse_bet_map(&map, Sport::Football);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(24));
        assert_eq!(rows[0].selection, "1/1");
    }

    #[test]
    fn test_unknown_codes_counted() {
        let map = bet_map(&[("87654", "NULL", dec!(1.40))]);
        let (rows, unmapped) = parse_bet_map(&map, Sport::Football);
        assert!(rows.is_empty());
        assert_eq!(unmapped, 1);
    }

    #[test]
    fn test_basketball_winner() {
        let map = bet_map(&[("1", "NULL", dec!(1.65)), ("3", "NULL", dec!(2.25))]);
        let (rows, _) = parse_bet_map(&map, Sport::Basketball);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(1));
    }

    // ==================== Adapter Contract Tests ====================

    #[tokio::test]
    async fn test_scrape_sport_against_mock_upstream() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/categories/ext/sport/S/g"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "categories": [{"id": 42, "name": "Superliga"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/sport/S/league-group/42/mob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esMatches": [{"id": 900}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/match/900"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 900,
                "home": "Crvena Zvezda",
                "away": "Partizan",
                "kickOffTime": 1_770_000_000_000i64,
                "leagueName": "Superliga",
                "betMap": {
                    "1": {"NULL": {"ov": 1.85}},
                    "2": {"NULL": {"ov": 3.60}},
                    "3": {"NULL": {"ov": 4.10}}
                }
            })))
            .mount(&server)
            .await;

        let adapter =
            SoccerbetAdapter::with_base_url(&ScrapeConfig::default(), &server.uri()).unwrap();
        let matches = adapter.scrape_sport(Sport::Football).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].team1, "Crvena Zvezda");
        assert_eq!(matches[0].odds[0].bet_type, BetTypeId(2));
    }
}
