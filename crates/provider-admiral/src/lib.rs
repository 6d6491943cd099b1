//! Admiral Bet adapter.
//!
//! Structured shape: a competition tree endpoint, a per-competition event
//! list, and a per-event `betsAndGroups` document with first-class
//! `betTypeId`, ordered `betOutcomes[]`, and the line in `sBV`. Football
//! and basketball map by bet-type id; the thinner sports match on the
//! localized bet-type name.

pub mod markets;

use arbscan_codec::validate_row;
use arbscan_core::{
    parse, AdapterCounters, FetchConfig, HttpFetcher, ProviderAdapter, ProviderError, ProviderId,
    RawMatch, RawOdds, ScrapeConfig, Sport,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const PROVIDER_ID: ProviderId = ProviderId(4);
pub const BASE_URL: &str = "https://srboffer.admiralbet.rs/api/offer";

const SUPPORTED: [Sport; 5] = [
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::Hockey,
    Sport::TableTennis,
];

/// Admiral's sport ids.
#[must_use]
pub fn sport_id(sport: Sport) -> i64 {
    match sport {
        Sport::Football => 1,
        Sport::Basketball => 2,
        Sport::Tennis => 3,
        Sport::Hockey => 4,
        Sport::TableTennis => 17,
    }
}

// =============================================================================
// Response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeSport {
    id: i64,
    #[serde(default)]
    regions: Vec<TreeRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRegion {
    #[serde(default)]
    region_name: String,
    #[serde(default)]
    competitions: Vec<TreeCompetition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeCompetition {
    region_id: i64,
    competition_id: i64,
    #[serde(default)]
    competition_name: String,
}

#[derive(Debug, Clone)]
struct Competition {
    region_id: i64,
    competition_id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventSummary {
    id: i64,
    #[serde(default)]
    name: String,
    date_time: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetsAndGroups {
    #[serde(default)]
    pub bets: Vec<Bet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub bet_type_id: Option<i64>,
    #[serde(default)]
    pub bet_type_name: String,
    #[serde(default)]
    pub bet_outcomes: Vec<BetOutcome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetOutcome {
    #[serde(default)]
    pub name: String,
    pub odd: Option<Decimal>,
    #[serde(default)]
    pub order_no: i64,
    /// Special bet value: the line for totals and handicaps.
    #[serde(default, rename = "sBV")]
    pub s_bv: Option<String>,
}

// =============================================================================
// Adapter
// =============================================================================

pub struct AdmiralAdapter {
    fetcher: HttpFetcher,
    base_url: String,
    unmapped: AtomicU64,
}

impl AdmiralAdapter {
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
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/utf8+json, application/json;q=0.9"),
        );
        headers.insert("Language", HeaderValue::from_static("sr-Latn"));
        headers.insert("Officeid", HeaderValue::from_static("138"));
        headers.insert("Origin", HeaderValue::from_static("https://admiralbet.rs"));

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

    async fn fetch_competitions(&self, sport: Sport) -> Result<Vec<Competition>, ProviderError> {
        let url = format!("{}/webTree", self.base_url);
        let tree: Vec<TreeSport> = self.fetcher.get_json(&url, &[]).await?;

        let wanted = sport_id(sport);
        let mut competitions = Vec::new();
        for tree_sport in tree {
            if tree_sport.id != wanted {
                continue;
            }
            for region in tree_sport.regions {
                for comp in region.competitions {
                    competitions.push(Competition {
                        region_id: comp.region_id,
                        competition_id: comp.competition_id,
                        name: if region.region_name.is_empty() {
                            comp.competition_name.clone()
                        } else {
                            format!("{} {}", region.region_name, comp.competition_name)
                        },
                    });
                }
            }
        }
        Ok(competitions)
    }

    async fn fetch_events(
        &self,
        sport: Sport,
        competition: &Competition,
    ) -> Result<Vec<EventSummary>, ProviderError> {
        let url = format!("{}/getWebEventsSelections", self.base_url);
        let query = [
            ("pageId", "35".to_string()),
            ("sportId", sport_id(sport).to_string()),
            ("regionId", competition.region_id.to_string()),
            ("competitionId", competition.competition_id.to_string()),
            ("isLive", "false".to_string()),
        ];
        self.fetcher.get_json(&url, &query).await
    }

    async fn fetch_bets(
        &self,
        sport: Sport,
        competition: &Competition,
        event_id: i64,
    ) -> Result<BetsAndGroups, ProviderError> {
        let url = format!(
            "{}/betsAndGroups/{}/{}/{}/{}",
            self.base_url,
            sport_id(sport),
            competition.region_id,
            competition.competition_id,
            event_id
        );
        self.fetcher.get_json(&url, &[]).await
    }

    fn parse_event(
        &self,
        event: &EventSummary,
        competition: &Competition,
        bets: BetsAndGroups,
        sport: Sport,
    ) -> Option<RawMatch> {
        // Only plain two-team events; specials carry extra separators.
        if event.name.matches(" - ").count() != 1 {
            return None;
        }
        let (team1, team2) = parse::split_teams(&event.name, " - ")?;
        let start_time = event.date_time.as_ref().and_then(parse::parse_timestamp)?;

        let (odds, unmapped) = markets::parse_bets(&bets.bets, sport);
        self.unmapped.fetch_add(unmapped, Ordering::Relaxed);

        let rows: Vec<RawOdds> = odds
            .into_iter()
            .filter(|row| match validate_row(row) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(provider = "admiral", error = %err, "price row rejected");
                    false
                }
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        let mut raw = RawMatch::new(PROVIDER_ID, team1, team2, sport, start_time)
            .with_external_id(event.id.to_string())
            .with_league(competition.name.clone());
        raw.odds = rows;
        Some(raw)
    }
}

#[async_trait]
impl ProviderAdapter for AdmiralAdapter {
    fn provider_id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "admiral"
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
        let competitions = self.fetch_competitions(sport).await?;

        let event_lists =
            join_all(competitions.iter().map(|c| self.fetch_events(sport, c))).await;

        let mut event_refs = Vec::new();
        for (competition, events) in competitions.iter().zip(event_lists) {
            let Ok(events) = events else { continue };
            for event in events {
                event_refs.push((competition.clone(), event));
            }
        }

        let bets = join_all(
            event_refs
                .iter()
                .map(|(competition, event)| self.fetch_bets(sport, competition, event.id)),
        )
        .await;

        let mut matches = Vec::new();
        for ((competition, event), bets) in event_refs.iter().zip(bets) {
            match bets {
                Ok(bets) => {
                    if let Some(raw) = self.parse_event(event, competition, bets, sport) {
                        matches.push(raw);
                    }
                }
                Err(err) => {
                    tracing::debug!(provider = "admiral", error = %err, "event bets dropped");
                }
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbscan_core::BetTypeId;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scrape_sport_against_mock_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/webTree"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 1,
                    "regions": [{
                        "regionName": "Engleska",
                        "competitions": [{
                            "regionId": 5,
                            "competitionId": 30,
                            "competitionName": "Premier League"
                        }]
                    }]
                }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/getWebEventsSelections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 777, "name": "Arsenal - Chelsea", "dateTime": "2026-03-14T18:00:00Z"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/betsAndGroups/1/5/30/777"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bets": [
                    {
                        "betTypeId": 135,
                        "betTypeName": "Konacan ishod",
                        "betOutcomes": [
                            {"name": "1", "odd": 2.10, "orderNo": 1},
                            {"name": "X", "odd": 3.40, "orderNo": 2},
                            {"name": "2", "odd": 3.60, "orderNo": 3}
                        ]
                    },
                    {
                        "betTypeId": 137,
                        "betTypeName": "Ukupno golova",
                        "betOutcomes": [
                            {"name": "Manje", "odd": 1.85, "orderNo": 1, "sBV": "2.5"},
                            {"name": "Više", "odd": 1.95, "orderNo": 2, "sBV": "2.5"}
                        ]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let adapter =
            AdmiralAdapter::with_base_url(&ScrapeConfig::default(), &server.uri()).unwrap();
        let matches = adapter.scrape_sport(Sport::Football).await.unwrap();

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.team1, "Arsenal");
        assert_eq!(m.league.as_deref(), Some("Engleska Premier League"));

        let result = m.odds.iter().find(|r| r.bet_type == BetTypeId(2)).unwrap();
        assert_eq!(result.p1, dec!(2.10));

        let total = m.odds.iter().find(|r| r.bet_type == BetTypeId(5)).unwrap();
        assert_eq!(total.margin, dec!(2.5));
        assert_eq!(total.p1, dec!(1.85));
        assert_eq!(total.p2, Some(dec!(1.95)));
    }
}
