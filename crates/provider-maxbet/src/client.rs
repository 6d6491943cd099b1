//! MaxBet REST endpoints and response shapes.

use arbscan_core::{FetchConfig, HttpFetcher, ProviderError, ScrapeConfig, Sport};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.maxbet.rs/restapi/offer/sr";

/// Platform sport codes.
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

#[derive(Debug, Deserialize)]
pub struct LeaguesResponse {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueMatchesResponse {
    #[serde(default)]
    pub es_matches: Vec<MatchSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: i64,
    #[serde(default)]
    pub league_name: String,
}

/// Full match payload: flat code → price dict plus the line params.
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
    pub odds: HashMap<String, Decimal>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// Thin typed client over the shared fetcher.
#[derive(Debug)]
pub struct MaxbetClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl MaxbetClient {
    /// Builds the client from scrape configuration.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the HTTP client fails to
    /// build.
    pub fn new(scrape: &ScrapeConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(scrape, BASE_URL)
    }

    /// Same with an explicit base URL (tests point this at a mock server).
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the HTTP client fails to
    /// build.
    pub fn with_base_url(
        scrape: &ScrapeConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("*/*"));
        headers.insert("Origin", HeaderValue::from_static("https://www.maxbet.rs"));
        headers.insert(
            "Referer",
            HeaderValue::from_static("https://www.maxbet.rs/betting"),
        );

        let fetcher = HttpFetcher::new(
            FetchConfig::default()
                .with_timeout(Duration::from_secs(scrape.request_timeout_seconds))
                .with_max_concurrent(scrape.max_concurrent_requests)
                .with_headers(headers),
        )?;

        Ok(Self {
            fetcher,
            base_url: base_url.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    fn common_params() -> Vec<(&'static str, String)> {
        vec![
            ("annex", "3".to_string()),
            ("desktopVersion", "1.2.1.10".to_string()),
            ("locale", "sr".to_string()),
        ]
    }

    /// League list for one sport. Bonus-tip pseudo-leagues are filtered.
    ///
    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_leagues(&self, sport: Sport) -> Result<Vec<Category>, ProviderError> {
        let url = format!(
            "{}/categories/sport/{}/l",
            self.base_url,
            sport_code(sport)
        );
        let response: LeaguesResponse = self.fetcher.get_json(&url, &Self::common_params()).await?;

        Ok(response
            .categories
            .into_iter()
            .filter(|c| !c.name.contains("Bonus Tip") && !c.name.contains("Max Bonus"))
            .collect())
    }

    /// Match ids offered in one league.
    ///
    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_league_matches(
        &self,
        sport: Sport,
        league_id: i64,
    ) -> Result<Vec<MatchSummary>, ProviderError> {
        let url = format!(
            "{}/sport/{}/league/{}/mob",
            self.base_url,
            sport_code(sport),
            league_id
        );
        let response: LeagueMatchesResponse =
            self.fetcher.get_json(&url, &Self::common_params()).await?;
        Ok(response.es_matches)
    }

    /// Full odds payload for one match.
    ///
    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_match_detail(&self, match_id: i64) -> Result<MatchDetail, ProviderError> {
        let url = format!("{}/match/{}", self.base_url, match_id);
        self.fetcher.get_json(&url, &Self::common_params()).await
    }
}
