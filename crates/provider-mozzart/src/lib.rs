//! Mozzart Bet adapter.
//!
//! The upstream sits behind an anti-bot challenge, so the HTTP channel is
//! a headless-browser session: API calls run as `fetch` inside a warmed-up
//! page. The session lives at least one scrape cycle; when it dies the
//! cycle fails, the session is torn down, and the next cycle recreates it
//! without operator intervention.

pub mod parse;

use arbscan_core::{
    parse as core_parse, AdapterCounters, ProviderAdapter, ProviderError, ProviderId, RawMatch,
    ScrapeConfig, Sport,
};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use parse::{MatchDocument, MatchInfo};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const PROVIDER_ID: ProviderId = ProviderId(1);
pub const BASE_URL: &str = "https://www.mozzartbet.com";

const WARMUP_URL: &str = "https://www.mozzartbet.com/sr/kladjenje/sport/1?date=today";

const SUPPORTED: [Sport; 5] = [
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::Hockey,
    Sport::TableTennis,
];

/// Mozzart's sport ids.
#[must_use]
pub fn sport_id(sport: Sport) -> i64 {
    match sport {
        Sport::Football => 1,
        Sport::Basketball => 2,
        Sport::Tennis => 5,
        Sport::Hockey => 4,
        Sport::TableTennis => 9,
    }
}

#[derive(Debug, Deserialize)]
struct CompetitionsResponse {
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct MatchListResponse {
    #[serde(default)]
    items: Vec<MatchListItem>,
}

#[derive(Debug, Deserialize)]
struct MatchListItem {
    id: i64,
}

struct Session {
    // Keeps the browser process alive for the tab's lifetime.
    _browser: Browser,
    tab: Arc<Tab>,
}

pub struct MozzartAdapter {
    session: Mutex<Option<Session>>,
    request_timeout_secs: u64,
    requests: AtomicU64,
    errors: AtomicU64,
    unmapped: AtomicU64,
}

impl MozzartAdapter {
    #[must_use]
    pub fn new(scrape: &ScrapeConfig) -> Self {
        Self {
            session: Mutex::new(None),
            request_timeout_secs: scrape.request_timeout_seconds,
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            unmapped: AtomicU64::new(0),
        }
    }

    /// Launches and warms up a browser session.
    async fn ensure_session(&self) -> Result<Arc<Tab>, ProviderError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.tab.clone());
        }

        let timeout = std::time::Duration::from_secs(self.request_timeout_secs.max(30));
        let session = tokio::task::spawn_blocking(move || -> Result<Session, ProviderError> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .build()
                .map_err(|e| ProviderError::Configuration(format!("chrome options: {e}")))?;

            let browser = Browser::new(options)
                .map_err(|e| ProviderError::SessionLost(format!("launch failed: {e}")))?;
            let tab = browser
                .new_tab()
                .map_err(|e| ProviderError::SessionLost(format!("tab failed: {e}")))?;
            tab.set_default_timeout(timeout);

            // Warm up against the betting page so the challenge cookie is
            // in place before the first API call.
            tab.navigate_to(WARMUP_URL)
                .and_then(|t| t.wait_until_navigated())
                .map_err(|e| ProviderError::SessionLost(format!("warmup failed: {e}")))?;

            Ok(Session {
                _browser: browser,
                tab,
            })
        })
        .await
        .map_err(|e| ProviderError::SessionLost(format!("session task: {e}")))??;

        tracing::info!(provider = "mozzart", "browser session established");
        let tab = session.tab.clone();
        *guard = Some(session);
        Ok(tab)
    }

    async fn drop_session(&self) {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            tracing::warn!(provider = "mozzart", "browser session torn down");
        }
    }

    /// POSTs a JSON payload through the page's own `fetch`, riding the
    /// session cookies past the challenge.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let tab = self.ensure_session().await?;
        self.requests.fetch_add(1, Ordering::Relaxed);

        let url = format!("{BASE_URL}{path}");
        let body = serde_json::to_string(payload)?;
        let script = format!(
            r#"(async () => {{
                const response = await fetch({url}, {{
                    method: 'POST',
                    headers: {{
                        'Accept': 'application/json, text/plain, */*',
                        'Content-Type': 'application/json',
                        'Medium': 'PREMATCH_WEB'
                    }},
                    body: {body}
                }});
                if (!response.ok) {{
                    throw new Error('HTTP ' + response.status);
                }}
                return JSON.stringify(await response.json());
            }})()"#,
            url = serde_json::Value::String(url),
            body = serde_json::Value::String(body),
        );

        let result = tokio::task::spawn_blocking(move || {
            tab.evaluate(&script, true)
                .map_err(|e| ProviderError::SessionLost(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::SessionLost(format!("eval task: {e}")))?;

        let remote = match result {
            Ok(remote) => remote,
            Err(err) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.drop_session().await;
                return Err(err);
            }
        };

        let Some(serde_json::Value::String(raw)) = remote.value else {
            self.errors.fetch_add(1, Ordering::Relaxed);
            self.drop_session().await;
            return Err(ProviderError::SessionLost(
                "fetch returned no body".to_string(),
            ));
        };

        serde_json::from_str(&raw).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn fetch_competitions(&self, sport: Sport) -> Result<Vec<Competition>, ProviderError> {
        let payload = serde_json::json!({
            "date": "all_days",
            "sportId": sport_id(sport),
        });
        let response: CompetitionsResponse =
            self.post_json("/betting/get-competitions", &payload).await?;
        Ok(response.competitions)
    }

    async fn fetch_match_ids(
        &self,
        sport: Sport,
        competition_id: i64,
    ) -> Result<Vec<i64>, ProviderError> {
        let payload = serde_json::json!({
            "date": "all_days",
            "sort": "bycompetition",
            "currentPage": 0,
            "pageSize": 100,
            "sportId": sport_id(sport),
            "competitionIds": [competition_id],
            "search": "",
            "matchTypeId": 0,
        });
        let response: MatchListResponse = self.post_json("/betting/matches", &payload).await?;
        Ok(response.items.into_iter().map(|m| m.id).collect())
    }

    async fn fetch_match(&self, match_id: i64) -> Result<Option<MatchInfo>, ProviderError> {
        let payload = serde_json::json!({});
        let document: MatchDocument = self
            .post_json(&format!("/betting/match/{match_id}"), &payload)
            .await?;
        Ok(document.match_info)
    }

    fn build_match(&self, info: MatchInfo, sport: Sport) -> Option<RawMatch> {
        let team1 = info.home.as_ref().map(|p| p.name.clone())?;
        let team2 = info.visitor.as_ref().map(|p| p.name.clone())?;
        if team1.is_empty() || team2.is_empty() {
            return None;
        }
        let start_time = info
            .start_time
            .as_ref()
            .and_then(core_parse::parse_timestamp)?;

        let (odds, unmapped) = parse::parse_match_odds(&info, sport);
        self.unmapped.fetch_add(unmapped, Ordering::Relaxed);
        if odds.is_empty() {
            return None;
        }

        let mut raw = RawMatch::new(PROVIDER_ID, team1, team2, sport, start_time)
            .with_external_id(info.id.to_string());
        if let Some(competition) = info.competition.as_ref().filter(|c| !c.name.is_empty()) {
            raw = raw.with_league(competition.name.clone());
        }
        raw.odds = odds;
        Some(raw)
    }
}

#[async_trait]
impl ProviderAdapter for MozzartAdapter {
    fn provider_id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "mozzart"
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn supported_sports(&self) -> &[Sport] {
        &SUPPORTED
    }

    fn counters(&self) -> AdapterCounters {
        AdapterCounters {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            unmapped_markets: self.unmapped.load(Ordering::Relaxed),
        }
    }

    async fn reset_session(&self) {
        self.drop_session().await;
    }

    async fn scrape_sport(&self, sport: Sport) -> Result<Vec<RawMatch>, ProviderError> {
        let competitions = self.fetch_competitions(sport).await?;

        // Browser calls serialize on the single tab; sequential fetches
        // keep the session stable behind the challenge.
        let mut match_ids = Vec::new();
        for competition in &competitions {
            match self.fetch_match_ids(sport, competition.id).await {
                Ok(ids) => match_ids.extend(ids),
                Err(err @ ProviderError::SessionLost(_)) => return Err(err),
                Err(err) => {
                    tracing::debug!(provider = "mozzart", competition = %competition.name, error = %err, "competition dropped");
                }
            }
        }

        let mut matches = Vec::new();
        for match_id in match_ids {
            match self.fetch_match(match_id).await {
                Ok(Some(info)) => {
                    if let Some(raw) = self.build_match(info, sport) {
                        matches.push(raw);
                    }
                }
                Ok(None) => {}
                Err(err @ ProviderError::SessionLost(_)) => return Err(err),
                Err(err) => {
                    tracing::debug!(provider = "mozzart", match_id, error = %err, "match dropped");
                }
            }
        }

        Ok(matches)
    }
}
