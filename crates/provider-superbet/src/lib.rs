//! SuperBet adapter.
//!
//! Compressed-overview shape: one per-sport endpoint returns every offered
//! event with short field names — `b` start time, `d` event id, `e` the
//! team pair, `g` the odds array whose items carry `n` (market/outcome
//! code), `h` (line, when the market takes one), and `o` (price). The
//! decode tables for `n` live here, in the adapter.

pub mod markets;

use arbscan_codec::validate_row;
use arbscan_core::{
    parse, AdapterCounters, FetchConfig, HttpFetcher, ProviderAdapter, ProviderError, ProviderId,
    RawMatch, RawOdds, ScrapeConfig, Sport,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const PROVIDER_ID: ProviderId = ProviderId(6);
pub const BASE_URL: &str =
    "https://production-superbet-offer-rs.freetls.fastly.net/sb-rs/api/v2/sr-Latn-RS";

const SUPPORTED: [Sport; 5] = [
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::Hockey,
    Sport::TableTennis,
];

/// SuperBet's sport ids.
#[must_use]
pub fn sport_id(sport: Sport) -> i64 {
    match sport {
        Sport::Football => 5,
        Sport::Basketball => 2,
        Sport::Tennis => 3,
        Sport::Hockey => 4,
        Sport::TableTennis => 16,
    }
}

// =============================================================================
// Overview shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct OverviewResponse {
    #[serde(default)]
    data: Vec<OverviewEvent>,
}

/// One event row in the compressed overview.
#[derive(Debug, Deserialize)]
pub struct OverviewEvent {
    /// Event id.
    pub d: i64,
    /// Start time (epoch seconds or formatted string).
    pub b: Option<serde_json::Value>,
    /// The two team names.
    #[serde(default)]
    pub e: Vec<String>,
    /// Priced outcomes.
    #[serde(default)]
    pub g: Vec<OverviewOdd>,
}

/// One priced outcome in the overview.
#[derive(Debug, Deserialize)]
pub struct OverviewOdd {
    /// Market/outcome code, e.g. `"KI_1"`, `"UG_V"`.
    pub n: String,
    /// Line, for markets that take one.
    #[serde(default)]
    pub h: Option<String>,
    /// Decimal price.
    pub o: Decimal,
}

// =============================================================================
// Adapter
// =============================================================================

pub struct SuperbetAdapter {
    fetcher: HttpFetcher,
    base_url: String,
    unmapped: AtomicU64,
}

impl SuperbetAdapter {
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
        headers.insert("Accept", HeaderValue::from_static("application/json"));

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

    fn parse_event(&self, event: OverviewEvent, sport: Sport) -> Option<RawMatch> {
        let [team1, team2] = event.e.as_slice() else {
            return None;
        };
        if team1.is_empty() || team2.is_empty() {
            return None;
        }
        let start_time = event.b.as_ref().and_then(parse::parse_timestamp)?;

        let mut rows = Vec::new();
        let mut unmapped = 0u64;
        let mut pending = markets::PairBuffer::default();

        for odd in &event.g {
            let Some(decoded) = markets::decode(sport, &odd.n) else {
                unmapped += 1;
                continue;
            };
            let line = odd
                .h
                .as_deref()
                .and_then(|h| Decimal::from_str(h.trim()).ok());
            pending.feed(decoded, line, odd.o, &mut rows);
        }
        pending.flush(&mut rows);
        self.unmapped.fetch_add(unmapped, Ordering::Relaxed);
        if unmapped > 0 {
            tracing::debug!(provider = "superbet", unmapped, "unmapped vendor markets dropped");
        }

        let rows: Vec<RawOdds> = rows
            .into_iter()
            .filter(|row| match validate_row(row) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(provider = "superbet", error = %err, "price row rejected");
                    false
                }
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        let mut raw = RawMatch::new(
            PROVIDER_ID,
            team1.clone(),
            team2.clone(),
            sport,
            start_time,
        )
        .with_external_id(event.d.to_string());
        raw.odds = rows;
        Some(raw)
    }
}

#[async_trait]
impl ProviderAdapter for SuperbetAdapter {
    fn provider_id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "superbet"
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
        let url = format!("{}/events/overview", self.base_url);
        let query = [
            ("currentStatus", "active".to_string()),
            ("offerState", "prematch".to_string()),
            ("sportId", sport_id(sport).to_string()),
        ];
        let response: OverviewResponse = self.fetcher.get_json(&url, &query).await?;

        Ok(response
            .data
            .into_iter()
            .filter_map(|event| self.parse_event(event, sport))
            .collect())
    }
}
