//! MaxBet adapter.
//!
//! Flat-platform shape: a league-list endpoint, a per-league match list,
//! and a per-match detail carrying a flat `odds` code→price dict plus a
//! `params` dict with the lines. Handicap params arrive in the negated
//! sign convention and are folded to canonical (positive = home
//! advantage) on the way through.

pub mod client;
pub mod markets;

use arbscan_codec::{fold_negated_handicap, reroute_goal_range, validate_row};
use arbscan_core::{
    parse, AdapterCounters, ProviderAdapter, ProviderError, ProviderId, RawMatch, RawOdds,
    ScrapeConfig, Sport,
};
use async_trait::async_trait;
use client::{MatchDetail, MaxbetClient};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

pub const PROVIDER_ID: ProviderId = ProviderId(3);

const SUPPORTED: [Sport; 5] = [
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::Hockey,
    Sport::TableTennis,
];

pub struct MaxbetAdapter {
    client: MaxbetClient,
    unmapped: AtomicU64,
}

impl MaxbetAdapter {
    /// Builds the adapter from scrape configuration.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` on HTTP client failure.
    pub fn new(scrape: &ScrapeConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: MaxbetClient::new(scrape)?,
            unmapped: AtomicU64::new(0),
        })
    }

    /// Test constructor pointing at a mock upstream.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` on HTTP client failure.
    pub fn with_base_url(scrape: &ScrapeConfig, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: MaxbetClient::with_base_url(scrape, base_url)?,
            unmapped: AtomicU64::new(0),
        })
    }

    fn parse_match(&self, detail: MatchDetail, sport: Sport) -> Option<RawMatch> {
        if detail.home.is_empty() || detail.away.is_empty() {
            return None;
        }
        let start_time = detail
            .kick_off_time
            .as_ref()
            .and_then(parse::parse_timestamp)?;

        let mut raw = RawMatch::new(PROVIDER_ID, detail.home.clone(), detail.away.clone(), sport, start_time)
            .with_external_id(detail.id.to_string());
        if let Some(league) = detail.league_name.clone().filter(|l| !l.is_empty()) {
            raw = raw.with_league(league);
        }

        raw.odds = self.parse_odds(&detail, sport);
        if raw.odds.is_empty() {
            return None;
        }
        Some(raw)
    }

    fn parse_odds(&self, detail: &MatchDetail, sport: Sport) -> Vec<RawOdds> {
        let mut ctx = ParseCtx::new(&detail.odds, &detail.params);

        match sport {
            Sport::Football => {
                ctx.three_way(markets::FOOTBALL_3WAY);
                ctx.two_way(markets::FOOTBALL_2WAY);
                ctx.fixed_totals(markets::FOOTBALL_FIXED_TOTALS);
                ctx.param_totals(markets::FOOTBALL_PARAM_TOTALS);
                ctx.param_handicaps_3way(markets::FOOTBALL_PARAM_HANDICAPS_3WAY);
                ctx.param_handicaps_2way(markets::FOOTBALL_PARAM_HANDICAPS_2WAY);
                ctx.selections(markets::FOOTBALL_SELECTIONS);
            }
            Sport::Basketball => {
                ctx.two_way(markets::BASKETBALL_2WAY);
                ctx.param_handicaps_2way(markets::BASKETBALL_PARAM_HANDICAPS);
                ctx.param_totals(markets::BASKETBALL_PARAM_TOTALS);
            }
            Sport::Tennis => {
                ctx.two_way(markets::TENNIS_2WAY);
                ctx.three_way(markets::TENNIS_3WAY);
                ctx.param_totals(markets::TENNIS_PARAM_TOTALS);
                ctx.param_handicaps_2way(markets::TENNIS_PARAM_HANDICAPS);
                ctx.selections(markets::TENNIS_SELECTIONS);
            }
            Sport::Hockey => {
                ctx.three_way(markets::HOCKEY_3WAY);
                ctx.two_way(markets::HOCKEY_2WAY);
                ctx.param_totals(markets::HOCKEY_PARAM_TOTALS);
                ctx.param_handicaps_2way(markets::HOCKEY_PARAM_HANDICAPS);
                ctx.selections(markets::HOCKEY_SELECTIONS);
            }
            Sport::TableTennis => {
                ctx.two_way(markets::TABLE_TENNIS_2WAY);
            }
        }

        let (rows, unmapped) = ctx.finish("maxbet");
        self.unmapped.fetch_add(unmapped, Ordering::Relaxed);
        rows
    }
}

#[async_trait]
impl ProviderAdapter for MaxbetAdapter {
    fn provider_id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "maxbet"
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn supported_sports(&self) -> &[Sport] {
        &SUPPORTED
    }

    fn counters(&self) -> AdapterCounters {
        AdapterCounters {
            requests: self.client.fetcher().request_count(),
            errors: self.client.fetcher().error_count(),
            unmapped_markets: self.unmapped.load(Ordering::Relaxed),
        }
    }

    async fn scrape_sport(&self, sport: Sport) -> Result<Vec<RawMatch>, ProviderError> {
        let leagues = self.client.fetch_leagues(sport).await?;

        let league_lists = join_all(
            leagues
                .iter()
                .map(|l| self.client.fetch_league_matches(sport, l.id)),
        )
        .await;

        let mut match_ids = Vec::new();
        for list in league_lists.into_iter().flatten() {
            for summary in list {
                if summary.league_name.contains("Bonus Tip")
                    || summary.league_name.contains("Max Bonus")
                {
                    continue;
                }
                match_ids.push(summary.id);
            }
        }

        let details = join_all(match_ids.iter().map(|&id| self.client.fetch_match_detail(id))).await;

        let mut matches = Vec::new();
        for detail in details {
            match detail {
                Ok(detail) => {
                    if let Some(raw) = self.parse_match(detail, sport) {
                        matches.push(raw);
                    }
                }
                Err(err) => {
                    tracing::debug!(provider = "maxbet", error = %err, "match detail dropped");
                }
            }
        }

        Ok(matches)
    }
}

// =============================================================================
// Flat-dict parsing
// =============================================================================

/// Parse context over one match's flat odds/params dicts. Tracks which
/// codes the tables consumed so leftovers can be reported as unmapped.
pub(crate) struct ParseCtx<'a> {
    odds: &'a HashMap<String, Decimal>,
    params: &'a HashMap<String, serde_json::Value>,
    out: Vec<RawOdds>,
    consumed: HashSet<&'a str>,
}

impl<'a> ParseCtx<'a> {
    fn new(
        odds: &'a HashMap<String, Decimal>,
        params: &'a HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            odds,
            params,
            out: Vec::new(),
            consumed: HashSet::new(),
        }
    }

    fn price(&mut self, code: &'a str) -> Option<Decimal> {
        let value = self.odds.get(code).copied()?;
        self.consumed.insert(code);
        Some(value)
    }

    fn param(&self, key: &str) -> Option<Decimal> {
        match self.params.get(key)? {
            serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            _ => None,
        }
    }

    fn three_way(&mut self, table: &'a [markets::ThreeWay]) {
        for entry in table {
            let [c1, c2, c3] = entry.codes;
            if self.odds.contains_key(c1)
                && self.odds.contains_key(c2)
                && self.odds.contains_key(c3)
            {
                let p1 = self.price(c1).unwrap_or_default();
                let p2 = self.price(c2).unwrap_or_default();
                let p3 = self.price(c3).unwrap_or_default();
                self.out
                    .push(RawOdds::three_way(entry.bet_type, p1, p2, p3, Decimal::ZERO));
            }
        }
    }

    fn two_way(&mut self, table: &'a [markets::TwoWay]) {
        for entry in table {
            let [c1, c2] = entry.codes;
            if self.odds.contains_key(c1) && self.odds.contains_key(c2) {
                let p1 = self.price(c1).unwrap_or_default();
                let p2 = self.price(c2).unwrap_or_default();
                self.out
                    .push(RawOdds::two_way(entry.bet_type, p1, p2, Decimal::ZERO));
            }
        }
    }

    fn fixed_totals(&mut self, table: &'a [markets::FixedTotal]) {
        for entry in table {
            if self.odds.contains_key(entry.under) && self.odds.contains_key(entry.over) {
                let under = self.price(entry.under).unwrap_or_default();
                let over = self.price(entry.over).unwrap_or_default();
                self.out
                    .push(RawOdds::two_way(entry.bet_type, under, over, entry.margin));
            }
        }
    }

    fn param_totals(&mut self, table: &'a [markets::ParamTotal]) {
        for entry in table {
            if self.odds.contains_key(entry.under) && self.odds.contains_key(entry.over) {
                if let Some(margin) = self.param(entry.param) {
                    let under = self.price(entry.under).unwrap_or_default();
                    let over = self.price(entry.over).unwrap_or_default();
                    self.out
                        .push(RawOdds::two_way(entry.bet_type, under, over, margin));
                }
            }
        }
    }

    fn param_handicaps_2way(&mut self, table: &'a [markets::ParamHandicap2]) {
        for entry in table {
            if self.odds.contains_key(entry.home) && self.odds.contains_key(entry.away) {
                if let Some(line) = self.param(entry.param) {
                    let home = self.price(entry.home).unwrap_or_default();
                    let away = self.price(entry.away).unwrap_or_default();
                    self.out.push(RawOdds::two_way(
                        entry.bet_type,
                        home,
                        away,
                        fold_negated_handicap(line),
                    ));
                }
            }
        }
    }

    fn param_handicaps_3way(&mut self, table: &'a [markets::ParamHandicap3]) {
        for entry in table {
            if self.odds.contains_key(entry.home)
                && self.odds.contains_key(entry.draw)
                && self.odds.contains_key(entry.away)
            {
                if let Some(line) = self.param(entry.param) {
                    let home = self.price(entry.home).unwrap_or_default();
                    let draw = self.price(entry.draw).unwrap_or_default();
                    let away = self.price(entry.away).unwrap_or_default();
                    self.out.push(RawOdds::three_way(
                        entry.bet_type,
                        home,
                        draw,
                        away,
                        fold_negated_handicap(line),
                    ));
                }
            }
        }
    }

    fn selections(&mut self, table: &'a [markets::SelectionMarket]) {
        for market in table {
            for (code, selection) in market.codes {
                if let Some(price) = self.price(code) {
                    let (bet_type, selection) = reroute_goal_range(market.bet_type, selection);
                    self.out.push(RawOdds::selection(bet_type, selection, price));
                }
            }
        }
    }

    /// Validates the parsed rows and reports how many vendor codes nothing
    /// consumed.
    fn finish(self, provider: &str) -> (Vec<RawOdds>, u64) {
        let unmapped = self
            .odds
            .keys()
            .filter(|code| !self.consumed.contains(code.as_str()))
            .count() as u64;
        if unmapped > 0 {
            tracing::debug!(provider, unmapped, "unmapped vendor markets dropped");
        }

        let rows = self
            .out
            .into_iter()
            .filter(|row| match validate_row(row) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(provider, error = %err, "price row rejected");
                    false
                }
            })
            .collect();

        (rows, unmapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbscan_core::BetTypeId;
    use rust_decimal_macros::dec;

    fn odds(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        entries
            .iter()
            .map(|(code, price)| ((*code).to_string(), *price))
            .collect()
    }

    fn params(entries: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    // ==================== Flat-Dict Parsing Tests ====================

    #[test]
    fn test_parse_1x2_and_totals() {
        let odds = odds(&[
            ("1", dec!(2.10)),
            ("2", dec!(3.40)),
            ("3", dec!(3.60)),
            ("22", dec!(1.85)),
            ("24", dec!(1.95)),
        ]);
        let params = params(&[]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.three_way(markets::FOOTBALL_3WAY);
        ctx.fixed_totals(markets::FOOTBALL_FIXED_TOTALS);
        let (rows, unmapped) = ctx.finish("maxbet");

        assert_eq!(rows.len(), 2);
        assert_eq!(unmapped, 0);

        let result = rows.iter().find(|r| r.bet_type == BetTypeId(2)).unwrap();
        assert_eq!(result.p1, dec!(2.10));
        assert_eq!(result.p3, Some(dec!(3.60)));

        let total = rows.iter().find(|r| r.bet_type == BetTypeId(5)).unwrap();
        assert_eq!(total.margin, dec!(2.5));
        assert_eq!(total.p1, dec!(1.85));
    }

    #[test]
    fn test_param_handicap_sign_folds_to_home_positive() {
        // Platform reports -1.0; canonical is +1.0 (home advantage).
        let odds = odds(&[("50458", dec!(1.70)), ("50459", dec!(2.10))]);
        let params = params(&[("handicapOvertime", serde_json::json!("-1.0"))]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.param_handicaps_2way(markets::BASKETBALL_PARAM_HANDICAPS);
        let (rows, _) = ctx.finish("maxbet");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(9));
        assert_eq!(rows[0].margin, dec!(1.0));
        assert_eq!(rows[0].p1, dec!(1.70));
    }

    #[test]
    fn test_selection_markets_and_htft() {
        let odds = odds(&[("10", dec!(4.80)), ("52", dec!(7.50))]);
        let params = params(&[]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.selections(markets::FOOTBALL_SELECTIONS);
        let (rows, _) = ctx.finish("maxbet");

        let htft = rows.iter().find(|r| r.bet_type == BetTypeId(24)).unwrap();
        assert_eq!(htft.selection, "1/1");

        let score = rows.iter().find(|r| r.bet_type == BetTypeId(23)).unwrap();
        assert_eq!(score.selection, "1:0");
    }

    #[test]
    fn test_exact_goal_codes_reroute_to_t_prefix() {
        let odds = odds(&[("320", dec!(6.50))]);
        let params = params(&[]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.selections(markets::FOOTBALL_SELECTIONS);
        let (rows, _) = ctx.finish("maxbet");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bet_type, BetTypeId(26));
        assert_eq!(rows[0].selection, "T1");
    }

    #[test]
    fn test_unknown_codes_counted_not_errored() {
        let odds = odds(&[("1", dec!(2.10)), ("99999", dec!(1.50))]);
        let params = params(&[]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.three_way(markets::FOOTBALL_3WAY);
        let (rows, unmapped) = ctx.finish("maxbet");

        // Incomplete 1X2 (only one code) yields nothing; the stray code is
        // unmapped, and nothing is an error.
        assert!(rows.is_empty());
        assert_eq!(unmapped, 2);
    }

    #[test]
    fn test_param_missing_drops_market() {
        let odds = odds(&[("50444", dec!(1.90)), ("50445", dec!(1.90))]);
        let params = params(&[]);
        let mut ctx = ParseCtx::new(&odds, &params);
        ctx.param_totals(markets::BASKETBALL_PARAM_TOTALS);
        let (rows, _) = ctx.finish("maxbet");
        assert!(rows.is_empty());
    }

    // ==================== Adapter Contract Tests ====================

    #[tokio::test]
    async fn test_scrape_sport_against_mock_upstream() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/categories/sport/S/l"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "categories": [
                    {"id": 100, "name": "Premier League"},
                    {"id": 101, "name": "Max Bonus Tip"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/sport/S/league/100/mob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esMatches": [{"id": 555, "leagueName": "Premier League"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/match/555"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 555,
                "home": "Arsenal",
                "away": "Chelsea",
                "kickOffTime": 1_770_000_000_000i64,
                "leagueName": "Premier League",
                "odds": {"1": 2.10, "2": 3.40, "3": 3.60},
                "params": {}
            })))
            .mount(&server)
            .await;

        let adapter =
            MaxbetAdapter::with_base_url(&ScrapeConfig::default(), &server.uri()).unwrap();
        let matches = adapter.scrape_sport(Sport::Football).await.unwrap();

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.team1, "Arsenal");
        assert_eq!(m.external_id.as_deref(), Some("555"));
        assert_eq!(m.odds.len(), 1);
        assert_eq!(m.odds[0].bet_type, BetTypeId(2));
    }
}
