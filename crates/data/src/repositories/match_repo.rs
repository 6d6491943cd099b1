//! Match storage: bulk upsert and resolver candidate queries.

use crate::models::{MatchKey, MatchUpsert};
use anyhow::Result;
use arbscan_arbitrage::CandidateMatch;
use arbscan_core::Sport;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

/// Repository for match rows.
#[derive(Debug, Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk-upserts a provider's resolved matches in one round trip.
    ///
    /// New matches are inserted; conflicts on the unique key merge the
    /// provider's external id into the stored map and keep the earliest
    /// league assignment. League rows are folded in through a CTE so the
    /// whole operation stays a single statement. Returns the assigned ids
    /// keyed by the unique match key.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn bulk_upsert(
        &self,
        batch: &[MatchUpsert],
    ) -> Result<HashMap<MatchKey, i64>> {
        if batch.is_empty() {
            return Ok(HashMap::new());
        }

        let mut team1_raw = Vec::with_capacity(batch.len());
        let mut team2_raw = Vec::with_capacity(batch.len());
        let mut team1_norm = Vec::with_capacity(batch.len());
        let mut team2_norm = Vec::with_capacity(batch.len());
        let mut sport_ids = Vec::with_capacity(batch.len());
        let mut start_times = Vec::with_capacity(batch.len());
        let mut external_ids = Vec::with_capacity(batch.len());
        let mut league_names: Vec<Option<String>> = Vec::with_capacity(batch.len());
        let mut league_norms: Vec<Option<String>> = Vec::with_capacity(batch.len());

        for m in batch {
            team1_raw.push(m.team1_raw.clone());
            team2_raw.push(m.team2_raw.clone());
            team1_norm.push(m.team1_norm.clone());
            team2_norm.push(m.team2_norm.clone());
            sport_ids.push(m.sport.id());
            start_times.push(m.start_time);
            external_ids.push(m.external_ids_json());
            league_names.push(m.league.as_ref().map(|(raw, _)| raw.clone()));
            league_norms.push(m.league.as_ref().map(|(_, norm)| norm.clone()));
        }

        let rows: Vec<(i64, String, String, i16, DateTime<Utc>)> = sqlx::query_as(
            r"
            WITH input AS (
                SELECT *
                FROM unnest(
                    $1::text[], $2::text[], $3::text[], $4::text[],
                    $5::int2[], $6::timestamptz[], $7::jsonb[],
                    $8::text[], $9::text[]
                ) AS t(
                    team1_raw, team2_raw, team1_norm, team2_norm,
                    sport_id, start_time, external_ids,
                    league_name, league_norm
                )
            ),
            league_rows AS (
                INSERT INTO league (name, name_norm, sport_id)
                SELECT DISTINCT ON (league_norm, sport_id) league_name, league_norm, sport_id
                FROM input
                WHERE league_norm IS NOT NULL AND league_norm <> ''
                ORDER BY league_norm, sport_id, league_name
                ON CONFLICT (name_norm, sport_id) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, name_norm, sport_id
            )
            INSERT INTO matches (
                team1_raw, team2_raw, team1_norm, team2_norm,
                sport_id, league_id, start_time, external_ids
            )
            SELECT
                i.team1_raw, i.team2_raw, i.team1_norm, i.team2_norm,
                i.sport_id, l.id, i.start_time, i.external_ids
            FROM input i
            LEFT JOIN league_rows l
                ON l.name_norm = i.league_norm AND l.sport_id = i.sport_id
            ON CONFLICT (team1_norm, team2_norm, sport_id, start_time) DO UPDATE SET
                updated_at = NOW(),
                external_ids = matches.external_ids || EXCLUDED.external_ids,
                league_id = COALESCE(matches.league_id, EXCLUDED.league_id)
            RETURNING id, team1_norm, team2_norm, sport_id, start_time
            ",
        )
        .bind(&team1_raw)
        .bind(&team2_raw)
        .bind(&team1_norm)
        .bind(&team2_norm)
        .bind(&sport_ids)
        .bind(&start_times)
        .bind(&external_ids)
        .bind(&league_names)
        .bind(&league_norms)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = HashMap::with_capacity(rows.len());
        for (id, t1, t2, sport_id, start_time) in rows {
            if let Some(sport) = Sport::from_id(sport_id) {
                ids.insert(
                    MatchKey {
                        team1_norm: t1,
                        team2_norm: t2,
                        sport,
                        start_time,
                    },
                    id,
                );
            }
        }
        Ok(ids)
    }

    /// Upcoming matches of one sport inside a start-time window, for the
    /// fuzzy resolver.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_candidates(
        &self,
        sport: Sport,
        around: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<CandidateMatch>> {
        let rows: Vec<(
            i64,
            String,
            String,
            String,
            String,
            i16,
            Option<String>,
            DateTime<Utc>,
        )> = sqlx::query_as(
            r"
            SELECT m.id, m.team1_raw, m.team2_raw, m.team1_norm, m.team2_norm,
                   m.sport_id, l.name_norm, m.start_time
            FROM matches m
            LEFT JOIN league l ON l.id = m.league_id
            WHERE m.sport_id = $1
              AND m.status = 'upcoming'
              AND m.start_time BETWEEN $2 AND $3
            ",
        )
        .bind(sport.id())
        .bind(around - window)
        .bind(around + window)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(
                |(id, team1, team2, team1_norm, team2_norm, sport_id, league_norm, start_time)| {
                    Some(CandidateMatch {
                        id,
                        team1,
                        team2,
                        team1_norm,
                        team2_norm,
                        sport: Sport::from_id(sport_id)?,
                        league_norm,
                        start_time,
                    })
                },
            )
            .collect())
    }

    /// Upcoming-match count, for the stats surface.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upcoming_count(&self) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM matches WHERE status = 'upcoming'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
