//! Current-odds and odds-history storage.
//!
//! One provider batch costs exactly two statements inside one transaction:
//! the conditional upsert into `current_odds` and the append into
//! `odds_history`. The upsert only rewrites rows whose prices actually
//! moved, so replaying an identical batch leaves `current_odds`
//! byte-identical while history still records every observation.

use crate::models::{dedupe_odds, OddsWrite, OddsWriteOutcome};
use anyhow::Result;
use arbscan_arbitrage::OddsSnapshotRow;
use arbscan_core::{BetTypeId, ProviderId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Repository for the odds tables.
#[derive(Debug, Clone)]
pub struct OddsRepository {
    pool: PgPool,
}

impl OddsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Writes one provider's odds batch: dedupe by the five-tuple, upsert
    /// `current_odds`, append `odds_history`.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; the provider's cycle is
    /// then retried from scratch next cycle.
    pub async fn bulk_upsert(&self, rows: Vec<OddsWrite>) -> Result<OddsWriteOutcome> {
        let (rows, deduped) = dedupe_odds(rows);
        if rows.is_empty() {
            return Ok(OddsWriteOutcome {
                deduped,
                ..OddsWriteOutcome::default()
            });
        }

        let mut match_ids = Vec::with_capacity(rows.len());
        let mut provider_ids = Vec::with_capacity(rows.len());
        let mut bet_type_ids = Vec::with_capacity(rows.len());
        let mut margins = Vec::with_capacity(rows.len());
        let mut selections = Vec::with_capacity(rows.len());
        let mut p1s = Vec::with_capacity(rows.len());
        let mut p2s: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());
        let mut p3s: Vec<Option<Decimal>> = Vec::with_capacity(rows.len());

        for row in &rows {
            match_ids.push(row.match_id);
            provider_ids.push(row.provider.0);
            bet_type_ids.push(row.bet_type.0);
            margins.push(row.margin.normalize());
            selections.push(row.selection.clone());
            p1s.push(row.p1);
            p2s.push(row.p2);
            p3s.push(row.p3);
        }

        let mut tx = self.pool.begin().await?;

        // Conditional upsert: untouched when prices did not move, so the
        // RETURNING set is exactly the inserts plus real changes.
        let changed: Vec<(i64,)> = sqlx::query_as(
            r"
            INSERT INTO current_odds
                (match_id, provider_id, bet_type_id, margin, selection, p1, p2, p3)
            SELECT *
            FROM unnest(
                $1::int8[], $2::int2[], $3::int2[], $4::numeric[],
                $5::text[], $6::numeric[], $7::numeric[], $8::numeric[]
            )
            ON CONFLICT (match_id, provider_id, bet_type_id, margin, selection) DO UPDATE SET
                p1 = EXCLUDED.p1,
                p2 = EXCLUDED.p2,
                p3 = EXCLUDED.p3,
                updated_at = NOW()
            WHERE (current_odds.p1, current_odds.p2, current_odds.p3)
                  IS DISTINCT FROM (EXCLUDED.p1, EXCLUDED.p2, EXCLUDED.p3)
            RETURNING match_id
            ",
        )
        .bind(&match_ids)
        .bind(&provider_ids)
        .bind(&bet_type_ids)
        .bind(&margins)
        .bind(&selections)
        .bind(&p1s)
        .bind(&p2s)
        .bind(&p3s)
        .fetch_all(&mut *tx)
        .await?;

        // Every observation lands in history, changed or not.
        sqlx::query(
            r"
            INSERT INTO odds_history
                (match_id, provider_id, bet_type_id, margin, selection, p1, p2, p3)
            SELECT *
            FROM unnest(
                $1::int8[], $2::int2[], $3::int2[], $4::numeric[],
                $5::text[], $6::numeric[], $7::numeric[], $8::numeric[]
            )
            ",
        )
        .bind(&match_ids)
        .bind(&provider_ids)
        .bind(&bet_type_ids)
        .bind(&margins)
        .bind(&selections)
        .bind(&p1s)
        .bind(&p2s)
        .bind(&p3s)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut changed_matches: Vec<i64> = changed.into_iter().map(|(id,)| id).collect();
        changed_matches.sort_unstable();
        changed_matches.dedup();

        Ok(OddsWriteOutcome {
            written: rows.len(),
            deduped,
            changed_matches,
        })
    }

    /// Snapshot of all current odds for matches that have not started, for
    /// the detector.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_snapshot(&self, now: DateTime<Utc>) -> Result<Vec<OddsSnapshotRow>> {
        let rows: Vec<(
            i64,
            i16,
            i16,
            Decimal,
            String,
            Decimal,
            Option<Decimal>,
            Option<Decimal>,
            DateTime<Utc>,
        )> = sqlx::query_as(
            r"
            SELECT co.match_id, co.provider_id, co.bet_type_id, co.margin,
                   co.selection, co.p1, co.p2, co.p3, m.start_time
            FROM current_odds co
            JOIN matches m ON m.id = co.match_id
            WHERE m.status = 'upcoming' AND m.start_time > $1
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(match_id, provider, bet_type, margin, selection, p1, p2, p3, match_start)| {
                    OddsSnapshotRow {
                        match_id,
                        provider: ProviderId(provider),
                        bet_type: BetTypeId(bet_type),
                        margin,
                        selection,
                        p1,
                        p2,
                        p3,
                        match_start,
                    }
                },
            )
            .collect())
    }

    /// Current-odds row count, for the stats surface.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn current_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM current_odds")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
