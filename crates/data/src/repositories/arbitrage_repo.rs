//! Arbitrage row storage: insert-by-hash, expiry, staleness.

use anyhow::Result;
use arbscan_arbitrage::Opportunity;
use arbscan_core::BetTypeId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// A deactivated opportunity, fed back to the publisher as
/// `arbitrage.expired`.
#[derive(Debug, Clone)]
pub struct ClosedArbitrage {
    pub id: i64,
    pub match_id: i64,
    pub bet_type: BetTypeId,
    pub margin: Decimal,
    pub profit_pct: Decimal,
}

/// Repository for arbitrage rows.
#[derive(Debug, Clone)]
pub struct ArbitrageRepository {
    pool: PgPool,
}

impl ArbitrageRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records an opportunity by content hash.
    ///
    /// First detection inserts a row; re-detection of an unchanged
    /// opportunity only refreshes `last_seen_at`. Returns `true` when the
    /// row is new, which is the publisher's cue. Leg and stake blobs are
    /// serialized here; the engine never deals in JSON.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn record(&self, opp: &Opportunity) -> Result<bool> {
        let (inserted,): (bool,) = sqlx::query_as(
            r"
            INSERT INTO arbitrage
                (match_id, bet_type_id, margin, profit_pct, best_legs,
                 stake_split, content_hash, detected_at, expires_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            ON CONFLICT (content_hash) DO UPDATE SET
                last_seen_at = NOW(),
                active = TRUE
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(opp.match_id)
        .bind(opp.bet_type.0)
        .bind(opp.margin.normalize())
        .bind(opp.profit_pct)
        .bind(serde_json::to_value(&opp.legs)?)
        .bind(serde_json::to_value(&opp.stakes)?)
        .bind(&opp.content_hash)
        .bind(opp.detected_at)
        .bind(opp.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Deactivates opportunities whose match has started.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<ClosedArbitrage>> {
        let rows: Vec<(i64, i64, i16, Decimal, Decimal)> = sqlx::query_as(
            r"
            UPDATE arbitrage
            SET active = FALSE
            WHERE active AND expires_at <= $1
            RETURNING id, match_id, bet_type_id, margin, profit_pct
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_closed).collect())
    }

    /// Deactivates still-running opportunities whose legs no longer clear
    /// the profitability bar: any active row for an upcoming match whose
    /// hash the current detection pass did not produce.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn close_stale(
        &self,
        live_hashes: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<ClosedArbitrage>> {
        let rows: Vec<(i64, i64, i16, Decimal, Decimal)> = sqlx::query_as(
            r"
            UPDATE arbitrage
            SET active = FALSE
            WHERE active
              AND expires_at > $1
              AND content_hash <> ALL($2)
            RETURNING id, match_id, bet_type_id, margin, profit_pct
            ",
        )
        .bind(now)
        .bind(live_hashes)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_closed).collect())
    }

    /// Active-opportunity count, for the stats surface.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn active_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM arbitrage WHERE active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn into_closed(row: (i64, i64, i16, Decimal, Decimal)) -> ClosedArbitrage {
    let (id, match_id, bet_type, margin, profit_pct) = row;
    ClosedArbitrage {
        id,
        match_id,
        bet_type: BetTypeId(bet_type),
        margin,
        profit_pct,
    }
}
