//! Retention sweeper. Runs on its own slow cadence, outside the scrape
//! hot loop.

use anyhow::Result;
use arbscan_core::RetentionConfig;
use sqlx::PgPool;

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SweepStats {
    pub matches_finished: u64,
    pub history_deleted: u64,
    pub matches_deleted: u64,
    pub arbitrage_deactivated: u64,
}

/// Periodic cleanup of finished matches, old history, and stale rows.
#[derive(Debug, Clone)]
pub struct Sweeper {
    pool: PgPool,
    retention: RetentionConfig,
}

impl Sweeper {
    #[must_use]
    pub fn new(pool: PgPool, retention: RetentionConfig) -> Self {
        Self { pool, retention }
    }

    /// One cleanup pass: advance match status, trim history, hard-delete
    /// aged matches (cascading to their odds), retire old arbitrage rows.
    ///
    /// # Errors
    /// Returns an error if any statement fails; the next pass retries.
    pub async fn run_once(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();

        // Matches are finished four hours after kick-off.
        stats.matches_finished = sqlx::query(
            r"
            UPDATE matches
            SET status = 'finished', updated_at = NOW()
            WHERE status = 'upcoming' AND start_time < NOW() - INTERVAL '4 hours'
            ",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        stats.history_deleted = sqlx::query(
            "DELETE FROM odds_history WHERE observed_at < NOW() - make_interval(days => $1)",
        )
        .bind(self.retention.odds_history_days as i32)
        .execute(&self.pool)
        .await?
        .rows_affected();

        // Cascades to current_odds and arbitrage via the foreign keys.
        stats.matches_deleted = sqlx::query(
            "DELETE FROM matches WHERE start_time < NOW() - make_interval(days => $1)",
        )
        .bind(self.retention.matches_days as i32)
        .execute(&self.pool)
        .await?
        .rows_affected();

        stats.arbitrage_deactivated = sqlx::query(
            r"
            UPDATE arbitrage
            SET active = FALSE
            WHERE active AND detected_at < NOW() - make_interval(days => $1)
            ",
        )
        .bind(self.retention.arbitrage_days as i32)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(
            finished = stats.matches_finished,
            history_deleted = stats.history_deleted,
            matches_deleted = stats.matches_deleted,
            arbitrage_deactivated = stats.arbitrage_deactivated,
            "retention sweep complete"
        );

        Ok(stats)
    }

    /// Runs the sweeper forever on its configured cadence.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
            self.retention.sweep_interval_seconds.max(1),
        ));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                tracing::warn!(error = %err, "retention sweep failed");
            }
        }
    }
}
