//! Idempotent schema bootstrap.
//!
//! Applied at startup; every statement is `IF NOT EXISTS` so a running
//! store is never disturbed. Reference tables (provider, sport, bet_type)
//! are re-seeded from the in-code registries on every boot, which is how
//! vocabulary additions ship.

use anyhow::Result;
use arbscan_core::{Sport, PROVIDERS};
use sqlx::PgPool;

const TABLES: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS provider (
        id       SMALLINT PRIMARY KEY,
        name     TEXT NOT NULL UNIQUE,
        enabled  BOOLEAN NOT NULL DEFAULT TRUE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS sport (
        id    SMALLINT PRIMARY KEY,
        name  TEXT NOT NULL UNIQUE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS bet_type (
        id     SMALLINT PRIMARY KEY,
        name   TEXT NOT NULL UNIQUE,
        arity  SMALLINT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS league (
        id         SERIAL PRIMARY KEY,
        name       TEXT NOT NULL,
        name_norm  TEXT NOT NULL,
        sport_id   SMALLINT NOT NULL REFERENCES sport(id),
        UNIQUE (name_norm, sport_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS matches (
        id            BIGSERIAL PRIMARY KEY,
        team1_raw     TEXT NOT NULL,
        team2_raw     TEXT NOT NULL,
        team1_norm    TEXT NOT NULL,
        team2_norm    TEXT NOT NULL,
        sport_id      SMALLINT NOT NULL REFERENCES sport(id),
        league_id     INTEGER REFERENCES league(id),
        start_time    TIMESTAMPTZ NOT NULL,
        external_ids  JSONB NOT NULL DEFAULT '{}'::jsonb,
        status        TEXT NOT NULL DEFAULT 'upcoming',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (team1_norm, team2_norm, sport_id, start_time)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS current_odds (
        match_id     BIGINT NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        provider_id  SMALLINT NOT NULL REFERENCES provider(id),
        bet_type_id  SMALLINT NOT NULL REFERENCES bet_type(id),
        margin       NUMERIC NOT NULL DEFAULT 0,
        selection    TEXT NOT NULL DEFAULT '',
        p1           NUMERIC NOT NULL,
        p2           NUMERIC,
        p3           NUMERIC,
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (match_id, provider_id, bet_type_id, margin, selection)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS odds_history (
        id           BIGSERIAL PRIMARY KEY,
        match_id     BIGINT NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        provider_id  SMALLINT NOT NULL,
        bet_type_id  SMALLINT NOT NULL,
        margin       NUMERIC NOT NULL DEFAULT 0,
        selection    TEXT NOT NULL DEFAULT '',
        p1           NUMERIC NOT NULL,
        p2           NUMERIC,
        p3           NUMERIC,
        observed_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS arbitrage (
        id            BIGSERIAL PRIMARY KEY,
        match_id      BIGINT NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        bet_type_id   SMALLINT NOT NULL,
        margin        NUMERIC NOT NULL DEFAULT 0,
        profit_pct    NUMERIC NOT NULL,
        best_legs     JSONB NOT NULL,
        stake_split   JSONB NOT NULL,
        content_hash  TEXT NOT NULL UNIQUE,
        detected_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        last_seen_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        expires_at    TIMESTAMPTZ NOT NULL,
        active        BOOLEAN NOT NULL DEFAULT TRUE
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_matches_sport_start
        ON matches (sport_id, start_time) WHERE status = 'upcoming'
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_odds_history_observed
        ON odds_history (observed_at)
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_arbitrage_active
        ON arbitrage (active) WHERE active
    ",
];

/// Applies DDL and seeds the reference tables.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn apply(pool: &PgPool) -> Result<()> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    for provider in PROVIDERS {
        sqlx::query(
            r"
            INSERT INTO provider (id, name, enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            ",
        )
        .bind(provider.id.0)
        .bind(provider.name)
        .bind(provider.enabled)
        .execute(pool)
        .await?;
    }

    for sport in Sport::ALL {
        sqlx::query(
            r"
            INSERT INTO sport (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            ",
        )
        .bind(sport.id())
        .bind(sport.name())
        .execute(pool)
        .await?;
    }

    for def in arbscan_codec::BET_TYPES {
        sqlx::query(
            r"
            INSERT INTO bet_type (id, name, arity)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, arity = EXCLUDED.arity
            ",
        )
        .bind(def.id.0)
        .bind(def.name)
        .bind(def.arity.price_count() as i16)
        .execute(pool)
        .await?;
    }

    tracing::info!("schema bootstrap complete");
    Ok(())
}
