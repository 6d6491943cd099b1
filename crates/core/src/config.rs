//! Application configuration.
//!
//! Loaded once at startup from `config/arbscan.toml` merged with
//! `ARBSCAN_`-prefixed environment variables. Configuration errors are the
//! only globally fatal errors in the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub arbitrage: ArbitrageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Cadence between cycles, seconds. A cycle may outlast it; the same
    /// provider is never run twice concurrently.
    pub interval_seconds: f64,
    /// Per-HTTP-request cap, seconds.
    pub request_timeout_seconds: u64,
    /// Per-provider in-flight request cap.
    pub max_concurrent_requests: usize,
    /// Subset of registered providers to run. Names from the registry.
    pub providers_enabled: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 2.0,
            request_timeout_seconds: 30,
            max_concurrent_requests: 10,
            providers_enabled: vec![
                "mozzart".to_string(),
                "maxbet".to_string(),
                "admiral".to_string(),
                "soccerbet".to_string(),
                "superbet".to_string(),
            ],
        }
    }
}

impl ScrapeConfig {
    /// Hard deadline for one cycle: twice the interval, floored so very
    /// short cadences still leave room for a full scrape.
    #[must_use]
    pub fn cycle_deadline(&self) -> std::time::Duration {
        let doubled = self.interval_seconds * 2.0;
        std::time::Duration::from_secs_f64(doubled.max(30.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/arbscan".to_string(),
            max_connections: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Weighted-score fallback threshold (0-100) for auto-merging two
    /// listings into one match. The fixed confidence tiers sit above it.
    pub match_similarity_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_similarity_threshold: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Publishing floor for detected opportunities, percent.
    pub min_profit_percentage: Decimal,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            min_profit_percentage: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the observability surface.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Retention windows. Configuration, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub odds_history_days: i64,
    pub matches_days: i64,
    pub arbitrage_days: i64,
    /// Cadence of the cleanup sweeper, seconds. Runs outside the hot loop.
    pub sweep_interval_seconds: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            odds_history_days: 7,
            matches_days: 30,
            arbitrage_days: 90,
            sweep_interval_seconds: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_contract() {
        let config = AppConfig::default();

        assert!((config.scrape.interval_seconds - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.scrape.request_timeout_seconds, 30);
        assert_eq!(config.scrape.max_concurrent_requests, 10);
        assert_eq!(config.scrape.providers_enabled.len(), 5);
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.arbitrage.min_profit_percentage, dec!(1));
        assert_eq!(config.retention.odds_history_days, 7);
        assert_eq!(config.retention.matches_days, 30);
    }

    #[test]
    fn test_cycle_deadline_floor() {
        let config = ScrapeConfig::default();
        // 2s cadence would give a 4s deadline, too tight for a full scrape.
        assert_eq!(config.cycle_deadline(), std::time::Duration::from_secs(30));

        let slow = ScrapeConfig {
            interval_seconds: 60.0,
            ..ScrapeConfig::default()
        };
        assert_eq!(slow.cycle_deadline(), std::time::Duration::from_secs(120));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scrape.providers_enabled, config.scrape.providers_enabled);
        assert_eq!(back.database.url, config.database.url);
    }
}
