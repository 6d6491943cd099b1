//! Relational store access: connection pool, schema bootstrap, bulk
//! repositories, and the retention sweeper.
//!
//! Only this crate writes the odds tables. Per-row round-trips are a design
//! violation here; every write path is batched.

pub mod database;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod sweeper;

pub use database::DatabaseClient;
pub use models::{MatchKey, MatchUpsert, OddsWrite, OddsWriteOutcome};
pub use repositories::{ArbitrageRepository, MatchRepository, OddsRepository};
pub use sweeper::{SweepStats, Sweeper};
