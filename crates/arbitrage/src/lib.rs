//! Cross-provider match identity and arbitrage detection.
//!
//! Two concerns live here because they share one world-view: the resolver
//! decides when two providers' listings are the same real-world event, and
//! the detector combines the best prices across providers for each
//! canonical market of a resolved match.

pub mod detector;
pub mod matcher;
pub mod types;

pub use detector::{ArbitrageDetector, DetectorConfig};
pub use matcher::{MatchResolver, MatchScore, ResolverConfig, Resolution};
pub use types::{CandidateMatch, Leg, OddsSnapshotRow, Opportunity};
