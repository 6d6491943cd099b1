//! Orchestration: the scrape scheduler, the per-cycle pipeline, the event
//! publisher, and the stats surface.

pub mod context;
pub mod publisher;
pub mod scheduler;
pub mod stats;

pub use context::{build_adapters, Core};
pub use publisher::{EventKind, OutboundEvent, Publisher, Subscription};
pub use scheduler::Scheduler;
pub use stats::{PipelineStats, StatsSnapshot};
