//! Observability surface for the external API collaborator.
//!
//! Two routes: `/health` and `/stats`. The public client-facing API lives
//! elsewhere; this surface only exposes the pipeline's own counters.

pub mod handlers;
pub mod server;

pub use server::ApiServer;
