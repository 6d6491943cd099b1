use arbscan_orchestrator::{Scheduler, StatsSnapshot};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Pipeline counters: cycles, per-provider requests/errors/unmapped, odds
/// written, skips, arbitrage found/expired, publisher drops.
pub async fn stats(State(scheduler): State<Arc<Scheduler>>) -> Json<StatsSnapshot> {
    Json(scheduler.snapshot())
}
