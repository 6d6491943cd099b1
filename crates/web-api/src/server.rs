use crate::handlers;
use arbscan_orchestrator::Scheduler;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP server for the stats surface.
pub struct ApiServer {
    scheduler: Arc<Scheduler>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Builds the router.
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/stats", get(handlers::stats))
            .with_state(self.scheduler.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Serves until the process exits.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind or serve.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "stats surface listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
