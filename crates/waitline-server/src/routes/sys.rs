//! System routes: `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub vendor: &'static str,
    /// False when no API key resolved at boot — the process is healthy but
    /// the signup endpoints return 503.
    pub subscriptions_enabled: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        vendor: state.vendor,
        subscriptions_enabled: state.client.is_ok(),
    })
}
