use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub observers: usize,
    pub version: String,
}

/// Liveness probe. `status` degrades when the backing store stops answering
/// pings, so a load balancer can drain the instance before requests fail.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<crate::AppState>) -> impl IntoResponse {
    let database_up = state.db.ping().await.is_ok();

    Json(HealthResponse {
        status: if database_up { "ok" } else { "degraded" }.to_string(),
        database: if database_up {
            "connected"
        } else {
            "disconnected"
        }
        .to_string(),
        observers: state.events.observer_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
