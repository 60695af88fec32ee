use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(|| async { "Welcome to the Gatekeeper API!" }))
        .route("/health", get(|| async { "ok" }))
        .route("/dbstatus", get(db_status))
}

/// Probes the credential store.
pub async fn db_status(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.auth.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "backend": store.backend() })),
        ),
        Err(e) => {
            error!(error = %e, backend = store.backend(), "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "backend": store.backend(),
                    "message": "Database connection failed",
                })),
            )
        }
    }
}
