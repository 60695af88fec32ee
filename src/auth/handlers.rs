use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::dto::{LoginRequest, RegisterRequest, TokenResponse},
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(p)| p).map_err(|rejection| {
        warn!(error = %rejection, "unreadable request body");
        AuthError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    let token = state.auth.register(body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::success("User registered successfully", token)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = state.auth.login(body(payload)?).await?;
    Ok(Json(TokenResponse::success("Login successful", token)))
}
