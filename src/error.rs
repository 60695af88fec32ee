use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::{jwt::TokenError, password::PasswordError, repo::StoreError};

/// Outcome of a failed register, login or authorize call.
///
/// Internal variants carry detail for the logs only; clients see a fixed message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("username or email already registered")]
    DuplicateUser,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("password hashing failure: {0}")]
    Hashing(#[from] PasswordError),
    #[error("token signing failure: {0}")]
    Signing(TokenError),
    #[error("unauthorized")]
    Unauthorized,
}

impl AuthError {
    /// Stable identifier exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::DuplicateUser => "duplicate_user",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Store(_) => "store_error",
            AuthError::Hashing(_) => "hashing_error",
            AuthError::Signing(_) => "signing_error",
            AuthError::Unauthorized => "unauthorized",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Hashing(_) | AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::DuplicateUser => "Username or email already registered".into(),
            AuthError::InvalidCredentials => "Invalid credentials".into(),
            AuthError::Store(_) => "Service temporarily unavailable".into(),
            AuthError::Hashing(_) | AuthError::Signing(_) => "Internal server error".into(),
            AuthError::Unauthorized => "Invalid or expired token".into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.public_message(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AuthError::Signing(TokenError::Signing("hmac blew up".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("hmac"));

        let err = AuthError::Store(StoreError::Timeout);
        assert_eq!(err.kind(), "store_error");
        assert!(!err.public_message().contains("timed out"));
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            AuthError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateUser.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
