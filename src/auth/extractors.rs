use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::services::AuthService;
use crate::error::AuthError;

/// Authorized subject (username) taken from a valid bearer token.
pub struct AuthUser(pub String);

fn bearer_token(parts: &Parts) -> Result<&str, &'static str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "non-ascii Authorization header")?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("invalid auth scheme")
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(|reason| {
            warn!(reason, "bearer token missing");
            AuthError::Unauthorized
        })?;
        let auth = Arc::<AuthService>::from_ref(state);
        auth.authorize(token).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def.ghi"))), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc"))), Ok("abc"));
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        assert!(bearer_token(&parts_with(None)).is_err());
        assert!(bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer "))).is_err());
    }
}
