use axum::{routing::get, Json, Router};
use tracing::debug;

use crate::{
    auth::{dto::SubjectResponse, extractors::AuthUser},
    state::AppState,
};

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/protected", get(protected))
}

pub async fn protected(AuthUser(user): AuthUser) -> Json<SubjectResponse> {
    debug!(%user, "protected resource served");
    Json(SubjectResponse {
        status: "success",
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_response_serialization() {
        let response = SubjectResponse {
            status: "success",
            user: "bob".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["user"], "bob");
    }
}
