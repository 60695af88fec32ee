use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
}

impl TokenResponse {
    pub fn success(message: &'static str, token: String) -> Self {
        Self {
            status: "success",
            message,
            token,
        }
    }
}

/// Body of the protected endpoint.
#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    pub status: &'static str,
    pub user: String,
}
