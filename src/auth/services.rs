use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::TokenService,
        password::{PasswordError, PasswordHasher},
        repo::{StoreError, UserStore},
        repo_types::NewUser,
        validation::{validate_login, validate_register},
    },
    error::AuthError,
};

/// Drives register, login and authorize over the store, hasher and token service.
///
/// Holds no per-request state; one instance serves every request.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenService,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            store_timeout,
        }
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Runs a store call under the caller-side timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    // Argon2 is deliberately slow, keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    async fn verify_password(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => Ok(hasher.verify_dummy(&password)),
        })
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.tokens.issue_default(subject).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            AuthError::Signing(e)
        })
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterRequest) -> Result<String, AuthError> {
        let req = validate_register(req).map_err(|e| {
            warn!(reason = %e, "register validation failed");
            e
        })?;
        debug!("validated");

        match self.bounded(self.store.find_by_username(&req.username)).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                warn!("username already registered");
                return Err(AuthError::DuplicateUser);
            }
            Err(e) => {
                error!(error = %e, "find_by_username failed");
                return Err(AuthError::Store(e));
            }
        }
        debug!("checked unique");

        let password_hash = self.hash_password(req.password).await.map_err(|e| {
            error!(error = %e, "hash_password failed");
            AuthError::Hashing(e)
        })?;
        debug!("hashed");

        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        };
        let user = match self.bounded(self.store.insert(new_user)).await {
            Ok(user) => user,
            // Lost a check-then-insert race, or the email is taken.
            Err(StoreError::Duplicate) => {
                warn!("insert hit unique constraint");
                return Err(AuthError::DuplicateUser);
            }
            Err(e) => {
                error!(error = %e, "insert user failed");
                return Err(AuthError::Store(e));
            }
        };
        debug!(user_id = %user.id, "persisted");

        let token = self.issue(&user.username)?;
        info!(user_id = %user.id, "user registered");
        Ok(token)
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<String, AuthError> {
        let req = validate_login(req).map_err(|e| {
            warn!(reason = %e, "login validation failed");
            e
        })?;

        let user = self
            .bounded(self.store.find_by_username(&req.username))
            .await
            .map_err(|e| {
                error!(error = %e, "find_by_username failed");
                AuthError::Store(e)
            })?;
        debug!(found = user.is_some(), "looked up");

        // Unknown users still pay for a full verification against the dummy hash.
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let matched = self
            .verify_password(req.password, stored_hash)
            .await
            .map_err(|e| {
                error!(error = %e, "verify_password failed");
                AuthError::Hashing(e)
            })?;

        let user = match user {
            Some(user) if matched => user,
            Some(user) => {
                warn!(user_id = %user.id, "login invalid password");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                warn!("login unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.issue(&user.username)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Resolves a bearer token to its subject.
    pub fn authorize(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .verify(token)
            .map(|claims| claims.sub)
            .map_err(|e| {
                warn!(reason = %e, "token rejected");
                AuthError::Unauthorized
            })
    }
}
