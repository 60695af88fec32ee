use std::sync::Arc;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::Duration;
use tracing::debug;

use super::{claims::Claims, clock::Clock};
use crate::config::JwtConfig;

/// The only signing algorithm issued or accepted.
const ALGORITHM: Algorithm = Algorithm::HS256;

pub const DEFAULT_TTL: Duration = Duration::hours(24);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token was issued by someone else")]
    WrongIssuer,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            // A foreign algorithm is treated as a signature we refuse to trust.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies stateless HS256 bearer tokens.
///
/// Holds the process-wide signing secret; it is fixed at construction.
#[derive(Clone)]
pub struct TokenService {
    keys: Option<SigningKeys>,
    issuer: String,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        default_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let keys = (!secret.is_empty()).then(|| SigningKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        });
        Self {
            keys,
            issuer: issuer.into(),
            default_ttl,
            clock,
        }
    }

    pub fn from_config(cfg: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            cfg.issuer.clone(),
            Duration::minutes(cfg.ttl_minutes),
            clock,
        )
    }

    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;
        let now = self.clock.now();
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Signing("ttl out of range".into()))?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        debug!(subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::InvalidSignature)?;

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is judged against our own clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &keys.decoding, &validation)?.claims;
        if self.clock.now().unix_timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        debug!(subject = %claims.sub, "jwt verified");
        Ok(claims)
    }
}
