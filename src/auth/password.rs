use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use thiserror::Error;
use tracing::error;

use crate::config::PasswordConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("cannot hash an empty password")]
    Empty,
    #[error("hashing failed: {0}")]
    Hashing(String),
    #[error("stored hash is malformed: {0}")]
    Verification(String),
}

/// Salted Argon2id hasher with a configurable work factor.
///
/// The salt and cost parameters are embedded in the returned PHC string,
/// so verification needs nothing but the stored hash.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cfg: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| PasswordError::Hashing(format!("invalid argon2 params: {e}")))?;
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        let filler: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        hasher.dummy_hash = hasher.hash(&filler)?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        if plain.is_empty() {
            return Err(PasswordError::Empty);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A mismatch is `Ok(false)`; only an unparsable hash is an error.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            PasswordError::Verification(e.to_string())
        })?;
        // Cost parameters come from the hash itself, so old hashes keep verifying
        // after the configured work factor changes.
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(PasswordError::Verification(e.to_string()))
            }
        }
    }

    /// Burns the same CPU as a real verification and always reports a mismatch.
    pub fn verify_dummy(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hasher.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = test_hasher()
            .verify("anything", "not-a-valid-hash")
            .unwrap_err();
        assert!(matches!(err, PasswordError::Verification(_)));
    }

    #[test]
    fn hash_never_contains_plaintext_and_is_salted() {
        let hasher = test_hasher();
        let a = hasher.hash("secret1").unwrap();
        let b = hasher.hash("secret1").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("secret1"));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(test_hasher().hash(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn out_of_range_cost_fails_construction() {
        let res = PasswordHasher::new(PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(res, Err(PasswordError::Hashing(_))));
    }

    #[test]
    fn hashes_made_with_other_costs_still_verify() {
        let cheap = test_hasher();
        let other = PasswordHasher::new(PasswordConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = other.hash("password1").unwrap();
        assert!(cheap.verify("password1", &hash).unwrap());
    }

    #[test]
    fn dummy_verification_never_matches() {
        let hasher = test_hasher();
        assert!(!hasher.verify_dummy("whatever"));
    }
}
