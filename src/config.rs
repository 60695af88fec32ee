use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            timeout_secs: env_or("STORE_TIMEOUT_SECS", 5),
        };
        let jwt = JwtConfig {
            secret: load_signing_secret()?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "gatekeeper".into()),
            ttl_minutes: validate_ttl_minutes(env_or("JWT_TTL_MINUTES", 60 * 24))?,
        };
        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism),
        };
        Ok(Self {
            store,
            jwt,
            password,
        })
    }
}

/// Reads the process-wide signing secret. Called once at startup.
pub fn load_signing_secret() -> anyhow::Result<String> {
    let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    if secret.trim().is_empty() {
        bail!("JWT_SECRET must not be empty");
    }
    Ok(secret)
}

/// Longest accepted token lifetime: ten years.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 366 * 10;

fn validate_ttl_minutes(minutes: i64) -> anyhow::Result<i64> {
    if minutes <= 0 {
        bail!("JWT_TTL_MINUTES must be positive, got {minutes}");
    }
    if minutes > MAX_TTL_MINUTES {
        bail!("JWT_TTL_MINUTES must not exceed {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
