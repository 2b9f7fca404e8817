use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use zeroize::Zeroizing;

const DEFAULT_PRIVATE_KEY_FILE: &str = "ecdsa_private.pem";
const DEFAULT_PUBLIC_KEY_FILE: &str = "ecdsa_public.pem";

/// Which repository backend the process runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?} (expected postgres or memory)"),
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Clone, Debug, Serialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip)]
    pub password: String,
    pub dbname: String,
    pub max_connections: usize,
    pub timeout: Duration,
}

#[derive(Clone, Debug, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip)]
    pub password: String,
}

/// Object storage used for billboard and product images.
#[derive(Clone, Debug, Serialize)]
pub struct ImageStorageConfig {
    #[serde(skip)]
    pub token: String,
    pub url: String,
    pub timeout: Duration,
}

/// Retry schedule for detached image uploads: after the n-th failed attempt
/// the task sleeps `n * base_delay`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// ECDSA P-256 key pair (PEM) used to sign session tokens.
#[derive(Clone)]
pub struct KeyPair {
    pub private_pem: Zeroizing<String>,
    pub public_pem: String,
}

/// The application's configuration.
///
/// Built once at startup and handed to each component by value; nothing
/// reads the environment after this point.
#[derive(Clone, Serialize)]
pub struct Config {
    /// Deployment name (`dev`, `prod`, ...).
    pub env: String,
    pub log_level: String,
    pub api_port: u16,
    #[serde(skip)]
    pub keys: KeyPair,
    pub storage: StorageBackend,
    pub postgres: PostgresConfig,
    pub smtp: SmtpConfig,
    pub cookie_name: String,
    pub image_storage: ImageStorageConfig,
    pub image_retry: RetryPolicy,
    pub rate_limit_enabled: bool,
    pub cors_origins: Vec<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {name}: {e}"))
}

fn read_key(var: &str, fallback_file: &str) -> Result<String> {
    match env::var(var) {
        Ok(pem) if !pem.trim().is_empty() => Ok(pem.replace("\\n", "\n")),
        _ => std::fs::read_to_string(fallback_file)
            .with_context(|| format!("{var} is not set and {fallback_file} could not be read")),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let keys = KeyPair {
            private_pem: Zeroizing::new(read_key("KEY_ECDSA_PRIVATE", DEFAULT_PRIVATE_KEY_FILE)?),
            public_pem: read_key("KEY_ECDSA_PUBLIC", DEFAULT_PUBLIC_KEY_FILE)?,
        };

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            env: var_or("ENV", "dev"),
            log_level: var_or("LOG_LEVEL", "info"),
            api_port: parse_var("API_PORT", "8080")?,
            keys,
            storage: parse_var("STORAGE_BACKEND", "postgres")?,
            postgres: PostgresConfig {
                host: var_or("POSTGRES_HOST", "localhost"),
                port: parse_var("POSTGRES_PORT", "5432")?,
                user: var_or("POSTGRES_USER", "postgres"),
                password: var_or("POSTGRES_PASSWORD", ""),
                dbname: var_or("POSTGRES_NAME", "flash_buy"),
                max_connections: parse_var("POSTGRES_MAX_CONN", "16")?,
                timeout: Duration::from_secs(parse_var("POSTGRES_TIMEOUT", "5")?),
            },
            smtp: SmtpConfig {
                host: var_or("SMTP_HOST", "localhost"),
                port: parse_var("SMTP_PORT", "587")?,
                user: var_or("SMTP_USER", ""),
                password: var_or("SMTP_PASSWORD", ""),
            },
            cookie_name: var_or("COOKIE_NAME", "XPLife_id"),
            image_storage: ImageStorageConfig {
                token: var_or("CLOUD_FLARE_IMAGE_API_TOKEN", ""),
                url: var_or("CLOUD_FLARE_IMAGE_API_URL", ""),
                timeout: Duration::from_secs(parse_var("CLOUD_FLARE_IMAGE_TIMEOUT", "30")?),
            },
            image_retry: RetryPolicy {
                max_attempts: parse_var::<u32>("IMAGE_UPLOAD_MAX_ATTEMPTS", "3")?.max(1),
                base_delay: Duration::from_millis(parse_var("IMAGE_UPLOAD_RETRY_DELAY_MS", "1000")?),
            },
            rate_limit_enabled: parse_var("RATE_LIMIT_ENABLED", "true")?,
            cors_origins,
        })
    }

    pub fn is_dev(&self) -> bool {
        self.env.eq_ignore_ascii_case("dev")
    }
}
