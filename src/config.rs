use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Base URL used when `BITSA_API_URL` is not set outside production.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const LOCAL_JWT_SECRET: &str = "bitsa-local-development-secret";

/// AppConfig
///
/// Immutable configuration for both halves of the binary: the client (API base
/// URL and data directory) and the local backend (bind address, JWT secret,
/// object storage and the seeded admin account).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: Env,
    pub api_url: String,
    /// Directory holding the persisted session and theme.
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// bcrypt work factor for stored passwords.
    pub password_cost: u32,
    /// S3-compatible endpoint. `None` keeps uploads in the in-memory mock store.
    pub s3: Option<S3Settings>,
    pub admin: Option<AdminSeed>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

/// Credentials of the admin account created when the backend starts.
#[derive(Clone, Debug, PartialEq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Env
///
/// `Local` gets pretty logs and development fallbacks; `Production` gets JSON
/// logs and refuses to start without its secrets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(".bitsa"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            password_cost: bcrypt::DEFAULT_COST,
            s3: None,
            admin: None,
        }
    }
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

impl AppConfig {
    /// load
    ///
    /// Reads the environment (call `dotenv` first). In production a missing
    /// `BITSA_API_URL` or `JWT_SECRET` is an error rather than a fallback.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match optional("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let (api_url, jwt_secret) = match env {
            Env::Production => (required("BITSA_API_URL")?, required("JWT_SECRET")?),
            Env::Local => (
                optional("BITSA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                optional("JWT_SECRET").unwrap_or_else(|| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let bind_raw = optional("BITSA_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BITSA_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let data_dir = optional("BITSA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".bitsa"));

        // An endpoint switches uploads to S3; the credentials then become mandatory.
        let s3 = match optional("S3_ENDPOINT") {
            Some(endpoint) => Some(S3Settings {
                endpoint,
                region: optional("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                bucket: optional("S3_BUCKET_NAME").unwrap_or_else(|| "bitsa-uploads".to_string()),
            }),
            None => None,
        };

        let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        Ok(Self {
            env,
            api_url,
            data_dir,
            bind_addr,
            jwt_secret,
            password_cost: bcrypt::DEFAULT_COST,
            s3,
            admin,
        })
    }
}
