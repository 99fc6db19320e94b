//! Showring platform configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! `SR_*` environment variables. The file is located through `SR_CONFIG`,
//! falling back to `showring.toml` in the working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CONFIG_PATH_ENV: &str = "SR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "showring.toml";

/// Minimum accepted length for the HMAC signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://showring.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://showring.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    /// Reject logins for accounts whose email has not been confirmed
    pub require_confirmed_account: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "showring".to_string(),
            access_token_expiry_secs: 3600,
            refresh_token_expiry_secs: 14 * 24 * 3600,
            require_confirmed_account: false,
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("require_confirmed_account", &self.require_confirmed_account)
            .finish()
    }
}

/// Optional bootstrap administrator
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
    pub dev_mode: bool,
}

impl PlatformConfig {
    /// Load from the configured file (if any) and the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.ensure_jwt_secret();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SR_*` overrides using `lookup` to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SR_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = lookup("SR_API_PORT") {
            self.server.port = parse_value("SR_API_PORT", &v)?;
        }
        if let Some(v) = lookup("SR_DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("SR_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("SR_DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("SR_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("SR_JWT_ISSUER") {
            self.auth.issuer = v;
        }
        if let Some(v) = lookup("SR_ACCESS_TOKEN_EXPIRY_SECS") {
            self.auth.access_token_expiry_secs = parse_value("SR_ACCESS_TOKEN_EXPIRY_SECS", &v)?;
        }
        if let Some(v) = lookup("SR_REFRESH_TOKEN_EXPIRY_SECS") {
            self.auth.refresh_token_expiry_secs = parse_value("SR_REFRESH_TOKEN_EXPIRY_SECS", &v)?;
        }
        if let Some(v) = lookup("SR_REQUIRE_CONFIRMED_ACCOUNT") {
            self.auth.require_confirmed_account = parse_flag(&v);
        }
        if let Some(v) = lookup("SR_ADMIN_EMAIL") {
            self.seed.admin_email = Some(v);
        }
        if let Some(v) = lookup("SR_ADMIN_PASSWORD") {
            self.seed.admin_password = Some(v);
        }
        if let Some(v) = lookup("SR_DEV_MODE") {
            self.dev_mode = parse_flag(&v);
        }
        if let Some(v) = lookup("SR_LOG_JSON") {
            self.logging.json = parse_flag(&v);
        }
        Ok(())
    }

    /// In dev mode a missing secret is replaced by a random per-process one.
    pub fn ensure_jwt_secret(&mut self) {
        if self.dev_mode && self.auth.jwt_secret.is_empty() {
            warn!("SR_JWT_SECRET not set, generating an ephemeral dev secret");
            self.auth.jwt_secret = hex::encode(rand::random::<[u8; 32]>());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be non-zero"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections must be at least 1"));
        }
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(invalid(format!(
                "auth.jwt_secret must be at least {} characters (set SR_JWT_SECRET or SR_DEV_MODE=true)",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.auth.access_token_expiry_secs <= 0 || self.auth.refresh_token_expiry_secs <= 0 {
            return Err(invalid("token expiry values must be positive"));
        }
        if self.seed.admin_email.is_some() != self.seed.admin_password.is_some() {
            return Err(invalid("seed.admin_email and seed.admin_password must be set together"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { message: message.into() }
}
