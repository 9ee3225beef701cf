//! API server configuration.
//!
//! Values are layered: built-in defaults, then an optional `config/bazaar.toml`,
//! then `BAZAAR_*` environment variables (`BAZAAR_PORT=9000`,
//! `BAZAAR_JWT_SECRET=...`).

use config::{Config, Environment, File};
use serde::Deserialize;

/// Signing secret used when none is configured. Fine for local work only.
pub const DEV_JWT_SECRET: &str = "bazaar-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite file path, or `:memory:`
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// HMAC secret for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// How long an emailed verification code stays valid
    pub verification_code_ttl_secs: i64,

    /// Set the `Secure` flag on the session cookie
    pub cookie_secure: bool,

    /// Sender address on outgoing mail
    pub mail_from: String,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "./data/bazaar.db".to_string(),
            max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_lifetime_secs: 604_800, // 7 days
            verification_code_ttl_secs: 900, // 15 minutes
            cookie_secure: false,
            mail_from: "noreply@bazaar.local".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `config/bazaar.toml` (if present) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/bazaar")
    }

    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config: ApiConfig = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("token_lifetime_secs", defaults.token_lifetime_secs)?
            .set_default("verification_code_ttl_secs", defaults.verification_code_ttl_secs)?
            .set_default("cookie_secure", defaults.cookie_secure)?
            .set_default("mail_from", defaults.mail_from)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("BAZAAR").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("token_lifetime_secs".to_string()));
        }
        if self.verification_code_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("verification_code_ttl_secs".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
