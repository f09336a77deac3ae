use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Signing secret used when `JWT_SECRET` is unset outside production.
/// Tokens signed with it are forgeable by anyone who has read this file.
pub const DEV_JWT_SECRET: &str = "accounts-api-insecure-development-secret";

/// Upper bound for `JWT_EXPIRY_HOURS` (ten years).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// Initial password for users registered without one.
pub const DEFAULT_USER_PASSWORD: &str = "password123";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when running in production")]
    MissingJwtSecret,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// True when `jwt_secret` is [`DEV_JWT_SECRET`].
    pub jwt_secret_is_default: bool,
    pub jwt_expiry_hours: u64,
    #[serde(skip_serializing)]
    pub default_user_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_value("PORT", v)?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_value("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // Security overrides
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse_value("JWT_EXPIRY_HOURS", v.clone())?;
            if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::InvalidValue {
                    key: "JWT_EXPIRY_HOURS",
                    value: v,
                });
            }
            self.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = lookup("DEFAULT_USER_PASSWORD").filter(|v| !v.is_empty()) {
            self.security.default_user_password = v;
        }
        match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => {
                self.security.jwt_secret = secret;
                self.security.jwt_secret_is_default = false;
            }
            None if self.is_production() => return Err(ConfigError::MissingJwtSecret),
            None => {
                self.security.jwt_secret = DEV_JWT_SECRET.to_string();
                self.security.jwt_secret_is_default = true;
            }
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            ..Self::development()
        }
    }
}

impl SecurityConfig {
    fn defaults() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_secret_is_default: false,
            jwt_expiry_hours: 24,
            default_user_password: DEFAULT_USER_PASSWORD.to_string(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
