/**
 * Server Configuration
 *
 * Loads the server configuration from environment variables (a `.env` file
 * is read first by the binary) and opens the SQLite database.
 *
 * # Environment
 *
 * | Variable | Default |
 * |---|---|
 * | `DATABASE_URL` | `sqlite://./db/polygonedb.db?mode=rwc` |
 * | `HOST` | `0.0.0.0` |
 * | `PORT` | `8000` |
 * | `SECRET_KEY` | development placeholder (logged as a warning) |
 * | `ACCESS_TOKEN_EXPIRE_MINUTES` | `30` |
 * | `BCRYPT_COST` | `12` |
 * | `PUSH_TIMEOUT_MS` | `2000` |
 * | `WS_OUTBOUND_BUFFER` | `64` |
 */

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::backend::error::BackendError;

const DEFAULT_DATABASE_URL: &str = "sqlite://./db/polygonedb.db?mode=rwc";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TOKEN_MINUTES: i64 = 30;
const DEFAULT_PUSH_TIMEOUT_MS: u64 = 2000;
const DEFAULT_OUTBOUND_BUFFER: usize = 64;
const DEV_SECRET: &str = "polygone-dev-secret-change-me";

/// Token signing and password hashing settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for HS256
    pub secret: String,
    /// Token lifetime in minutes
    pub expire_minutes: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expire_minutes: DEFAULT_TOKEN_MINUTES,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// sqlx SQLite connection URL
    pub database_url: String,
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Token settings
    pub auth: AuthConfig,
    /// Upper bound on a single live push
    pub push_timeout: Duration,
    /// Frames buffered per live connection
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auth: AuthConfig::default(),
            push_timeout: Duration::from_millis(DEFAULT_PUSH_TIMEOUT_MS),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(host) = lookup("HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = lookup("PORT") {
            builder = builder.port(parse_number("PORT", &port)?);
        }
        match lookup("SECRET_KEY") {
            Some(secret) => builder = builder.jwt_secret(secret),
            None => tracing::warn!("[Config] SECRET_KEY not set, using the development secret"),
        }
        if let Some(minutes) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            builder = builder.token_expire_minutes(parse_number("ACCESS_TOKEN_EXPIRE_MINUTES", &minutes)?);
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            builder = builder.bcrypt_cost(parse_number("BCRYPT_COST", &cost)?);
        }
        if let Some(ms) = lookup("PUSH_TIMEOUT_MS") {
            builder = builder.push_timeout(Duration::from_millis(parse_number("PUSH_TIMEOUT_MS", &ms)?));
        }
        if let Some(buffer) = lookup("WS_OUTBOUND_BUFFER") {
            builder = builder.outbound_buffer(parse_number("WS_OUTBOUND_BUFFER", &buffer)?);
        }

        builder.build()
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    database_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    token_expire_minutes: Option<i64>,
    bcrypt_cost: Option<u32>,
    push_timeout: Option<Duration>,
    outbound_buffer: Option<usize>,
}

impl ServerConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn token_expire_minutes(mut self, minutes: i64) -> Self {
        self.token_expire_minutes = Some(minutes);
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    pub fn push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = Some(timeout);
        self
    }

    pub fn outbound_buffer(mut self, frames: usize) -> Self {
        self.outbound_buffer = Some(frames);
        self
    }

    /// Build the configuration, applying defaults for unset values
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();

        let auth = AuthConfig {
            secret: self.jwt_secret.unwrap_or(defaults.auth.secret),
            expire_minutes: self.token_expire_minutes.unwrap_or(defaults.auth.expire_minutes),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(defaults.auth.bcrypt_cost),
        };
        if auth.secret.is_empty() {
            return Err(ConfigError::MissingValue("SECRET_KEY"));
        }
        if auth.expire_minutes <= 0 {
            return Err(ConfigError::OutOfRange {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: auth.expire_minutes.to_string(),
            });
        }
        if !(4..=31).contains(&auth.bcrypt_cost) {
            return Err(ConfigError::OutOfRange {
                key: "BCRYPT_COST",
                value: auth.bcrypt_cost.to_string(),
            });
        }

        let outbound_buffer = self.outbound_buffer.unwrap_or(defaults.outbound_buffer);
        if outbound_buffer == 0 {
            return Err(ConfigError::OutOfRange {
                key: "WS_OUTBOUND_BUFFER",
                value: "0".to_string(),
            });
        }

        Ok(ServerConfig {
            database_url: self.database_url.unwrap_or(defaults.database_url),
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            auth,
            push_timeout: self.push_timeout.unwrap_or(defaults.push_timeout),
            outbound_buffer,
        })
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid number for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("value out of range for {key}: {value}")]
    OutOfRange { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Open the SQLite database and run migrations
///
/// In-memory databases get a single long-lived connection so every query
/// sees the same schema. File databases get their parent directory created.
///
/// # Errors
///
/// `StorageError` when the URL is invalid or the connection fails,
/// `StateError` when migrations fail.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, BackendError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool_options = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BackendError::state(format!("Cannot create database directory {}: {}", parent.display(), e))
                })?;
            }
        }
        SqlitePoolOptions::new().max_connections(8)
    };

    tracing::info!("[Database] Connecting to {}", database_url);
    let pool = pool_options.connect_with(options).await?;

    tracing::info!("[Database] Running migrations");
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| BackendError::state(format!("Migration failed: {}", e)))?;

    Ok(pool)
}
