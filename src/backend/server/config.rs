/**
 * Server Configuration
 *
 * `ServerConfig` is read from environment variables (a `.env` file is
 * loaded first by the binary) and then overlaid by the TOML file named in
 * `POLLCAST_CONFIG`, if any.
 *
 * | key                    | environment             | default |
 * |------------------------|-------------------------|---------|
 * | `port`                 | `SERVER_PORT`           | 3000    |
 * | `database_url`         | `DATABASE_URL`          | none    |
 * | `feed_deadline_secs`   | `POLL_DEADLINE_SECS`    | 60      |
 * | `thread_deadline_secs` | `POLL_DEADLINE_SECS`    | 60      |
 * | `max_listeners`        | `MAX_LISTENERS`         | 64      |
 * | `db_max_connections`   | `DB_MAX_CONNECTIONS`    | listeners + 10 |
 * | `cleanup_interval_secs`| `CLEANUP_INTERVAL_SECS` | 300     |
 * | `jwt_secret`           | `JWT_SECRET`            | dev     |
 *
 * The database is optional. `load_database` returns `None` when it is not
 * configured or unreachable and the server falls back to the in-memory
 * notifier.
 *
 * Every held poll pins one pooled connection for its `LISTEN`, so the pool
 * is sized above `max_listeners`; the rest serves producers and access
 * checks.
 */

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::backend::auth::{SessionKeys, DEV_JWT_SECRET};
use crate::backend::server::state::PollDeadlines;
use crate::shared::protocol::{DEFAULT_MAX_LISTENERS, DEFAULT_POLL_DEADLINE};
use crate::shared::ConfigError;

/// Environment variable naming the optional TOML overlay
pub const CONFIG_PATH_VAR: &str = "POLLCAST_CONFIG";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Pool connections kept free of listeners by default
pub const RESERVED_POOL_CONNECTIONS: u32 = 10;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub feed_deadline_secs: u64,
    pub thread_deadline_secs: u64,
    pub max_listeners: usize,
    /// Explicit pool size; derived from `max_listeners` when unset
    pub db_max_connections: Option<u32>,
    pub cleanup_interval_secs: u64,
    pub jwt_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            feed_deadline_secs: DEFAULT_POLL_DEADLINE.as_secs(),
            thread_deadline_secs: DEFAULT_POLL_DEADLINE.as_secs(),
            max_listeners: DEFAULT_MAX_LISTENERS,
            db_max_connections: None,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            jwt_secret: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("feed_deadline_secs", &self.feed_deadline_secs)
            .field("thread_deadline_secs", &self.thread_deadline_secs)
            .field("max_listeners", &self.max_listeners)
            .field("db_max_connections", &self.db_max_connections)
            .field("cleanup_interval_secs", &self.cleanup_interval_secs)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Keys accepted in the TOML overlay; absent keys keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    port: Option<u16>,
    database_url: Option<String>,
    feed_deadline_secs: Option<u64>,
    thread_deadline_secs: Option<u64>,
    max_listeners: Option<usize>,
    db_max_connections: Option<u32>,
    cleanup_interval_secs: Option<u64>,
    jwt_secret: Option<String>,
}

impl ServerConfig {
    /// Environment, then the `POLLCAST_CONFIG` overlay, then validation
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            tracing::info!("[Config] Applying overlay from {}", path);
            config.apply_file(Path::new(&path))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read settings through `lookup`, with defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "SERVER_PORT")? {
            config.port = port;
        }
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if let Some(secs) = parse_var(&lookup, "POLL_DEADLINE_SECS")? {
            config.feed_deadline_secs = secs;
            config.thread_deadline_secs = secs;
        }
        if let Some(max) = parse_var(&lookup, "MAX_LISTENERS")? {
            config.max_listeners = max;
        }
        if let Some(max) = parse_var(&lookup, "DB_MAX_CONNECTIONS")? {
            config.db_max_connections = Some(max);
        }
        if let Some(secs) = parse_var(&lookup, "CLEANUP_INTERVAL_SECS")? {
            config.cleanup_interval_secs = secs;
        }
        config.jwt_secret = lookup("JWT_SECRET").filter(|secret| !secret.is_empty());

        Ok(config)
    }

    /// Overlay the keys present in a TOML file
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        self.apply_toml(&contents)
    }

    pub fn apply_toml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(url) = file.database_url {
            self.database_url = Some(url);
        }
        if let Some(secs) = file.feed_deadline_secs {
            self.feed_deadline_secs = secs;
        }
        if let Some(secs) = file.thread_deadline_secs {
            self.thread_deadline_secs = secs;
        }
        if let Some(max) = file.max_listeners {
            self.max_listeners = max;
        }
        if let Some(max) = file.db_max_connections {
            self.db_max_connections = Some(max);
        }
        if let Some(secs) = file.cleanup_interval_secs {
            self.cleanup_interval_secs = secs;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = Some(secret);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_deadline_secs == 0 {
            return Err(ConfigError::InvalidDuration("feed_deadline_secs"));
        }
        if self.thread_deadline_secs == 0 {
            return Err(ConfigError::InvalidDuration("thread_deadline_secs"));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidDuration("cleanup_interval_secs"));
        }
        if self.max_listeners == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_listeners".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(pool_size) = self.db_max_connections {
            if pool_size as usize <= self.max_listeners {
                return Err(ConfigError::InvalidValue {
                    key: "db_max_connections".to_string(),
                    message: format!(
                        "must exceed max_listeners ({}) so producers can still get a connection",
                        self.max_listeners
                    ),
                });
            }
        }
        Ok(())
    }

    /// Pool size: the explicit setting, else the listener budget plus a reserve
    pub fn pool_size(&self) -> u32 {
        self.db_max_connections.unwrap_or_else(|| {
            u32::try_from(self.max_listeners)
                .unwrap_or(u32::MAX)
                .saturating_add(RESERVED_POOL_CONNECTIONS)
        })
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new().max_connections(self.pool_size())
    }

    pub fn deadlines(&self) -> PollDeadlines {
        PollDeadlines {
            feed: Duration::from_secs(self.feed_deadline_secs),
            thread: Duration::from_secs(self.thread_deadline_secs),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn session_keys(&self) -> SessionKeys {
        match &self.jwt_secret {
            Some(secret) => SessionKeys::new(secret),
            None => {
                tracing::warn!("[Config] JWT_SECRET not set, using the development secret");
                SessionKeys::new(DEV_JWT_SECRET)
            }
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is configured and reachable
/// - `None` if no URL is configured or the connection fails
///
/// Errors are logged but do not prevent server startup.
pub async fn load_database(config: &ServerConfig) -> Option<PgPool> {
    let database_url = match config.database_url.as_deref() {
        Some(url) => url,
        None => {
            tracing::warn!("[Config] DATABASE_URL not set. Using the in-memory notifier; producers are disabled.");
            return None;
        }
    };

    tracing::info!("[Config] Connecting to database (pool size {})...", config.pool_size());

    let pool = match config.pool_options().connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Config] Failed to create database connection pool: {}", e);
            tracing::warn!("[Config] Falling back to the in-memory notifier.");
            return None;
        }
    };

    tracing::info!("[Config] Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("[Config] Database migrations completed"),
        Err(e) => {
            tracing::error!("[Config] Failed to run database migrations: {}", e);
            tracing::warn!("[Config] Continuing; the schema might not be up to date");
        }
    }

    Some(pool)
}
