//! Store and service configuration loaded from the environment.
//!
//! ```bash
//! ROSTER_DATABASE_URL=postgres://roster@localhost/roster   # required
//! ROSTER_POOL_MAX_SIZE=10
//! ROSTER_POOL_CONNECTION_TIMEOUT_SECS=5
//! ROSTER_READ_TIMEOUT_SECS=5
//! ROSTER_WRITE_TIMEOUT_SECS=5
//! ```

use std::env;
use std::time::Duration;
use thiserror::Error;

const DATABASE_URL_VAR: &str = "ROSTER_DATABASE_URL";
const POOL_MAX_SIZE_VAR: &str = "ROSTER_POOL_MAX_SIZE";
const POOL_CONNECTION_TIMEOUT_VAR: &str = "ROSTER_POOL_CONNECTION_TIMEOUT_SECS";
const READ_TIMEOUT_VAR: &str = "ROSTER_READ_TIMEOUT_SECS";
const WRITE_TIMEOUT_VAR: &str = "ROSTER_WRITE_TIMEOUT_SECS";

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// A size or duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Deadlines applied by the service to each store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeouts {
    /// Ceiling for reads.
    pub read: Duration,
    /// Ceiling for creation, membership mutations, and deletion.
    pub write: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            write: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Connection and timeout settings for the `PostgreSQL` group store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    pool_max_size: u32,
    pool_connection_timeout: Duration,
    timeouts: OperationTimeouts,
}

impl StoreConfig {
    /// Creates a configuration with default pool and timeout settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_connection_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            timeouts: OperationTimeouts::default(),
        }
    }

    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing or a numeric
    /// variable is malformed or zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing or a numeric
    /// variable is malformed or zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;

        let pool_max_size = parse_positive(&lookup, POOL_MAX_SIZE_VAR)?
            .unwrap_or(DEFAULT_POOL_MAX_SIZE);
        let connect_secs = parse_positive(&lookup, POOL_CONNECTION_TIMEOUT_VAR)?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let read_secs = parse_positive(&lookup, READ_TIMEOUT_VAR)?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let write_secs =
            parse_positive(&lookup, WRITE_TIMEOUT_VAR)?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            database_url,
            pool_max_size,
            pool_connection_timeout: Duration::from_secs(connect_secs),
            timeouts: OperationTimeouts {
                read: Duration::from_secs(read_secs),
                write: Duration::from_secs(write_secs),
            },
        })
    }

    /// Overrides the maximum pool size.
    #[must_use]
    pub const fn with_pool_max_size(mut self, size: u32) -> Self {
        self.pool_max_size = size;
        self
    }

    /// Overrides the operation deadlines.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: OperationTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Returns the database connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    /// Returns how long a pool checkout may wait for a connection.
    #[must_use]
    pub const fn pool_connection_timeout(&self) -> Duration {
        self.pool_connection_timeout
    }

    /// Returns the service operation deadlines.
    #[must_use]
    pub const fn timeouts(&self) -> OperationTimeouts {
        self.timeouts
    }
}

fn parse_positive<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Default + PartialEq,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value = raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.clone(),
    })?;
    if value == T::default() {
        return Err(ConfigError::Zero(name));
    }
    Ok(Some(value))
}
