//! Process configuration loaded from environment variables.
//!
//! Values are trimmed and empty values count as unset.
//!
//! | Variable | Default |
//! |---|---|
//! | `TASKBOARD_HTTP_PORT` (fallback `PORT`) | `3000` |
//! | `TASKBOARD_DATABASE_URL` (fallback `DATABASE_URL`) | none |
//! | `TASKBOARD_DB_POOL_SIZE` | `10` |
//! | `TASKBOARD_LOG_FORMAT` | `pretty` |
//! | `TASKBOARD_TASK_LINK_BASE` | `http://localhost:5173/tasks` |
//! | `TASKBOARD_UNASSIGNED_MEMBER` | `-` |

use crate::observability::LogFormat;
use crate::task::services::NotificationSettings;
use thiserror::Error;

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("{name} is invalid: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP listen port.
    pub http_port: u16,
    /// `PostgreSQL` connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
    /// Log output format.
    pub log_format: LogFormat,
    /// Settings for done notifications.
    pub notification: NotificationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            database_url: None,
            db_pool_size: DEFAULT_POOL_SIZE,
            log_format: LogFormat::default(),
            notification: NotificationSettings::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let mut config = Self::default();

        if let Some(port) = env.parse_u16("TASKBOARD_HTTP_PORT")? {
            config.http_port = port;
        } else if let Some(port) = env.parse_u16("PORT")? {
            config.http_port = port;
        }

        config.database_url = env
            .string("TASKBOARD_DATABASE_URL")
            .or_else(|| env.string("DATABASE_URL"));

        if let Some(size) = env.parse_u32("TASKBOARD_DB_POOL_SIZE")? {
            if size == 0 {
                return Err(ConfigError::Invalid {
                    name: "TASKBOARD_DB_POOL_SIZE",
                    reason: "must be at least 1".to_owned(),
                });
            }
            config.db_pool_size = size;
        }

        if let Some(format) = env.string("TASKBOARD_LOG_FORMAT") {
            config.log_format =
                format
                    .parse::<LogFormat>()
                    .map_err(|err| ConfigError::Invalid {
                        name: "TASKBOARD_LOG_FORMAT",
                        reason: err.to_string(),
                    })?;
        }

        if let Some(link_base) = env.string("TASKBOARD_TASK_LINK_BASE") {
            config.notification.link_base = link_base;
        }
        if let Some(member) = env.string("TASKBOARD_UNASSIGNED_MEMBER") {
            config.notification.unassigned_member = member;
        }

        Ok(config)
    }

    /// Returns the database URL the server must connect to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when neither database variable is set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("TASKBOARD_DATABASE_URL"))
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
    }

    fn parse_u16(&self, name: &'static str) -> Result<Option<u16>, ConfigError> {
        let Some(value) = self.string(name) else {
            return Ok(None);
        };
        value.parse::<u16>().map(Some).map_err(|err| ConfigError::Invalid {
            name,
            reason: format!("must be a u16: {err}"),
        })
    }

    fn parse_u32(&self, name: &'static str) -> Result<Option<u32>, ConfigError> {
        let Some(value) = self.string(name) else {
            return Ok(None);
        };
        value.parse::<u32>().map(Some).map_err(|err| ConfigError::Invalid {
            name,
            reason: format!("must be a u32: {err}"),
        })
    }
}
