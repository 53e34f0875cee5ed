//! Gateway tuning loaded from the environment.

use super::EnvironmentSource;
use crate::backend::domain::BackendKind;
use std::time::Duration;
use thiserror::Error;

/// Interval between reporting-API polls, in milliseconds.
pub const POLL_INTERVAL_VAR: &str = "FARMGATE_POLL_INTERVAL_MS";
/// Retrieval deadline for cloud backends, in milliseconds.
pub const CLOUD_DEADLINE_VAR: &str = "FARMGATE_CLOUD_DEADLINE_MS";
/// Retrieval deadline for local farm backends, in milliseconds.
pub const LOCAL_DEADLINE_VAR: &str = "FARMGATE_LOCAL_DEADLINE_MS";
/// Concurrent session limit for each cloud backend.
pub const CLOUD_MAX_SESSIONS_VAR: &str = "FARMGATE_CLOUD_MAX_SESSIONS";
/// Concurrent session limit for the local farm.
pub const LOCAL_MAX_SESSIONS_VAR: &str = "FARMGATE_LOCAL_MAX_SESSIONS";
/// Hub URL of the local farm.
pub const LOCAL_FARM_URL_VAR: &str = "FARMGATE_LOCAL_FARM_URL";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const DEFAULT_CLOUD_DEADLINE: Duration = Duration::from_secs(30);
const DEFAULT_LOCAL_DEADLINE: Duration = Duration::from_secs(5);
const DEFAULT_CLOUD_MAX_SESSIONS: usize = 5;
const DEFAULT_LOCAL_MAX_SESSIONS: usize = 10;
const DEFAULT_LOCAL_FARM_URL: &str = "http://localhost:4444";

/// Errors returned while loading gateway configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but does not hold a non-negative integer.
    #[error("{variable} must be a non-negative integer, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        variable: String,
        /// Raw value.
        value: String,
    },

    /// A duration variable is set to zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(String),

    /// A session limit variable is set to zero.
    #[error("{0} must allow at least one session")]
    ZeroCapacity(String),
}

/// Polling cadence and overall deadline for metadata retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    poll_interval: Duration,
    deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_CLOUD_DEADLINE)
    }
}

impl RetryPolicy {
    /// Creates a policy from explicit values.
    ///
    /// A zero `poll_interval` is raised to one millisecond; a timer cannot
    /// tick with a zero period.
    #[must_use]
    pub const fn new(poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            poll_interval: if poll_interval.is_zero() {
                MIN_POLL_INTERVAL
            } else {
                poll_interval
            },
            deadline,
        }
    }

    /// Creates a short policy (500 ms interval, 2 s deadline).
    ///
    /// Useful in tests driven by a paused clock.
    #[must_use]
    pub const fn quick() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, Duration::from_secs(2))
    }

    /// Returns the delay between two polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the overall retrieval deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Interval between reporting-API polls.
    pub poll_interval: Duration,
    /// Retrieval deadline for cloud backends.
    pub cloud_deadline: Duration,
    /// Retrieval deadline for local farm backends.
    pub local_deadline: Duration,
    /// Concurrent session limit for each cloud backend.
    pub cloud_max_sessions: usize,
    /// Concurrent session limit for the local farm.
    pub local_max_sessions: usize,
    /// Hub URL of the local farm.
    pub local_farm_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cloud_deadline: DEFAULT_CLOUD_DEADLINE,
            local_deadline: DEFAULT_LOCAL_DEADLINE,
            cloud_max_sessions: DEFAULT_CLOUD_MAX_SESSIONS,
            local_max_sessions: DEFAULT_LOCAL_MAX_SESSIONS,
            local_farm_url: DEFAULT_LOCAL_FARM_URL.to_owned(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] for unparseable values,
    /// [`ConfigError::ZeroDuration`] for zero intervals or deadlines, and
    /// [`ConfigError::ZeroCapacity`] for zero session limits.
    pub fn from_environment(env: &impl EnvironmentSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            poll_interval: read_millis(env, POLL_INTERVAL_VAR, defaults.poll_interval)?,
            cloud_deadline: read_millis(env, CLOUD_DEADLINE_VAR, defaults.cloud_deadline)?,
            local_deadline: read_millis(env, LOCAL_DEADLINE_VAR, defaults.local_deadline)?,
            cloud_max_sessions: read_capacity(
                env,
                CLOUD_MAX_SESSIONS_VAR,
                defaults.cloud_max_sessions,
            )?,
            local_max_sessions: read_capacity(
                env,
                LOCAL_MAX_SESSIONS_VAR,
                defaults.local_max_sessions,
            )?,
            local_farm_url: env.var_or(LOCAL_FARM_URL_VAR, &defaults.local_farm_url),
        })
    }

    /// Returns the retrieval policy for a backend class.
    #[must_use]
    pub const fn retry_policy(&self, kind: BackendKind) -> RetryPolicy {
        let deadline = if kind.is_cloud() {
            self.cloud_deadline
        } else {
            self.local_deadline
        };
        RetryPolicy::new(self.poll_interval, deadline)
    }

    /// Returns the session limit for a backend class.
    #[must_use]
    pub const fn max_sessions(&self, kind: BackendKind) -> usize {
        if kind.is_cloud() {
            self.cloud_max_sessions
        } else {
            self.local_max_sessions
        }
    }
}

fn read_number(env: &impl EnvironmentSource, variable: &str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = env.var(variable) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber {
            variable: variable.to_owned(),
            value: raw.clone(),
        })
}

fn read_millis(
    env: &impl EnvironmentSource,
    variable: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match read_number(env, variable)? {
        None => Ok(default),
        Some(0) => Err(ConfigError::ZeroDuration(variable.to_owned())),
        Some(millis) => Ok(Duration::from_millis(millis)),
    }
}

fn read_capacity(
    env: &impl EnvironmentSource,
    variable: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match read_number(env, variable)? {
        None => Ok(default),
        Some(0) => Err(ConfigError::ZeroCapacity(variable.to_owned())),
        Some(count) => usize::try_from(count).map_err(|_| ConfigError::InvalidNumber {
            variable: variable.to_owned(),
            value: count.to_string(),
        }),
    }
}
