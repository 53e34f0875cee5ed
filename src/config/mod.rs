//! Process configuration for the gateway.
//!
//! Configuration values are read through the [`EnvironmentSource`] port so
//! that callers inject the source explicitly. Production code uses
//! [`ProcessEnvironment`]; tests use [`StaticEnvironment`].

mod environment;
mod gateway;

pub use environment::{EnvironmentSource, ProcessEnvironment, StaticEnvironment};
pub use gateway::{
    CLOUD_DEADLINE_VAR, CLOUD_MAX_SESSIONS_VAR, ConfigError, GatewayConfig, LOCAL_DEADLINE_VAR,
    LOCAL_FARM_URL_VAR, LOCAL_MAX_SESSIONS_VAR, POLL_INTERVAL_VAR, RetryPolicy,
};
