//! Provider reporting API port.

use crate::credentials::Credentials;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for reporting API reads.
pub type ReportingApiResult<T> = Result<T, ReportingApiError>;

/// Read access to a provider's session reports.
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Fetches the session document at `url`, authenticating with
    /// `credentials`.
    ///
    /// Returns `Ok(None)` when the provider has nothing for the session yet.
    async fn fetch_report(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> ReportingApiResult<Option<Value>>;
}

/// Errors returned by reporting API adapters.
#[derive(Debug, Clone, Error)]
pub enum ReportingApiError {
    /// The API answered with a status other than success or not-found.
    #[error("reporting API returned status {status} for {url}")]
    UnexpectedStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body is not JSON.
    #[error("reporting API returned an invalid body: {0}")]
    InvalidBody(Arc<serde_json::Error>),

    /// The request could not be completed.
    #[error("reporting API transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReportingApiError {
    /// Wraps a transport failure.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a body decoding failure.
    #[must_use]
    pub fn invalid_body(err: serde_json::Error) -> Self {
        Self::InvalidBody(Arc::new(err))
    }
}
