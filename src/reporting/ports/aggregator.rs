//! Results aggregator port.

use crate::reporting::domain::TestInformation;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for aggregator operations.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Sink receiving the metadata of finished sessions.
#[async_trait]
pub trait ResultsAggregator: Send + Sync {
    /// Publishes one record. Called at most once per session.
    async fn publish(&self, information: TestInformation) -> AggregatorResult<()>;
}

/// Errors returned by aggregator adapters.
#[derive(Debug, Clone, Error)]
pub enum AggregatorError {
    /// The aggregator refused the record.
    #[error("aggregator rejected test information: {0}")]
    Rejected(String),

    /// The aggregator's storage failed.
    #[error("aggregator storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl AggregatorError {
    /// Wraps a storage failure.
    #[must_use]
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
