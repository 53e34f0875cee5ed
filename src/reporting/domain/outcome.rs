//! Terminal results of a retrieval task.

use super::TestInformation;
use crate::backend::domain::RetrievalState;
use crate::reporting::ports::AggregatorError;

/// Why a claimed session had nothing to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The backend never confirmed the session with an external identifier.
    MissingExternalId,
    /// The backend has no reporting API.
    NoReportingEndpoint,
}

/// How a retrieval task ended.
#[derive(Debug, Clone)]
pub enum RetrievalOutcome {
    /// Metadata was published.
    Delivered(TestInformation),
    /// The deadline elapsed before metadata was ready; nothing was published.
    TimedOut,
    /// The aggregator rejected the metadata.
    Failed(AggregatorError),
    /// Shutdown cancelled the task; nothing was published.
    Abandoned,
    /// Nothing to retrieve.
    Skipped(SkipReason),
}

impl RetrievalOutcome {
    /// Returns the session retrieval state matching this outcome.
    #[must_use]
    pub const fn state(&self) -> RetrievalState {
        match self {
            Self::Delivered(_) => RetrievalState::Delivered,
            Self::TimedOut => RetrievalState::TimedOut,
            Self::Failed(_) => RetrievalState::Failed,
            Self::Abandoned => RetrievalState::Abandoned,
            Self::Skipped(_) => RetrievalState::Skipped,
        }
    }

    /// Returns the published metadata, if any.
    #[must_use]
    pub const fn test_information(&self) -> Option<&TestInformation> {
        match self {
            Self::Delivered(information) => Some(information),
            _ => None,
        }
    }

    /// Returns whether metadata was published.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}
