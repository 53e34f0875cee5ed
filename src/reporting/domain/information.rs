//! Published test metadata.

use crate::backend::domain::ExternalSessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one finished session, as handed to the aggregator.
///
/// Records are built from a ready [`SessionReport`](super::SessionReport)
/// and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInformation {
    pub(super) external_id: ExternalSessionId,
    pub(super) test_name: String,
    pub(super) file_name: String,
    pub(super) file_extension: String,
    pub(super) proxy_name: String,
    pub(super) browser_and_platform: String,
    pub(super) video_url: String,
    pub(super) retrieved_at: DateTime<Utc>,
}

impl TestInformation {
    /// Returns the backend-assigned session identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalSessionId {
        &self.external_id
    }

    /// Returns the test name.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Returns the artefact file name, without extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the video file extension, including the dot.
    #[must_use]
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Returns the display name of the provider that ran the session.
    #[must_use]
    pub fn proxy_name(&self) -> &str {
        &self.proxy_name
    }

    /// Returns the combined browser and platform label.
    #[must_use]
    pub fn browser_and_platform(&self) -> &str {
        &self.browser_and_platform
    }

    /// Returns the video URL reported by the provider.
    #[must_use]
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    /// Returns when the metadata was retrieved.
    #[must_use]
    pub const fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}
