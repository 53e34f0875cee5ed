//! Parsing of reporting-API session documents.

use super::TestInformation;
use crate::backend::domain::{ExternalSessionId, ProviderProfile};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Top-level key wrapping the session document.
pub const AUTOMATION_SESSION: &str = "automation_session";

const NOT_AVAILABLE: &str = "N/A";
const APP_VERSION: &str = "app";
const FILE_TIMESTAMP: &str = "%Y%m%d%H%M%S";

/// Error returned when a session document has the wrong shape.
#[derive(Debug, Error)]
pub enum ReportParseError {
    /// The `automation_session` member could not be decoded.
    #[error("invalid automation session document: {0}")]
    InvalidSession(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct AutomationSession {
    name: Option<String>,
    browser: Option<String>,
    browser_version: Option<String>,
    os: Option<String>,
    os_version: Option<String>,
    device: Option<String>,
    app_details: Option<Value>,
    video_url: Option<String>,
}

/// A ready session document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    name: Option<String>,
    subject: String,
    version: String,
    os: String,
    os_version: String,
    video_url: String,
}

impl SessionReport {
    /// Parses a reporting-API response.
    ///
    /// Returns `Ok(None)` while the provider is still finalising the session,
    /// that is when the document has no `automation_session` object or its
    /// `video_url` is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns [`ReportParseError::InvalidSession`] when `automation_session`
    /// is present but fields have unexpected types.
    pub fn parse(document: &Value) -> Result<Option<Self>, ReportParseError> {
        let Some(raw) = document.get(AUTOMATION_SESSION).filter(|raw| !raw.is_null()) else {
            return Ok(None);
        };
        let session = AutomationSession::deserialize(raw)?;
        let Some(video_url) = non_empty(session.video_url) else {
            return Ok(None);
        };

        let browser_version = non_empty(session.browser_version);
        let has_app = session.app_details.is_some_and(|details| !details.is_null());
        let (subject, version) = non_empty(session.device).map_or_else(
            || (or_not_available(session.browser), browser_version.clone()),
            |device| {
                let device_version = if has_app {
                    Some(APP_VERSION.to_owned())
                } else {
                    browser_version.clone()
                };
                (device, device_version)
            },
        );

        Ok(Some(Self {
            name: non_empty(session.name),
            subject,
            version: version.unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            os: or_not_available(session.os),
            os_version: or_not_available(session.os_version),
            video_url,
        }))
    }

    /// Returns the reported test name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the device name for mobile sessions, or the browser otherwise.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the video URL.
    #[must_use]
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    /// Returns the label `"{subject} {version}, {os} {os_version}"`.
    #[must_use]
    pub fn browser_and_platform(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.subject, self.version, self.os, self.os_version
        )
    }

    /// Builds the record handed to the aggregator.
    ///
    /// The test name falls back to the external session identifier. The file
    /// name is `{prefix}_{test}_{subject}_{os}_{yyyyMMddHHmmss}` with every
    /// character outside `[A-Za-z0-9_-]` replaced by `_`.
    #[must_use]
    pub fn into_test_information(
        self,
        profile: &ProviderProfile,
        external_id: &ExternalSessionId,
        retrieved_at: DateTime<Utc>,
    ) -> TestInformation {
        let browser_and_platform = self.browser_and_platform();
        let test_name = self
            .name
            .unwrap_or_else(|| external_id.as_str().to_owned());
        let file_name = sanitise_file_name(&format!(
            "{}_{}_{}_{}_{}",
            profile.file_prefix(),
            test_name,
            self.subject,
            self.os,
            retrieved_at.format(FILE_TIMESTAMP)
        ));

        TestInformation {
            external_id: external_id.clone(),
            test_name,
            file_name,
            file_extension: profile.video_extension().to_owned(),
            proxy_name: profile.display_name().to_owned(),
            browser_and_platform,
            video_url: self.video_url,
            retrieved_at,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn or_not_available(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

fn sanitise_file_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
