//! Per-provider identity, artifact and reporting settings.

use super::{BackendDomainError, ExternalSessionId};
use crate::credentials::CredentialBinding;

/// Placeholder replaced by the external session id in endpoint templates.
pub const SESSION_ID_PLACEHOLDER: &str = "{session_id}";

const BROWSERSTACK_HUB_URL: &str = "http://hub-cloud.browserstack.com:80";
const BROWSERSTACK_AUTOMATE_ENDPOINT: &str =
    "https://api.browserstack.com/automate/sessions/{session_id}.json";
const BROWSERSTACK_APP_AUTOMATE_ENDPOINT: &str =
    "https://api-cloud.browserstack.com/app-automate/sessions/{session_id}.json";
const MP4: &str = ".mp4";

/// Identity and integration settings shared by every backend of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    display_name: String,
    file_prefix: String,
    video_extension: String,
    hub_url: String,
    credentials: Option<CredentialBinding>,
    reporting_endpoints: Vec<String>,
}

impl ProviderProfile {
    /// Profile for a self-hosted Docker Selenium farm reachable at `hub_url`.
    ///
    /// The farm has no credentials and no reporting API.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::InvalidHubUrl`] when `hub_url` is not an
    /// HTTP(S) URL.
    pub fn local_farm(hub_url: impl Into<String>) -> Result<Self, BackendDomainError> {
        Ok(Self {
            display_name: "DockerSelenium".to_owned(),
            file_prefix: "docker_selenium".to_owned(),
            video_extension: MP4.to_owned(),
            hub_url: validated_hub_url(hub_url.into())?,
            credentials: None,
            reporting_endpoints: Vec::new(),
        })
    }

    /// Profile for `BrowserStack` browser sessions.
    ///
    /// Metadata is looked up on the Automate API first and on the App
    /// Automate API second, since mobile sessions only appear on the latter.
    #[must_use]
    pub fn browserstack() -> Self {
        Self {
            display_name: "BrowserStack".to_owned(),
            file_prefix: "browserstack".to_owned(),
            video_extension: MP4.to_owned(),
            hub_url: BROWSERSTACK_HUB_URL.to_owned(),
            credentials: Some(CredentialBinding::browserstack()),
            reporting_endpoints: vec![
                BROWSERSTACK_AUTOMATE_ENDPOINT.to_owned(),
                BROWSERSTACK_APP_AUTOMATE_ENDPOINT.to_owned(),
            ],
        }
    }

    /// Profile for `BrowserStack` Appium sessions.
    #[must_use]
    pub fn browserstack_appium() -> Self {
        Self {
            display_name: "BSAppium".to_owned(),
            file_prefix: "bsappium".to_owned(),
            reporting_endpoints: vec![BROWSERSTACK_APP_AUTOMATE_ENDPOINT.to_owned()],
            ..Self::browserstack()
        }
    }

    /// Replaces the reporting endpoint templates.
    ///
    /// Each template should contain [`SESSION_ID_PLACEHOLDER`].
    #[must_use]
    pub fn with_reporting_endpoints(mut self, templates: impl IntoIterator<Item = String>) -> Self {
        self.reporting_endpoints = templates.into_iter().collect();
        self
    }

    /// Returns the stable display name of the provider.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the prefix used for artifact file names.
    #[must_use]
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Returns the video artifact file extension, including the dot.
    #[must_use]
    pub fn video_extension(&self) -> &str {
        &self.video_extension
    }

    /// Returns the hub URL sessions are forwarded to.
    #[must_use]
    pub fn hub_url(&self) -> &str {
        &self.hub_url
    }

    /// Returns the credential binding, if the provider needs credentials.
    #[must_use]
    pub const fn credentials(&self) -> Option<&CredentialBinding> {
        self.credentials.as_ref()
    }

    /// Returns whether the provider exposes a reporting API.
    #[must_use]
    pub fn has_reporting(&self) -> bool {
        !self.reporting_endpoints.is_empty()
    }

    /// Expands the reporting endpoints for one session, in lookup order.
    #[must_use]
    pub fn reporting_urls(&self, external_id: &ExternalSessionId) -> Vec<String> {
        self.reporting_endpoints
            .iter()
            .map(|template| template.replace(SESSION_ID_PLACEHOLDER, external_id.as_str()))
            .collect()
    }
}

fn validated_hub_url(raw: String) -> Result<String, BackendDomainError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(BackendDomainError::InvalidHubUrl(raw))
    }
}
