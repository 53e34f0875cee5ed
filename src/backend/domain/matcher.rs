//! Capability matching rules.

use super::CapabilitySet;
use serde::{Deserialize, Serialize};

/// Platform wildcard accepted on either side of a comparison.
const ANY_PLATFORM: &str = "ANY";

/// A browser and platform combination a local farm can serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedBrowser {
    browser_name: String,
    platform_name: String,
}

impl SupportedBrowser {
    /// Creates a supported combination.
    #[must_use]
    pub fn new(browser_name: impl Into<String>, platform_name: impl Into<String>) -> Self {
        Self {
            browser_name: browser_name.into(),
            platform_name: platform_name.into(),
        }
    }

    /// Returns the browser name.
    #[must_use]
    pub fn browser_name(&self) -> &str {
        &self.browser_name
    }

    /// Returns the platform name.
    #[must_use]
    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    /// Returns whether this combination satisfies `requested`.
    ///
    /// The browser name must be present and equal ignoring ASCII case. A
    /// missing requested platform, or `ANY` on either side, matches every
    /// platform.
    #[must_use]
    pub fn accepts(&self, requested: &CapabilitySet) -> bool {
        let Some(browser) = requested.browser_name() else {
            return false;
        };
        if !browser.eq_ignore_ascii_case(&self.browser_name) {
            return false;
        }
        requested.platform_name().is_none_or(|platform| {
            platform.eq_ignore_ascii_case(ANY_PLATFORM)
                || self.platform_name.eq_ignore_ascii_case(ANY_PLATFORM)
                || platform.eq_ignore_ascii_case(&self.platform_name)
        })
    }
}

/// Decides whether a backend can serve a requested capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityMatcher {
    /// Serves only the listed browser/platform combinations and never mobile
    /// application sessions.
    Supported(Vec<SupportedBrowser>),
    /// Serves every request. Cloud fallback backends use this so anything the
    /// local farm rejects still finds a home.
    CatchAll,
}

impl CapabilityMatcher {
    /// Combinations served by a default Docker Selenium farm.
    #[must_use]
    pub fn docker_selenium() -> Self {
        Self::Supported(vec![
            SupportedBrowser::new("chrome", "LINUX"),
            SupportedBrowser::new("firefox", "LINUX"),
        ])
    }

    /// Returns whether `requested` can be served. Never fails; missing keys
    /// count as a mismatch.
    #[must_use]
    pub fn matches(&self, requested: &CapabilitySet) -> bool {
        match self {
            Self::CatchAll => true,
            Self::Supported(supported) => {
                requested.app().is_none() && supported.iter().any(|entry| entry.accepts(requested))
            }
        }
    }
}
