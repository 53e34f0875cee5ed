//! Client-requested session capabilities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Capability key naming the requested browser.
pub const BROWSER_NAME: &str = "browserName";
/// Capability key naming the requested platform.
pub const PLATFORM_NAME: &str = "platformName";
/// Legacy platform key still sent by older clients.
pub const PLATFORM: &str = "platform";
/// Capability key identifying a mobile application under test.
pub const APP: &str = "app";

/// Capability set submitted by a client for one session request.
///
/// Keys keep their insertion order so documents built from a capability set
/// serialise deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(Map<String, Value>);

impl CapabilitySet {
    /// Creates an empty capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a capability.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` when it is a non-empty string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the requested browser name.
    #[must_use]
    pub fn browser_name(&self) -> Option<&str> {
        self.get_str(BROWSER_NAME)
    }

    /// Returns the requested platform, preferring `platformName` over the
    /// legacy `platform` key.
    #[must_use]
    pub fn platform_name(&self) -> Option<&str> {
        self.get_str(PLATFORM_NAME)
            .or_else(|| self.get_str(PLATFORM))
    }

    /// Returns the mobile application identifier, if one was requested.
    #[must_use]
    pub fn app(&self) -> Option<&str> {
        self.get_str(APP)
    }

    /// Returns the number of capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no capability is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the capabilities as a JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CapabilitySet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
