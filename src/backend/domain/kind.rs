//! Backend classes and their ordering rank.

use super::ParseBackendKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a registered backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Self-hosted device farm.
    LocalFarm,
    /// Cloud testing provider serving browser sessions.
    CloudProvider,
    /// Cloud testing provider serving Appium device sessions.
    CloudAppiumProvider,
}

impl BackendKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalFarm => "local_farm",
            Self::CloudProvider => "cloud_provider",
            Self::CloudAppiumProvider => "cloud_appium_provider",
        }
    }

    /// Returns the ordering rank; lower ranks are tried first.
    #[must_use]
    pub const fn rank(self) -> BackendRank {
        match self {
            Self::LocalFarm => BackendRank::new(0),
            Self::CloudProvider => BackendRank::new(100),
            Self::CloudAppiumProvider => BackendRank::new(110),
        }
    }

    /// Returns whether the backend is a third-party cloud provider.
    #[must_use]
    pub const fn is_cloud(self) -> bool {
        matches!(self, Self::CloudProvider | Self::CloudAppiumProvider)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BackendKind {
    type Error = ParseBackendKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "local_farm" => Ok(Self::LocalFarm),
            "cloud_provider" => Ok(Self::CloudProvider),
            "cloud_appium_provider" => Ok(Self::CloudAppiumProvider),
            _ => Err(ParseBackendKindError(value.to_owned())),
        }
    }
}

/// Position of a backend in the selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendRank(u16);

impl BackendRank {
    /// Wraps a raw rank value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw rank value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for BackendRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
