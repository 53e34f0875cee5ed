//! Backend names used in logs and session records.

use super::BackendDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_LENGTH: usize = 64;

/// Lowercase backend identifier such as `docker_selenium` or `browserstack`.
///
/// Allowed characters are ASCII lowercase letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendName(String);

impl BackendName {
    /// Validates and normalises (trim, lowercase) a backend name.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::EmptyBackendName`],
    /// [`BackendDomainError::BackendNameTooLong`] (over 64 characters) or
    /// [`BackendDomainError::InvalidBackendName`].
    pub fn new(value: impl Into<String>) -> Result<Self, BackendDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(BackendDomainError::EmptyBackendName);
        }
        if normalized.len() > MAX_NAME_LENGTH {
            return Err(BackendDomainError::BackendNameTooLong(raw));
        }
        if !normalized.chars().all(is_name_char) {
            return Err(BackendDomainError::InvalidBackendName(raw));
        }
        Ok(Self(normalized))
    }

    /// Derives a name from a display label, mapping spaces to `_`
    /// (`"Docker Selenium"` becomes `docker_selenium`).
    ///
    /// # Errors
    ///
    /// Same as [`BackendName::new`] once spaces are replaced.
    pub fn from_display(label: &str) -> Result<Self, BackendDomainError> {
        Self::new(label.trim().replace(' ', "_"))
    }

    /// Returns the backend name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

impl TryFrom<String> for BackendName {
    type Error = BackendDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendName> for String {
    fn from(name: BackendName) -> Self {
        name.0
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
