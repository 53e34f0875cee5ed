//! Backend authentication secrets.
//!
//! Secrets are resolved from an injected [`EnvironmentSource`]. Missing
//! values degrade to empty strings so credential injection stays
//! deterministic when a provider account is not configured.

use crate::config::EnvironmentSource;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the `BrowserStack` account name.
pub const BROWSER_STACK_USER_VAR: &str = "BROWSER_STACK_USER";
/// Environment variable holding the `BrowserStack` access key.
pub const BROWSER_STACK_KEY_VAR: &str = "BROWSER_STACK_KEY";

/// Binds a provider's secrets to configuration variables and to the
/// capability fields that carry them in session-creation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBinding {
    account_variable: String,
    access_key_variable: String,
    account_field: String,
    access_key_field: String,
}

impl CredentialBinding {
    /// Creates a binding from variable and field names.
    #[must_use]
    pub fn new(
        account_variable: impl Into<String>,
        access_key_variable: impl Into<String>,
        account_field: impl Into<String>,
        access_key_field: impl Into<String>,
    ) -> Self {
        Self {
            account_variable: account_variable.into(),
            access_key_variable: access_key_variable.into(),
            account_field: account_field.into(),
            access_key_field: access_key_field.into(),
        }
    }

    /// Binding used by `BrowserStack` backends.
    #[must_use]
    pub fn browserstack() -> Self {
        Self::new(
            BROWSER_STACK_USER_VAR,
            BROWSER_STACK_KEY_VAR,
            "browserstack.user",
            "browserstack.key",
        )
    }

    /// Returns the variable holding the account identifier.
    #[must_use]
    pub fn account_variable(&self) -> &str {
        &self.account_variable
    }

    /// Returns the variable holding the access key.
    #[must_use]
    pub fn access_key_variable(&self) -> &str {
        &self.access_key_variable
    }

    /// Returns the capability field receiving the account identifier.
    #[must_use]
    pub fn account_field(&self) -> &str {
        &self.account_field
    }

    /// Returns the capability field receiving the access key.
    #[must_use]
    pub fn access_key_field(&self) -> &str {
        &self.access_key_field
    }
}

/// Account identifier and access key for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    account: String,
    access_key: String,
}

impl Credentials {
    /// Creates credentials from raw values.
    #[must_use]
    pub fn new(account: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            access_key: access_key.into(),
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Returns the access key.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns whether neither secret is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account.is_empty() && self.access_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Resolves provider credentials from configuration.
#[derive(Clone)]
pub struct CredentialStore {
    environment: Arc<dyn EnvironmentSource>,
}

impl CredentialStore {
    /// Creates a store reading from `environment`.
    #[must_use]
    pub fn new(environment: Arc<dyn EnvironmentSource>) -> Self {
        Self { environment }
    }

    /// Resolves the secrets named by `binding`; unset values become `""`.
    #[must_use]
    pub fn resolve(&self, binding: &CredentialBinding) -> Credentials {
        Credentials::new(
            self.environment.var_or(binding.account_variable(), ""),
            self.environment.var_or(binding.access_key_variable(), ""),
        )
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
