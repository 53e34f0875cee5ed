//! Credential injection for session-creation requests.

use super::ForwardedRequest;
use crate::backend::domain::ProviderProfile;
use crate::credentials::{CredentialBinding, CredentialStore, Credentials};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// JSON Wire Protocol key holding the requested capabilities.
pub const DESIRED_CAPABILITIES: &str = "desiredCapabilities";

/// Errors raised while rewriting a session-creation body.
#[derive(Debug, Error)]
pub enum RequestMutationError {
    /// The body is not valid JSON.
    #[error("session request body is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// The named part of the document is not a JSON object.
    #[error("session request field '{0}' must be a JSON object")]
    NotAnObject(&'static str),

    /// The rewritten document could not be serialised.
    #[error("failed to serialise session request: {0}")]
    Serialisation(#[source] serde_json::Error),
}

/// Rewrites session-creation requests for one backend.
///
/// Key order of the incoming document is preserved and credential keys are
/// overwritten in place, so the output is byte-for-byte deterministic and a
/// second pass over it changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMutator {
    binding: Option<CredentialBinding>,
    credentials: Credentials,
}

impl RequestMutator {
    /// Creates a mutator injecting `credentials` into the fields named by
    /// `binding`.
    #[must_use]
    pub const fn new(binding: CredentialBinding, credentials: Credentials) -> Self {
        Self {
            binding: Some(binding),
            credentials,
        }
    }

    /// Creates a mutator that forwards every request unchanged.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            binding: None,
            credentials: Credentials::default(),
        }
    }

    /// Creates the mutator for a provider, resolving its secrets from
    /// `store`. Providers without credentials get a passthrough mutator.
    #[must_use]
    pub fn for_profile(profile: &ProviderProfile, store: &CredentialStore) -> Self {
        profile.credentials().map_or_else(Self::passthrough, |binding| {
            Self::new(binding.clone(), store.resolve(binding))
        })
    }

    /// Returns whether this mutator ever changes a request.
    #[must_use]
    pub const fn injects_credentials(&self) -> bool {
        self.binding.is_some()
    }

    /// Injects credentials into a session-creation request.
    ///
    /// Any request that is not a `POST` of the start-session type is
    /// returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`RequestMutationError::MalformedBody`] when a creation body is
    /// not JSON and [`RequestMutationError::NotAnObject`] when the document or
    /// its `desiredCapabilities` member is not an object.
    pub fn transform(
        &self,
        request: ForwardedRequest,
    ) -> Result<ForwardedRequest, RequestMutationError> {
        let Some(binding) = &self.binding else {
            return Ok(request);
        };
        if !request.is_session_creation() {
            return Ok(request);
        }

        let mut document: Value =
            serde_json::from_str(request.body()).map_err(RequestMutationError::MalformedBody)?;
        let root = document
            .as_object_mut()
            .ok_or(RequestMutationError::NotAnObject("root"))?;

        let desired = root
            .entry(DESIRED_CAPABILITIES)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or(RequestMutationError::NotAnObject(DESIRED_CAPABILITIES))?;
        self.inject(binding, desired);

        let body = serde_json::to_string(&document).map_err(RequestMutationError::Serialisation)?;
        debug!(path = request.path(), "credentials injected into session request");
        Ok(request.with_body(body))
    }

    fn inject(&self, binding: &CredentialBinding, target: &mut Map<String, Value>) {
        target.insert(
            binding.account_field().to_owned(),
            Value::String(self.credentials.account().to_owned()),
        );
        target.insert(
            binding.access_key_field().to_owned(),
            Value::String(self.credentials.access_key().to_owned()),
        );
    }
}
