//! Per-backend façade called by the dispatch layer.
//!
//! [`RemoteProxy`] ties one [`Backend`] to its credential-injecting
//! [`RequestMutator`] and to the shared [`MetadataRetriever`], so a session
//! goes through matching, forwarding, confirmation and teardown in one place.

use crate::backend::domain::{CapabilitySet, ExternalSessionId, Session, SessionLifecycleError};
use crate::backend::services::Backend;
use crate::config::RetryPolicy;
use crate::credentials::CredentialStore;
use crate::forwarding::{ForwardedRequest, RequestMutationError, RequestMutator};
use crate::reporting::{
    domain::RetrievalOutcome,
    ports::{ReportingApi, ResultsAggregator},
    services::{MetadataRetriever, RetrievalTarget},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Session lifecycle hooks for one backend.
pub struct RemoteProxy<A, G, C>
where
    A: ReportingApi + 'static,
    G: ResultsAggregator + 'static,
    C: Clock + Send + Sync + 'static,
{
    backend: Arc<Backend>,
    mutator: RequestMutator,
    target: RetrievalTarget,
    retriever: Arc<MetadataRetriever<A, G, C>>,
}

impl<A, G, C> RemoteProxy<A, G, C>
where
    A: ReportingApi + 'static,
    G: ResultsAggregator + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates the proxy, resolving the backend's credentials from `store`.
    #[must_use]
    pub fn new(
        backend: Arc<Backend>,
        store: &CredentialStore,
        policy: RetryPolicy,
        retriever: Arc<MetadataRetriever<A, G, C>>,
    ) -> Self {
        let profile = Arc::clone(backend.profile());
        let credentials = profile
            .credentials()
            .map(|binding| store.resolve(binding))
            .unwrap_or_default();
        Self {
            mutator: RequestMutator::for_profile(&profile, store),
            target: RetrievalTarget::new(profile, credentials, policy),
            backend,
            retriever,
        }
    }

    /// Returns the proxied backend.
    #[must_use]
    pub const fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Reserves a session if the backend accepts `requested`.
    #[must_use]
    pub fn new_session(&self, requested: &CapabilitySet) -> Option<Arc<Session>> {
        self.backend.create_session(requested)
    }

    /// Prepares a request for forwarding, injecting credentials into
    /// session-creation bodies.
    ///
    /// # Errors
    ///
    /// Returns [`RequestMutationError`] when a creation body cannot be
    /// rewritten.
    pub fn before_command(
        &self,
        session: &Session,
        request: ForwardedRequest,
    ) -> Result<ForwardedRequest, RequestMutationError> {
        debug!(
            backend = %self.backend.name(),
            session_id = %session.id(),
            method = %request.method(),
            path = request.path(),
            "forwarding command"
        );
        self.mutator.transform(request)
    }

    /// Records the identifier the backend assigned to a new session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError`] when the session already has an
    /// identifier, stopped, or belongs to another backend.
    pub fn on_session_started(
        &self,
        session: &Session,
        external_id: ExternalSessionId,
    ) -> Result<(), SessionLifecycleError> {
        info!(
            backend = %self.backend.name(),
            session_id = %session.id(),
            %external_id,
            "session started"
        );
        self.backend.attach_external_id(session, external_id)
    }

    /// Handles a forwarded command after the backend answered.
    ///
    /// A `DELETE` stop-session command frees the slot and starts metadata
    /// retrieval; the returned handle resolves to the retrieval outcome.
    /// Every other command is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError`] when the session was already
    /// released; retrieval is not triggered in that case.
    pub fn after_command(
        &self,
        session: &Arc<Session>,
        request: &ForwardedRequest,
    ) -> Result<Option<JoinHandle<RetrievalOutcome>>, SessionLifecycleError> {
        if !request.is_session_termination() {
            return Ok(None);
        }
        self.backend.release(session)?;
        Ok(self.retriever.trigger(session, self.target.clone()))
    }

    /// Returns the number of active sessions on the backend.
    #[must_use]
    pub fn count(&self) -> usize {
        self.backend.count()
    }
}
