//! Per-backend session slot tracking.
//!
//! Provides [`SessionRegistry`], which reserves a slot for every matched
//! capability request and releases it exactly once when the session stops.

use crate::backend::domain::{
    BackendName, CapabilityMatcher, CapabilitySet, ExternalSessionId, Session, SessionId,
    SessionLifecycleError, SessionState,
};
use mockable::Clock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// Tracks the active sessions of one backend against its concurrency limit.
///
/// Capacity checks and slot reservation happen under a single lock, so
/// concurrent requests can never push the backend past `max_sessions`.
pub struct SessionRegistry {
    backend: BackendName,
    matcher: CapabilityMatcher,
    max_sessions: usize,
    clock: Arc<dyn Clock + Send + Sync>,
    active: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(
        backend: BackendName,
        matcher: CapabilityMatcher,
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            backend,
            matcher,
            max_sessions,
            clock,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the owning backend name.
    #[must_use]
    pub const fn backend(&self) -> &BackendName {
        &self.backend
    }

    /// Returns the capability matcher.
    #[must_use]
    pub const fn matcher(&self) -> &CapabilityMatcher {
        &self.matcher
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub const fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Returns whether the matcher accepts `requested`.
    #[must_use]
    pub fn matches(&self, requested: &CapabilitySet) -> bool {
        self.matcher.matches(requested)
    }

    /// Reserves a slot and returns a session in the `Created` state.
    ///
    /// Returns `None` when the matcher rejects the request or every slot is
    /// taken; callers should try the next backend.
    #[must_use]
    pub fn create_session(&self, requested: &CapabilitySet) -> Option<Arc<Session>> {
        if !self.matcher.matches(requested) {
            debug!(backend = %self.backend, "capabilities not supported");
            return None;
        }

        let mut active = self.active();
        if active.len() >= self.max_sessions {
            debug!(
                backend = %self.backend,
                max_sessions = self.max_sessions,
                "no free session slot"
            );
            return None;
        }

        let session = Arc::new(Session::new(
            self.backend.clone(),
            requested.clone(),
            &*self.clock,
        ));
        active.insert(session.id(), Arc::clone(&session));
        debug!(
            backend = %self.backend,
            session_id = %session.id(),
            active = active.len(),
            "session slot reserved"
        );
        Some(session)
    }

    /// Attaches the backend-assigned identifier to a tracked session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::UnknownSession`] when the session is
    /// not tracked here, or [`SessionLifecycleError::InvalidState`] when an
    /// identifier was already attached or the session stopped.
    pub fn attach_external_id(
        &self,
        session: &Session,
        external_id: ExternalSessionId,
    ) -> Result<(), SessionLifecycleError> {
        if !self.active().contains_key(&session.id()) {
            let err = self.untracked(session, SessionState::Running);
            error!(
                backend = %self.backend,
                session_id = %session.id(),
                error = %err,
                "cannot attach external id"
            );
            return Err(err);
        }
        session
            .attach_external_id(external_id, &*self.clock)
            .inspect_err(|err| {
                error!(
                    backend = %self.backend,
                    session_id = %session.id(),
                    error = %err,
                    "cannot attach external id"
                );
            })
    }

    /// Stops a session and frees its slot.
    ///
    /// # Errors
    ///
    /// A second release of the same session returns
    /// [`SessionLifecycleError::InvalidState`]; a session owned by another
    /// backend returns [`SessionLifecycleError::UnknownSession`]. Neither
    /// changes the slot count.
    pub fn release(&self, session: &Session) -> Result<(), SessionLifecycleError> {
        let result = {
            let mut active = self.active();
            active.remove(&session.id()).map_or_else(
                || Err(self.untracked(session, SessionState::Stopped)),
                |tracked| tracked.mark_stopped(&*self.clock),
            )
        };
        match &result {
            Ok(()) => debug!(
                backend = %self.backend,
                session_id = %session.id(),
                "session slot released"
            ),
            Err(err) => error!(
                backend = %self.backend,
                session_id = %session.id(),
                error = %err,
                "session release rejected"
            ),
        }
        result
    }

    /// Returns the number of sessions that have not stopped.
    #[must_use]
    pub fn count(&self) -> usize {
        self.active().len()
    }

    /// Returns whether another session can be created.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.count() < self.max_sessions
    }

    /// Finds a tracked session by identifier.
    #[must_use]
    pub fn find(&self, id: SessionId) -> Option<Arc<Session>> {
        self.active().get(&id).cloned()
    }

    fn untracked(&self, session: &Session, to: SessionState) -> SessionLifecycleError {
        if session.backend() == &self.backend && session.state() == SessionState::Stopped {
            SessionLifecycleError::InvalidState {
                session_id: session.id(),
                from: SessionState::Stopped,
                to,
            }
        } else {
            SessionLifecycleError::UnknownSession {
                session_id: session.id(),
                backend: self.backend.clone(),
            }
        }
    }

    fn active(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("backend", &self.backend)
            .field("matcher", &self.matcher)
            .field("max_sessions", &self.max_sessions)
            .field("active", &self.count())
            .finish_non_exhaustive()
    }
}
