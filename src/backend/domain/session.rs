//! Session aggregate and its lifecycle states.

use super::{BackendName, CapabilitySet, ExternalSessionId, SessionId, SessionLifecycleError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A slot is reserved but the backend has not confirmed the session.
    Created,
    /// The backend assigned an external session identifier.
    Running,
    /// The session ended and its slot was released.
    Stopped,
}

impl SessionState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// A session may stop before the backend ever confirmed it.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Created, Self::Running | Self::Stopped) | (Self::Running, Self::Stopped)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the post-session metadata retrieval.
///
/// `Idle -> Claimed -> Fetching -> (Delivered | TimedOut | Failed | Abandoned)`;
/// `Skipped` is reached straight from `Claimed` when there is nothing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalState {
    /// No retrieval has been requested.
    Idle,
    /// A retrieval task owns the session.
    Claimed,
    /// The reporting API is being polled.
    Fetching,
    /// Metadata was published to the aggregator.
    Delivered,
    /// The deadline elapsed before metadata became available.
    TimedOut,
    /// Metadata was found but the aggregator rejected it.
    Failed,
    /// Shutdown cancelled the retrieval.
    Abandoned,
    /// There was nothing to retrieve for this session.
    Skipped,
}

impl RetrievalState {
    const ALL: [Self; 8] = [
        Self::Idle,
        Self::Claimed,
        Self::Fetching,
        Self::Delivered,
        Self::TimedOut,
        Self::Failed,
        Self::Abandoned,
        Self::Skipped,
    ];

    const fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(raw: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|state| state.as_u8() == raw)
            .unwrap_or(Self::Idle)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Delivered => "delivered",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Skipped => "skipped",
        }
    }

    /// Returns whether the retrieval has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::TimedOut | Self::Failed | Self::Abandoned | Self::Skipped
        )
    }
}

impl fmt::Display for RetrievalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: SessionState,
    external_id: Option<ExternalSessionId>,
    updated_at: DateTime<Utc>,
}

/// One session tracked against a backend.
///
/// Sessions are shared between the request path and retrieval tasks, so the
/// mutable lifecycle sits behind a mutex and the retrieval flag is atomic.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    backend: BackendName,
    capabilities: CapabilitySet,
    created_at: DateTime<Utc>,
    lifecycle: Mutex<Lifecycle>,
    retrieval: AtomicU8,
}

impl Session {
    /// Creates a session in the `Created` state.
    #[must_use]
    pub fn new<C>(backend: BackendName, capabilities: CapabilitySet, clock: &C) -> Self
    where
        C: Clock + ?Sized,
    {
        let timestamp = clock.utc();
        Self {
            id: SessionId::new(),
            backend,
            capabilities,
            created_at: timestamp,
            lifecycle: Mutex::new(Lifecycle {
                state: SessionState::Created,
                external_id: None,
                updated_at: timestamp,
            }),
            retrieval: AtomicU8::new(RetrievalState::Idle.as_u8()),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the name of the owning backend.
    #[must_use]
    pub const fn backend(&self) -> &BackendName {
        &self.backend
    }

    /// Returns the capabilities the session was created from.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lifecycle().state
    }

    /// Returns the backend-assigned identifier, once attached.
    #[must_use]
    pub fn external_id(&self) -> Option<ExternalSessionId> {
        self.lifecycle().external_id.clone()
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.lifecycle().updated_at
    }

    /// Attaches the backend-assigned identifier, moving `Created -> Running`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::InvalidState`] when the session is not
    /// in the `Created` state; an attached identifier never changes.
    pub fn attach_external_id<C>(
        &self,
        external_id: ExternalSessionId,
        clock: &C,
    ) -> Result<(), SessionLifecycleError>
    where
        C: Clock + ?Sized,
    {
        let mut lifecycle = self.lifecycle();
        self.ensure_transition(lifecycle.state, SessionState::Running)?;
        lifecycle.state = SessionState::Running;
        lifecycle.external_id = Some(external_id);
        lifecycle.updated_at = clock.utc();
        Ok(())
    }

    /// Marks the session as stopped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::InvalidState`] when the session was
    /// already stopped.
    pub fn mark_stopped<C>(&self, clock: &C) -> Result<(), SessionLifecycleError>
    where
        C: Clock + ?Sized,
    {
        let mut lifecycle = self.lifecycle();
        self.ensure_transition(lifecycle.state, SessionState::Stopped)?;
        lifecycle.state = SessionState::Stopped;
        lifecycle.updated_at = clock.utc();
        Ok(())
    }

    /// Returns the metadata retrieval state.
    #[must_use]
    pub fn retrieval_state(&self) -> RetrievalState {
        RetrievalState::from_u8(self.retrieval.load(Ordering::Acquire))
    }

    /// Claims the session for metadata retrieval.
    ///
    /// Returns `true` for exactly one caller; every later or concurrent call
    /// returns `false`.
    #[must_use]
    pub fn claim_retrieval(&self) -> bool {
        self.retrieval
            .compare_exchange(
                RetrievalState::Idle.as_u8(),
                RetrievalState::Claimed.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Records retrieval progress after a successful claim.
    pub(crate) fn advance_retrieval(&self, state: RetrievalState) {
        self.retrieval.store(state.as_u8(), Ordering::Release);
    }

    const fn ensure_transition(
        &self,
        from: SessionState,
        to: SessionState,
    ) -> Result<(), SessionLifecycleError> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(SessionLifecycleError::InvalidState {
                session_id: self.id,
                from,
                to,
            })
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
