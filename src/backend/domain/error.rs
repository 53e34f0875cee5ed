//! Error types for backend domain validation and session lifecycle.

use super::{BackendName, SessionId, SessionState};
use thiserror::Error;

/// Errors returned while constructing backend domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendDomainError {
    /// The backend name is empty after trimming.
    #[error("backend name must not be empty")]
    EmptyBackendName,

    /// The backend name contains characters outside `[a-z0-9_-]`.
    #[error("backend name '{0}' may only contain lowercase letters, digits, '_' and '-'")]
    InvalidBackendName(String),

    /// The backend name exceeds 64 characters.
    #[error("backend name exceeds 64 characters: {0}")]
    BackendNameTooLong(String),

    /// The external session identifier is empty after trimming.
    #[error("external session identifier must not be empty")]
    EmptyExternalSessionId,

    /// The hub URL does not have an `http://` or `https://` prefix.
    #[error("hub URL '{0}' must start with 'http://' or 'https://'")]
    InvalidHubUrl(String),

    /// The backend was configured without any session slot.
    #[error("backend {0} must allow at least one concurrent session")]
    ZeroCapacity(BackendName),
}

/// Error returned while parsing a backend kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown backend kind: {0}")]
pub struct ParseBackendKindError(pub String);

/// Contract violations in the session lifecycle.
///
/// These indicate a bug in the caller (for example releasing a slot twice)
/// rather than an expected runtime condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionLifecycleError {
    /// The requested transition is not allowed from the current state.
    #[error("invalid state for session {session_id}: {from} -> {to}")]
    InvalidState {
        /// Session identifier.
        session_id: SessionId,
        /// Current lifecycle state.
        from: SessionState,
        /// Requested lifecycle state.
        to: SessionState,
    },

    /// The session belongs to another backend.
    #[error("session {session_id} is not tracked by backend {backend}")]
    UnknownSession {
        /// Session identifier.
        session_id: SessionId,
        /// Backend asked to handle the session.
        backend: BackendName,
    },
}
