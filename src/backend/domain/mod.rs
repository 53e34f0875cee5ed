//! Domain model for backends and their sessions.
//!
//! Backends are registered once at start-up and live for the process
//! lifetime. Sessions are created against a backend when a capability
//! request matches, and move through `Created -> Running -> Stopped`.

mod capabilities;
mod error;
mod ids;
mod kind;
mod matcher;
mod name;
mod profile;
mod session;

pub use capabilities::{APP, BROWSER_NAME, CapabilitySet, PLATFORM, PLATFORM_NAME};
pub use error::{BackendDomainError, ParseBackendKindError, SessionLifecycleError};
pub use ids::{ExternalSessionId, SessionId};
pub use kind::{BackendKind, BackendRank};
pub use matcher::{CapabilityMatcher, SupportedBrowser};
pub use name::BackendName;
pub use profile::{ProviderProfile, SESSION_ID_PLACEHOLDER};
pub use session::{RetrievalState, Session, SessionState};
