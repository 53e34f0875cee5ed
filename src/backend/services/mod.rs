//! Orchestration services for backends and their sessions.

mod backend;
mod ordering;
mod registry;

pub use backend::{Backend, default_pool};
pub use ordering::{BackendOrderingPolicy, Ranked};
pub use registry::SessionRegistry;
