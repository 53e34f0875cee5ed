//! Selection order across registered backends.

use crate::backend::domain::{BackendRank, CapabilitySet, Session};
use crate::backend::services::Backend;
use std::sync::Arc;
use tracing::debug;

/// Anything that can be placed in the backend selection order.
pub trait Ranked {
    /// Returns the rank; lower ranks are tried first.
    fn rank(&self) -> BackendRank;
}

impl Ranked for Backend {
    fn rank(&self) -> BackendRank {
        Self::rank(self)
    }
}

impl<T: Ranked + ?Sized> Ranked for Arc<T> {
    fn rank(&self) -> BackendRank {
        (**self).rank()
    }
}

/// Orders backends so self-hosted capacity is preferred over cloud fallback.
///
/// Backends of equal rank keep their registration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendOrderingPolicy;

impl BackendOrderingPolicy {
    /// Returns `backends` in selection order.
    #[must_use]
    pub fn order<'a, T: Ranked>(&self, backends: &'a [T]) -> Vec<&'a T> {
        let mut ordered: Vec<&T> = backends.iter().collect();
        ordered.sort_by_key(|backend| backend.rank());
        ordered
    }

    /// Creates a session on the first backend, in selection order, that
    /// accepts `requested` and has a free slot.
    #[must_use]
    pub fn select<'a>(
        &self,
        backends: &'a [Arc<Backend>],
        requested: &CapabilitySet,
    ) -> Option<(&'a Arc<Backend>, Arc<Session>)> {
        let selected = self.order(backends).into_iter().find_map(|backend| {
            backend
                .create_session(requested)
                .map(|session| (backend, session))
        });
        if selected.is_none() {
            debug!(candidates = backends.len(), "no backend can serve the request");
        }
        selected
    }
}
