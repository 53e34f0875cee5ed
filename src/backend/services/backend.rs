//! Registered backends.

use crate::backend::domain::{
    BackendDomainError, BackendKind, BackendName, BackendRank, CapabilityMatcher, CapabilitySet,
    ExternalSessionId, ProviderProfile, Session, SessionLifecycleError,
};
use crate::backend::services::SessionRegistry;
use crate::config::GatewayConfig;
use mockable::Clock;
use std::sync::Arc;

/// One execution backend: identity, provider profile and session slots.
///
/// Every backend class shares this shape; the [`BackendKind`] tag decides
/// its rank and the [`ProviderProfile`] carries the per-provider details.
#[derive(Debug)]
pub struct Backend {
    name: BackendName,
    kind: BackendKind,
    profile: Arc<ProviderProfile>,
    sessions: SessionRegistry,
}

impl Backend {
    /// Creates a backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::ZeroCapacity`] when `max_sessions` is
    /// zero.
    pub fn new(
        name: BackendName,
        kind: BackendKind,
        profile: ProviderProfile,
        matcher: CapabilityMatcher,
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendDomainError> {
        if max_sessions == 0 {
            return Err(BackendDomainError::ZeroCapacity(name));
        }
        Ok(Self {
            sessions: SessionRegistry::new(name.clone(), matcher, max_sessions, clock),
            name,
            kind,
            profile: Arc::new(profile),
        })
    }

    /// Creates the self-hosted Docker Selenium farm backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError`] when `hub_url` is not an HTTP(S) URL or
    /// `max_sessions` is zero.
    pub fn local_farm(
        hub_url: impl Into<String>,
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendDomainError> {
        let profile = ProviderProfile::local_farm(hub_url)?;
        Self::from_profile(
            BackendKind::LocalFarm,
            profile,
            CapabilityMatcher::docker_selenium(),
            max_sessions,
            clock,
        )
    }

    /// Creates the `BrowserStack` fallback backend, which accepts every request.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::ZeroCapacity`] when `max_sessions` is
    /// zero.
    pub fn cloud(
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendDomainError> {
        Self::from_profile(
            BackendKind::CloudProvider,
            ProviderProfile::browserstack(),
            CapabilityMatcher::CatchAll,
            max_sessions,
            clock,
        )
    }

    /// Creates the `BrowserStack` Appium fallback backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::ZeroCapacity`] when `max_sessions` is
    /// zero.
    pub fn cloud_appium(
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendDomainError> {
        Self::from_profile(
            BackendKind::CloudAppiumProvider,
            ProviderProfile::browserstack_appium(),
            CapabilityMatcher::CatchAll,
            max_sessions,
            clock,
        )
    }

    fn from_profile(
        kind: BackendKind,
        profile: ProviderProfile,
        matcher: CapabilityMatcher,
        max_sessions: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendDomainError> {
        let name = BackendName::new(profile.file_prefix())?;
        Self::new(name, kind, profile, matcher, max_sessions, clock)
    }

    /// Returns the backend name.
    #[must_use]
    pub const fn name(&self) -> &BackendName {
        &self.name
    }

    /// Returns the backend class.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Returns the ordering rank.
    #[must_use]
    pub const fn rank(&self) -> BackendRank {
        self.kind.rank()
    }

    /// Returns the provider profile.
    #[must_use]
    pub const fn profile(&self) -> &Arc<ProviderProfile> {
        &self.profile
    }

    /// Returns the stable provider label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile.display_name()
    }

    /// Returns the video artifact extension.
    #[must_use]
    pub fn video_extension(&self) -> &str {
        self.profile.video_extension()
    }

    /// Returns the session registry.
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Returns whether this backend can serve `requested`.
    #[must_use]
    pub fn matches(&self, requested: &CapabilitySet) -> bool {
        self.sessions.matches(requested)
    }

    /// Reserves a session slot; see [`SessionRegistry::create_session`].
    #[must_use]
    pub fn create_session(&self, requested: &CapabilitySet) -> Option<Arc<Session>> {
        self.sessions.create_session(requested)
    }

    /// Attaches the backend-assigned session identifier.
    ///
    /// # Errors
    ///
    /// See [`SessionRegistry::attach_external_id`].
    pub fn attach_external_id(
        &self,
        session: &Session,
        external_id: ExternalSessionId,
    ) -> Result<(), SessionLifecycleError> {
        self.sessions.attach_external_id(session, external_id)
    }

    /// Stops a session and frees its slot.
    ///
    /// # Errors
    ///
    /// See [`SessionRegistry::release`].
    pub fn release(&self, session: &Session) -> Result<(), SessionLifecycleError> {
        self.sessions.release(session)
    }

    /// Returns the number of active sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sessions.count()
    }
}

/// Builds the default backend pool from configuration.
///
/// Backends are returned in registration order (cloud, Appium, local farm);
/// use [`BackendOrderingPolicy`](crate::backend::services::BackendOrderingPolicy)
/// to obtain the selection order.
///
/// # Errors
///
/// Returns [`BackendDomainError`] when the local farm URL is invalid.
pub fn default_pool(
    config: &GatewayConfig,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<Vec<Arc<Backend>>, BackendDomainError> {
    Ok(vec![
        Arc::new(Backend::cloud(
            config.max_sessions(BackendKind::CloudProvider),
            Arc::clone(&clock),
        )?),
        Arc::new(Backend::cloud_appium(
            config.max_sessions(BackendKind::CloudAppiumProvider),
            Arc::clone(&clock),
        )?),
        Arc::new(Backend::local_farm(
            config.local_farm_url.clone(),
            config.max_sessions(BackendKind::LocalFarm),
            clock,
        )?),
    ])
}
