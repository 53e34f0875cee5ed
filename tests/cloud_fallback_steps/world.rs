//! Shared world state for cloud fallback BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use farmgate::backend::{domain::Session, services::Backend};
use farmgate::config::{RetryPolicy, StaticEnvironment};
use farmgate::credentials::{BROWSER_STACK_KEY_VAR, BROWSER_STACK_USER_VAR, CredentialStore};
use farmgate::proxy::RemoteProxy;
use farmgate::reporting::{
    adapters::memory::{InMemoryAggregator, ScriptedReportingApi},
    domain::RetrievalOutcome,
    services::MetadataRetriever,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Retriever type used by the BDD world.
pub type TestRetriever = MetadataRetriever<ScriptedReportingApi, InMemoryAggregator, DefaultClock>;

/// Proxy type used by the BDD world.
pub type TestProxy = RemoteProxy<ScriptedReportingApi, InMemoryAggregator, DefaultClock>;

/// Report of a native app session on a Pixel device.
pub const APP_REPORT: &str =
    include_str!("../fixtures/browserstack_appium_app_testinformation.json");

/// Short policy so timing-out scenarios finish quickly on a real clock.
pub const SCENARIO_POLICY: RetryPolicy =
    RetryPolicy::new(Duration::from_millis(20), Duration::from_millis(200));

/// Scenario world for cloud fallback behaviour tests.
pub struct GatewayWorld {
    /// Registered backends.
    pub pool: Vec<Arc<Backend>>,
    /// Reporting API shared with the retriever.
    pub api: ScriptedReportingApi,
    /// Aggregator shared with the retriever.
    pub aggregator: InMemoryAggregator,
    /// Retriever used by every proxy in the scenario.
    pub retriever: Arc<TestRetriever>,
    /// Credentials resolved by proxies.
    pub store: CredentialStore,
    /// Backend and session chosen by the last selection.
    pub selected: Option<(Arc<Backend>, Arc<Session>)>,
    /// Outcome of the last retrieval.
    pub outcome: Option<RetrievalOutcome>,
}

impl GatewayWorld {
    /// Creates a world with an empty pool and fresh reporting adapters.
    #[must_use]
    pub fn new() -> Self {
        let api = ScriptedReportingApi::new();
        let aggregator = InMemoryAggregator::new();
        let retriever = Arc::new(MetadataRetriever::new(
            Arc::new(api.clone()),
            Arc::new(aggregator.clone()),
            Arc::new(DefaultClock),
        ));
        let store = CredentialStore::new(Arc::new(
            StaticEnvironment::new()
                .with(BROWSER_STACK_USER_VAR, "zalando")
                .with(BROWSER_STACK_KEY_VAR, "s3cr3t"),
        ));
        Self {
            pool: Vec::new(),
            api,
            aggregator,
            retriever,
            store,
            selected: None,
            outcome: None,
        }
    }

    /// Returns the last selected backend and session.
    ///
    /// # Errors
    ///
    /// Returns an error when no session was selected yet.
    pub fn selected(&self) -> Result<(&Arc<Backend>, &Arc<Session>), eyre::Report> {
        self.selected
            .as_ref()
            .map(|(backend, session)| (backend, session))
            .ok_or_else(|| eyre::eyre!("no session selected in scenario world"))
    }

    /// Builds a proxy for the selected backend.
    ///
    /// # Errors
    ///
    /// Returns an error when no session was selected yet.
    pub fn selected_proxy(&self) -> Result<TestProxy, eyre::Report> {
        let (backend, _) = self.selected()?;
        Ok(RemoteProxy::new(
            Arc::clone(backend),
            &self.store,
            SCENARIO_POLICY,
            Arc::clone(&self.retriever),
        ))
    }

    /// Finds a backend by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool has no backend called `name`.
    pub fn backend(&self, name: &str) -> Result<&Arc<Backend>, eyre::Report> {
        self.pool
            .iter()
            .find(|backend| backend.name().as_str() == name)
            .ok_or_else(|| eyre::eyre!("no backend named '{name}' in the pool"))
    }
}

impl Default for GatewayWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> GatewayWorld {
    GatewayWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// App Automate reporting URL for `session_id`.
#[must_use]
pub fn app_automate_url(session_id: &str) -> String {
    format!("https://api-cloud.browserstack.com/app-automate/sessions/{session_id}.json")
}
