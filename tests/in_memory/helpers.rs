//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use farmgate::backend::domain::BackendKind;
use farmgate::backend::services::{Backend, default_pool};
use farmgate::config::{GatewayConfig, RetryPolicy, StaticEnvironment};
use farmgate::credentials::{BROWSER_STACK_KEY_VAR, BROWSER_STACK_USER_VAR, CredentialStore};
use farmgate::proxy::RemoteProxy;
use farmgate::reporting::{
    adapters::memory::{InMemoryAggregator, ScriptedReportingApi},
    services::MetadataRetriever,
};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use serde_json::Value;

/// Proxy type wired to the in-memory reporting adapters.
pub type TestProxy = RemoteProxy<ScriptedReportingApi, InMemoryAggregator, DefaultClock>;

/// Retriever type wired to the in-memory reporting adapters.
pub type TestRetriever = MetadataRetriever<ScriptedReportingApi, InMemoryAggregator, DefaultClock>;

/// Account name configured for the cloud provider.
pub const ACCOUNT: &str = "zalando";
/// Access key configured for the cloud provider.
pub const ACCESS_KEY: &str = "s3cr3t";

/// Report of a native app session on a Pixel device.
pub const APP_REPORT: &str =
    include_str!("../fixtures/browserstack_appium_app_testinformation.json");

/// Parses a JSON fixture.
#[must_use]
pub fn document(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture should be valid JSON")
}

/// App Automate reporting URL for `session_id`.
#[must_use]
pub fn app_automate_url(session_id: &str) -> String {
    format!("https://api-cloud.browserstack.com/app-automate/sessions/{session_id}.json")
}

/// Automate reporting URL for `session_id`.
#[must_use]
pub fn automate_url(session_id: &str) -> String {
    format!("https://api.browserstack.com/automate/sessions/{session_id}.json")
}

/// Provides the default backend pool.
#[fixture]
pub fn pool() -> Vec<Arc<Backend>> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    default_pool(&GatewayConfig::default(), clock).expect("default pool should build")
}

/// Provides a credential store with cloud secrets configured.
#[fixture]
pub fn store() -> CredentialStore {
    CredentialStore::new(Arc::new(
        StaticEnvironment::new()
            .with(BROWSER_STACK_USER_VAR, ACCOUNT)
            .with(BROWSER_STACK_KEY_VAR, ACCESS_KEY),
    ))
}

/// Provides an empty aggregator.
#[fixture]
pub fn aggregator() -> InMemoryAggregator {
    InMemoryAggregator::new()
}

/// Builds a retriever over clones of the given adapters.
///
/// Clones share state, so callers keep their copy to inspect reads and
/// publications.
#[must_use]
pub fn build_retriever(
    api: &ScriptedReportingApi,
    aggregator: &InMemoryAggregator,
) -> Arc<TestRetriever> {
    Arc::new(MetadataRetriever::new(
        Arc::new(api.clone()),
        Arc::new(aggregator.clone()),
        Arc::new(DefaultClock),
    ))
}

/// Builds a proxy for the pool backend of the given kind.
#[must_use]
pub fn build_proxy(
    pool: &[Arc<Backend>],
    kind: BackendKind,
    store: &CredentialStore,
    policy: RetryPolicy,
    retriever: Arc<TestRetriever>,
) -> TestProxy {
    let backend = pool
        .iter()
        .find(|candidate| candidate.kind() == kind)
        .cloned()
        .expect("pool should contain the requested kind");
    RemoteProxy::new(backend, store, policy, retriever)
}
