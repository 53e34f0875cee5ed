//! In-memory integration tests for the proxy session lifecycle.

use std::sync::Arc;

use super::helpers::{
    ACCESS_KEY, ACCOUNT, APP_REPORT, aggregator, app_automate_url, automate_url, build_proxy,
    build_retriever, document, pool, store,
};
use farmgate::backend::{
    domain::{
        BackendKind, CapabilitySet, ExternalSessionId, RetrievalState, SessionLifecycleError,
        SessionState,
    },
    services::{Backend, BackendOrderingPolicy},
};
use farmgate::config::RetryPolicy;
use farmgate::credentials::CredentialStore;
use farmgate::forwarding::{ForwardedRequest, HttpMethod, RequestType};
use farmgate::reporting::{
    adapters::memory::{InMemoryAggregator, ScriptedReportingApi},
    domain::{RetrievalOutcome, SkipReason},
};
use rstest::rstest;
use serde_json::{Value, json};

const EXTERNAL_ID: &str = "X";
const APP_VIDEO_PREFIX: &str =
    "https://app-automate.browserstack.com/sessions/40693fb3fca7b00aac49e72908a648fcfa7af47a/video?token=";

fn android_app() -> CapabilitySet {
    CapabilitySet::new()
        .with("browserName", "chrome")
        .with("platformName", "ANDROID")
        .with("app", "EasyTravel")
}

fn chrome_on_linux() -> CapabilitySet {
    CapabilitySet::new()
        .with("browserName", "chrome")
        .with("platformName", "LINUX")
}

fn new_session_request() -> ForwardedRequest {
    ForwardedRequest::new(HttpMethod::Post, RequestType::StartSession, "/wd/hub/session").with_body(
        json!({"desiredCapabilities": {"browserName": "chrome", "platformName": "ANDROID"}})
            .to_string(),
    )
}

fn stop_session_request() -> ForwardedRequest {
    ForwardedRequest::new(
        HttpMethod::Delete,
        RequestType::StopSession,
        format!("/wd/hub/session/{EXTERNAL_ID}"),
    )
}

fn external_id() -> ExternalSessionId {
    ExternalSessionId::new(EXTERNAL_ID).expect("valid id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cloud_session_is_forwarded_and_reported_once(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let report_url = app_automate_url(EXTERNAL_ID);
    let api = ScriptedReportingApi::new().with_report(report_url.clone(), 0, document(APP_REPORT));
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    );
    assert_eq!(proxy.count(), 0);

    let (backend, session) = BackendOrderingPolicy
        .select(&pool, &android_app())
        .expect("cloud should accept the app session");
    assert_eq!(backend.name(), proxy.backend().name());
    assert_eq!(proxy.count(), 1);

    let forwarded = proxy
        .before_command(&session, new_session_request())
        .expect("creation body should be rewritten");
    let body: Value = serde_json::from_str(forwarded.body()).expect("body should be JSON");
    assert_eq!(
        body.pointer("/desiredCapabilities/browserstack.user"),
        Some(&json!(ACCOUNT))
    );
    assert_eq!(
        body.pointer("/desiredCapabilities/browserstack.key"),
        Some(&json!(ACCESS_KEY))
    );

    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");
    assert_eq!(session.state(), SessionState::Running);

    let handle = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should release the slot")
        .expect("retrieval should be triggered");
    assert_eq!(proxy.count(), 0);

    let info = match handle.await.expect("retrieval task should not panic") {
        RetrievalOutcome::Delivered(info) => info,
        other => panic!("expected delivered outcome, got {other:?}"),
    };
    assert_eq!(info.test_name(), "loadZalandoPageAndCheckTitle");
    assert!(
        info.file_name()
            .contains("browserstack_loadZalandoPageAndCheckTitle_Google_Pixel_3_android"),
        "unexpected file name {}",
        info.file_name()
    );
    assert_eq!(info.browser_and_platform(), "Google Pixel 3 app, android 9.0");
    assert!(info.video_url().starts_with(APP_VIDEO_PREFIX));
    assert_eq!(info.external_id().as_str(), EXTERNAL_ID);

    assert_eq!(api.read_count(&report_url), 1);
    assert_eq!(aggregator.published(), vec![info]);
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.retrieval_state(), RetrievalState::Delivered);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reporting_reads_carry_the_configured_credentials(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let api = ScriptedReportingApi::new().with_report(
        automate_url(EXTERNAL_ID),
        0,
        document(APP_REPORT),
    );
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    );
    let session = proxy
        .new_session(&android_app())
        .expect("cloud should accept");
    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");

    let outcome = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should succeed")
        .expect("retrieval should be triggered")
        .await
        .expect("retrieval task should not panic");

    assert!(outcome.is_delivered());
    let reads = api.reads();
    assert_eq!(reads.len(), 1);
    let read = reads.first().expect("one read");
    assert_eq!(read.url, automate_url(EXTERNAL_ID));
    assert_eq!(read.credentials.account(), ACCOUNT);
    assert_eq!(read.credentials.access_key(), ACCESS_KEY);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_terminations_read_the_report_once(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let report_url = app_automate_url(EXTERNAL_ID);
    let api = ScriptedReportingApi::new().with_report(report_url.clone(), 0, document(APP_REPORT));
    let proxy = Arc::new(build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    ));
    let session = proxy
        .new_session(&android_app())
        .expect("cloud should accept");
    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");

    let terminations: Vec<_> = (0..2)
        .map(|_| {
            let shared_proxy = Arc::clone(&proxy);
            let shared_session = Arc::clone(&session);
            tokio::spawn(async move {
                shared_proxy.after_command(&shared_session, &stop_session_request())
            })
        })
        .collect();

    let mut handles = Vec::new();
    let mut rejected = 0;
    for termination in terminations {
        match termination.await.expect("termination should not panic") {
            Ok(Some(handle)) => handles.push(handle),
            Ok(None) => {}
            Err(SessionLifecycleError::InvalidState { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    assert_eq!(handles.len(), 1);
    assert_eq!(rejected, 1);
    for handle in handles {
        let outcome = handle.await.expect("retrieval task should not panic");
        assert!(outcome.is_delivered());
    }
    assert_eq!(api.read_count(&report_url), 1);
    assert_eq!(aggregator.len(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unready_reports_time_out_without_publishing(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let api = ScriptedReportingApi::new();
    let retriever = build_retriever(&api, &aggregator);
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudAppiumProvider,
        &store,
        RetryPolicy::quick(),
        Arc::clone(&retriever),
    );
    let session = proxy
        .new_session(&android_app())
        .expect("appium backend should accept");
    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");

    let outcome = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should succeed")
        .expect("retrieval should be triggered")
        .await
        .expect("retrieval task should not panic");

    assert!(matches!(outcome, RetrievalOutcome::TimedOut));
    assert!(api.read_count(&app_automate_url(EXTERNAL_ID)) > 1);
    assert!(aggregator.is_empty());
    assert_eq!(retriever.timed_out(), 1);
    assert_eq!(session.retrieval_state(), RetrievalState::TimedOut);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_abandons_in_flight_retrievals(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let api = ScriptedReportingApi::new();
    let retriever = build_retriever(&api, &aggregator);
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::default(),
        Arc::clone(&retriever),
    );
    let session = proxy
        .new_session(&android_app())
        .expect("cloud should accept");
    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");
    let handle = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should succeed")
        .expect("retrieval should be triggered");

    retriever.shutdown();
    let outcome = handle.await.expect("retrieval task should not panic");

    assert!(matches!(outcome, RetrievalOutcome::Abandoned));
    assert!(aggregator.is_empty());
    assert_eq!(session.retrieval_state(), RetrievalState::Abandoned);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn local_farm_sessions_skip_reporting(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let api = ScriptedReportingApi::new();
    let proxy = build_proxy(
        &pool,
        BackendKind::LocalFarm,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    );
    let session = proxy
        .new_session(&chrome_on_linux())
        .expect("local farm should accept chrome");

    let request = new_session_request();
    let forwarded = proxy
        .before_command(&session, request.clone())
        .expect("local farm forwards unchanged");
    assert_eq!(forwarded, request);

    proxy
        .on_session_started(&session, external_id())
        .expect("external id should attach");
    let outcome = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should succeed")
        .expect("retrieval should be triggered")
        .await
        .expect("retrieval task should not panic");

    assert!(matches!(
        outcome,
        RetrievalOutcome::Skipped(SkipReason::NoReportingEndpoint)
    ));
    assert!(api.reads().is_empty());
    assert!(aggregator.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unconfirmed_sessions_skip_reporting(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
) {
    let api = ScriptedReportingApi::new();
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    );
    let session = proxy
        .new_session(&android_app())
        .expect("cloud should accept");

    let outcome = proxy
        .after_command(&session, &stop_session_request())
        .expect("termination should succeed")
        .expect("retrieval should be triggered")
        .await
        .expect("retrieval task should not panic");

    assert!(matches!(
        outcome,
        RetrievalOutcome::Skipped(SkipReason::MissingExternalId)
    ));
    assert!(api.reads().is_empty());
    assert_eq!(proxy.count(), 0);
}

#[rstest]
#[case::read(ForwardedRequest::new(
    HttpMethod::Get,
    RequestType::Regular,
    "/wd/hub/session/X/url"
))]
#[case::command(ForwardedRequest::new(
    HttpMethod::Post,
    RequestType::Regular,
    "/wd/hub/session/X/url"
))]
#[case::delete_element(ForwardedRequest::new(
    HttpMethod::Delete,
    RequestType::Regular,
    "/wd/hub/session/X/cookie"
))]
#[tokio::test(flavor = "multi_thread")]
async fn other_commands_keep_the_session_open(
    pool: Vec<Arc<Backend>>,
    store: CredentialStore,
    aggregator: InMemoryAggregator,
    #[case] request: ForwardedRequest,
) {
    let api = ScriptedReportingApi::new();
    let proxy = build_proxy(
        &pool,
        BackendKind::CloudProvider,
        &store,
        RetryPolicy::quick(),
        build_retriever(&api, &aggregator),
    );
    let session = proxy
        .new_session(&android_app())
        .expect("cloud should accept");

    let forwarded = proxy
        .before_command(&session, request.clone())
        .expect("non-creation commands pass through");
    let triggered = proxy
        .after_command(&session, &request)
        .expect("non-termination commands never fail");

    assert_eq!(forwarded, request);
    assert!(triggered.is_none());
    assert_eq!(proxy.count(), 1);
    assert_eq!(session.retrieval_state(), RetrievalState::Idle);
}
