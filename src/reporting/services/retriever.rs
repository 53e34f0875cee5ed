//! Background retrieval of session metadata.
//!
//! Provides [`MetadataRetriever`], which claims a stopped session once and
//! spawns a task that polls the provider's reporting API on a fixed interval
//! until the report is ready or the deadline elapses.

use crate::backend::domain::{
    ExternalSessionId, ProviderProfile, RetrievalState, Session, SessionState,
};
use crate::config::RetryPolicy;
use crate::credentials::Credentials;
use crate::reporting::{
    domain::{RetrievalOutcome, SessionReport, SkipReason},
    ports::{ReportingApi, ResultsAggregator},
};
use mockable::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Where and how to fetch a session's metadata.
#[derive(Debug, Clone)]
pub struct RetrievalTarget {
    profile: Arc<ProviderProfile>,
    credentials: Credentials,
    policy: RetryPolicy,
}

impl RetrievalTarget {
    /// Creates a retrieval target.
    #[must_use]
    pub const fn new(
        profile: Arc<ProviderProfile>,
        credentials: Credentials,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            profile,
            credentials,
            policy,
        }
    }

    /// Returns the provider profile.
    #[must_use]
    pub const fn profile(&self) -> &Arc<ProviderProfile> {
        &self.profile
    }

    /// Returns the credentials sent to the reporting API.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the polling policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[derive(Debug, Default)]
struct RetrievalStats {
    delivered: AtomicUsize,
    timed_out: AtomicUsize,
    attempts: AtomicUsize,
}

/// Retrieves and publishes metadata for stopped sessions.
///
/// Each session is retrieved at most once: [`MetadataRetriever::trigger`]
/// claims the session atomically and every later call for it is a no-op.
/// Retrieval runs on a spawned task, off the request path.
pub struct MetadataRetriever<A, G, C>
where
    A: ReportingApi + 'static,
    G: ResultsAggregator + 'static,
    C: Clock + Send + Sync + 'static,
{
    api: Arc<A>,
    aggregator: Arc<G>,
    clock: Arc<C>,
    shutdown: CancellationToken,
    stats: Arc<RetrievalStats>,
}

impl<A, G, C> MetadataRetriever<A, G, C>
where
    A: ReportingApi + 'static,
    G: ResultsAggregator + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a retriever.
    #[must_use]
    pub fn new(api: Arc<A>, aggregator: Arc<G>, clock: Arc<C>) -> Self {
        Self {
            api,
            aggregator,
            clock,
            shutdown: CancellationToken::new(),
            stats: Arc::new(RetrievalStats::default()),
        }
    }

    /// Starts retrieval for a stopped session.
    ///
    /// Returns `None` when the session has not stopped yet (it stays
    /// unclaimed), when it was already claimed, or when no Tokio runtime is
    /// available (the session is then marked abandoned).
    #[must_use]
    pub fn trigger(
        &self,
        session: &Arc<Session>,
        target: RetrievalTarget,
    ) -> Option<JoinHandle<RetrievalOutcome>> {
        let state = session.state();
        if state != SessionState::Stopped {
            debug!(
                session_id = %session.id(),
                %state,
                "session still active; retrieval deferred"
            );
            return None;
        }
        if !session.claim_retrieval() {
            debug!(session_id = %session.id(), "retrieval already claimed");
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(session_id = %session.id(), "no async runtime; retrieval abandoned");
            session.advance_retrieval(RetrievalState::Abandoned);
            return None;
        };

        let task = RetrievalTask {
            api: Arc::clone(&self.api),
            aggregator: Arc::clone(&self.aggregator),
            clock: Arc::clone(&self.clock),
            shutdown: self.shutdown.clone(),
            stats: Arc::clone(&self.stats),
            session: Arc::clone(session),
            target,
        };
        Some(runtime.spawn(task.run()))
    }

    /// Cancels every in-flight retrieval. Nothing is published afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns whether [`MetadataRetriever::shutdown`] was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Returns how many records were published.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.stats.delivered.load(Ordering::Acquire)
    }

    /// Returns how many retrievals reached their deadline.
    #[must_use]
    pub fn timed_out(&self) -> usize {
        self.stats.timed_out.load(Ordering::Acquire)
    }

    /// Returns how many polling rounds ran across all retrievals.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.stats.attempts.load(Ordering::Acquire)
    }
}

struct RetrievalTask<A, G, C> {
    api: Arc<A>,
    aggregator: Arc<G>,
    clock: Arc<C>,
    shutdown: CancellationToken,
    stats: Arc<RetrievalStats>,
    session: Arc<Session>,
    target: RetrievalTarget,
}

impl<A, G, C> RetrievalTask<A, G, C>
where
    A: ReportingApi + 'static,
    G: ResultsAggregator + 'static,
    C: Clock + Send + Sync + 'static,
{
    #[instrument(
        name = "retrieve_metadata",
        skip_all,
        fields(session_id = %self.session.id(), backend = %self.session.backend())
    )]
    async fn run(self) -> RetrievalOutcome {
        let outcome = self.retrieve().await;
        self.session.advance_retrieval(outcome.state());
        outcome
    }

    async fn retrieve(&self) -> RetrievalOutcome {
        let Some(external_id) = self.session.external_id() else {
            debug!("session never started; nothing to retrieve");
            return RetrievalOutcome::Skipped(SkipReason::MissingExternalId);
        };
        let urls = self.target.profile.reporting_urls(&external_id);
        if urls.is_empty() {
            debug!("backend has no reporting API");
            return RetrievalOutcome::Skipped(SkipReason::NoReportingEndpoint);
        }

        self.session.advance_retrieval(RetrievalState::Fetching);
        let deadline = self.target.policy.deadline();
        let polled = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => None,
            result = time::timeout(deadline, self.poll_until_ready(&urls)) => Some(result),
        };

        match polled {
            None => {
                info!(%external_id, "retrieval abandoned on shutdown");
                RetrievalOutcome::Abandoned
            }
            Some(Err(_elapsed)) => {
                self.stats.timed_out.fetch_add(1, Ordering::AcqRel);
                warn!(%external_id, ?deadline, "metadata not available before deadline");
                RetrievalOutcome::TimedOut
            }
            Some(Ok(report)) => self.publish(report, &external_id).await,
        }
    }

    async fn poll_until_ready(&self, urls: &[String]) -> SessionReport {
        let mut ticker = time::interval(self.target.policy.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let attempt = self.stats.attempts.fetch_add(1, Ordering::AcqRel) + 1;
            for url in urls {
                if let Some(report) = self.read(url, attempt).await {
                    return report;
                }
            }
        }
    }

    async fn read(&self, url: &str, attempt: usize) -> Option<SessionReport> {
        let fetched = self.api.fetch_report(url, &self.target.credentials).await;
        let document = match fetched {
            Ok(Some(found)) => found,
            Ok(None) => {
                debug!(attempt, url, "report not available yet");
                return None;
            }
            Err(err) => {
                warn!(attempt, url, error = %err, "reporting API read failed");
                return None;
            }
        };
        match SessionReport::parse(&document) {
            Ok(Some(report)) => Some(report),
            Ok(None) => {
                debug!(attempt, url, "report not finalised yet");
                None
            }
            Err(err) => {
                warn!(attempt, url, error = %err, "malformed report");
                None
            }
        }
    }

    async fn publish(
        &self,
        report: SessionReport,
        external_id: &ExternalSessionId,
    ) -> RetrievalOutcome {
        if self.shutdown.is_cancelled() {
            return RetrievalOutcome::Abandoned;
        }
        let information =
            report.into_test_information(&self.target.profile, external_id, self.clock.utc());
        match self.aggregator.publish(information.clone()).await {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::AcqRel);
                info!(
                    %external_id,
                    test_name = information.test_name(),
                    "test information published"
                );
                RetrievalOutcome::Delivered(information)
            }
            Err(err) => {
                error!(%external_id, error = %err, "aggregator rejected test information");
                RetrievalOutcome::Failed(err)
            }
        }
    }
}
