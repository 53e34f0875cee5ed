//! In-memory adapters for the reporting ports.

use crate::credentials::Credentials;
use crate::reporting::{
    domain::TestInformation,
    ports::{
        AggregatorError, AggregatorResult, ReportingApi, ReportingApiError, ReportingApiResult,
        ResultsAggregator,
    },
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe aggregator that keeps published records in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAggregator {
    state: Arc<RwLock<Vec<TestInformation>>>,
}

impl InMemoryAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the published records in publication order.
    #[must_use]
    pub fn published(&self) -> Vec<TestInformation> {
        self.state
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the number of published records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Returns whether nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultsAggregator for InMemoryAggregator {
    async fn publish(&self, information: TestInformation) -> AggregatorResult<()> {
        let mut records = self
            .state
            .write()
            .map_err(|err| AggregatorError::storage(std::io::Error::other(err.to_string())))?;
        records.push(information);
        Ok(())
    }
}

/// One read observed by [`ScriptedReportingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRead {
    /// Requested URL.
    pub url: String,
    /// Credentials sent with the request.
    pub credentials: Credentials,
}

#[derive(Debug, Clone)]
enum Script {
    Ready { pending: usize, document: Value },
    Failing { status: u16 },
}

#[derive(Debug, Default)]
struct ScriptedState {
    scripts: HashMap<String, Script>,
    reads: Vec<RecordedRead>,
}

/// Reporting API stand-in answering from per-URL scripts.
///
/// Unscripted URLs answer "not ready". Every read is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReportingApi {
    state: Arc<RwLock<ScriptedState>>,
}

impl ScriptedReportingApi {
    /// Creates an API with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers "not ready" for the first `pending` reads of `url`, then
    /// returns `document`.
    #[must_use]
    pub fn with_report(self, url: impl Into<String>, pending: usize, document: Value) -> Self {
        self.insert(url.into(), Script::Ready { pending, document });
        self
    }

    /// Answers every read of `url` with an unexpected HTTP status.
    #[must_use]
    pub fn with_failure(self, url: impl Into<String>, status: u16) -> Self {
        self.insert(url.into(), Script::Failing { status });
        self
    }

    /// Returns every read in the order it happened.
    #[must_use]
    pub fn reads(&self) -> Vec<RecordedRead> {
        self.state
            .read()
            .map(|state| state.reads.clone())
            .unwrap_or_default()
    }

    /// Returns how many times `url` was read.
    #[must_use]
    pub fn read_count(&self, url: &str) -> usize {
        self.reads().iter().filter(|read| read.url == url).count()
    }

    fn insert(&self, url: String, script: Script) {
        if let Ok(mut state) = self.state.write() {
            state.scripts.insert(url, script);
        }
    }
}

#[async_trait]
impl ReportingApi for ScriptedReportingApi {
    async fn fetch_report(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> ReportingApiResult<Option<Value>> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ReportingApiError::transport(std::io::Error::other(err.to_string())))?;
        state.reads.push(RecordedRead {
            url: url.to_owned(),
            credentials: credentials.clone(),
        });

        match state.scripts.get_mut(url) {
            None => Ok(None),
            Some(Script::Failing { status }) => Err(ReportingApiError::UnexpectedStatus {
                url: url.to_owned(),
                status: *status,
            }),
            Some(Script::Ready { pending, .. }) if *pending > 0 => {
                *pending -= 1;
                Ok(None)
            }
            Some(Script::Ready { document, .. }) => Ok(Some(document.clone())),
        }
    }
}
