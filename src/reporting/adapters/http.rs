//! Reporting API adapter over HTTPS.

use crate::credentials::Credentials;
use crate::reporting::ports::{ReportingApi, ReportingApiError, ReportingApiResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads session reports with authenticated `GET` requests.
#[derive(Debug, Clone)]
pub struct HttpReportingApi {
    client: reqwest::Client,
}

impl HttpReportingApi {
    /// Creates an adapter whose requests time out after `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingApiError::Transport`] when the HTTP client cannot be
    /// built (for example when no TLS backend is available).
    pub fn new(request_timeout: Duration) -> ReportingApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ReportingApiError::transport)?;
        Ok(Self { client })
    }

    /// Creates an adapter with a 10 second request timeout.
    ///
    /// # Errors
    ///
    /// See [`HttpReportingApi::new`].
    pub fn with_default_timeout() -> ReportingApiResult<Self> {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportingApi for HttpReportingApi {
    #[instrument(skip(self, credentials))]
    async fn fetch_report(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> ReportingApiResult<Option<Value>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .basic_auth(credentials.account(), Some(credentials.access_key()))
            .send()
            .await
            .map_err(ReportingApiError::transport)?;

        let status = response.status();
        debug!(%status, "reporting API responded");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ReportingApiError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(ReportingApiError::transport)?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(ReportingApiError::invalid_body)
    }
}
