//! Port contracts for the reporting API and the results aggregator.

mod aggregator;
mod api;

pub use aggregator::{AggregatorError, AggregatorResult, ResultsAggregator};
pub use api::{ReportingApi, ReportingApiError, ReportingApiResult};
