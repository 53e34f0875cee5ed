//! Adapter implementations for the reporting ports.

pub mod memory;

mod http;

pub use http::HttpReportingApi;
