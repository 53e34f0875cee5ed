//! Post-session metadata retrieval.
//!
//! When a session ends, [`services::MetadataRetriever`] polls the provider's
//! reporting API until the session's artefacts (video, test name, platform
//! label) are available, then publishes a [`domain::TestInformation`] record
//! to the results aggregator. The layout follows the crate's hexagonal
//! convention:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
