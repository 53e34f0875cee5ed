//! Farmgate: capability routing and session lifecycle in front of browser
//! execution backends.
//!
//! The crate decides which backend (a self-hosted device farm or a cloud
//! testing provider) serves a requested capability set, tracks sessions and
//! concurrency slots per backend, injects provider credentials into
//! session-creation requests, and retrieves execution metadata from the
//! provider's reporting API once a session ends.
//!
//! # Architecture
//!
//! Farmgate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory)
//!
//! # Modules
//!
//! - [`backend`]: Capability matching, backend ordering, and session slots
//! - [`forwarding`]: Credential injection for forwarded requests
//! - [`reporting`]: Post-session metadata retrieval and publication
//! - [`proxy`]: Per-backend façade used by the dispatch layer
//! - [`config`] and [`credentials`]: Process configuration and secrets
//! - [`telemetry`]: Tracing subscriber setup

pub mod backend;
pub mod config;
pub mod credentials;
pub mod forwarding;
pub mod proxy;
pub mod reporting;
pub mod telemetry;
