//! Backend selection and session slot tracking.
//!
//! This module decides which registered backend can serve a requested
//! capability set, orders backends so self-hosted capacity is preferred over
//! cloud fallback, and tracks per-backend sessions against a concurrency
//! limit. It follows the crate's hexagonal layout:
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;
