//! Step definitions for cloud fallback BDD scenarios.

pub mod world;

mod given;
mod when;
