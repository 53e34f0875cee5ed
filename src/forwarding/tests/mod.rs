//! Unit tests for the forwarding module.
