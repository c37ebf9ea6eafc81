//! Adapter implementations for the issue reconciliation ports.

pub mod github;
pub mod memory;
