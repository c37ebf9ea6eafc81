//! Port contracts for issue reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces to the resource store and
//! the remote issue tracker.

pub mod store;
pub mod tracker;

pub use store::{ResourceStore, ResourceStoreError, ResourceStoreResult};
pub use tracker::{IssueTracker, IssueTrackerError, IssueTrackerResult};

