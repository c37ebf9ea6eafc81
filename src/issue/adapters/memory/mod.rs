//! In-memory adapters for the store and tracker ports.

mod store;
mod tracker;

pub use store::InMemoryResourceStore;
pub use tracker::{InMemoryIssueTracker, TrackerOperation};
