//! Declared issue reconciliation.
//!
//! Keeps a remote GitHub issue in step with a locally declared resource:
//! the reconciler creates, updates, and closes the remote issue to match the
//! declaration and projects the observed remote state back into status
//! conditions. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
