//! Issue reconciler: keeps GitHub issues in step with declared resources.
//!
//! A declared issue names a repository URL, a title, and a description. Each
//! reconciliation pass makes sure a matching remote issue exists with that
//! body, closes it when the declaration is deleted, and records whether the
//! remote issue is open and has a linked pull request.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the resource store and tracker
//! - **Adapters**: In-memory implementations and a GitHub REST client
//!
//! # Modules
//!
//! - [`config`]: Environment-driven settings for the reconciler and client
//! - [`issue`]: Declared issue model, ports, adapters, and the reconciler

pub mod config;
pub mod issue;
