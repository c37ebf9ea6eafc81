//! Application services for declared issue reconciliation.

mod finalizer;
mod reconciler;

pub use finalizer::FinalizerManager;
pub use reconciler::{IssueReconciler, ReconcileError, ReconcileOutcome, ReconcileResult};
