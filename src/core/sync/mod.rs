// Review reconciliation against the repository

pub mod reconciler;
pub mod summary;

pub use reconciler::Reconciler;
pub use summary::{SyncError, SyncSummary};
