//! Scheduled lifecycle pass
//!
//! One cron invocation pushes every `pending` publication through the
//! pipeline, each in its own working folder under the configured work
//! directory, and then reconciles the `in_review` backlog. The two phases are
//! independent: a failed pending run never stops the remaining rows, and the
//! reconciliation phase runs even when the pending phase went badly.

use crate::adapters::store::PublicationStore;
use crate::core::pipeline::PublicationPipeline;
use crate::core::sync::{Reconciler, SyncSummary};
use crate::domain::PublicationStatus;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Working folder for one publication under the work directory
pub fn publication_work_folder(work_dir: &Path, publication_id: i64) -> PathBuf {
    work_dir.join(format!("publication_{publication_id}"))
}

/// What one cron pass did
#[derive(Debug, Clone)]
pub struct CronSummary {
    /// Pending publications picked up by this pass
    pub processed: usize,

    /// Pending publications that completed their run
    pub succeeded: usize,

    /// Failures from either phase
    pub failures: Vec<CronFailure>,

    /// Reconciliation result, if that phase got to run at all
    pub sync: Option<SyncSummary>,

    /// Duration of the whole pass
    pub duration: Duration,
}

impl CronSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self {
            processed: 0,
            succeeded: 0,
            failures: Vec::new(),
            sync: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Add a failure
    pub fn add_failure(&mut self, failure: CronFailure) {
        self.failures.push(failure);
    }

    /// Whether both phases completed without any failure
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && self.sync.as_ref().map_or(true, |sync| sync.is_clean())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        info!(
            processed = self.processed,
            succeeded = self.succeeded,
            failed = self.failures.len(),
            reconciled = self.sync.as_ref().map(|sync| sync.checked).unwrap_or(0),
            duration_secs = self.duration.as_secs(),
            "Cron pass completed"
        );

        for failure in &self.failures {
            tracing::warn!(
                publication_id = failure.publication_id,
                message = %failure.message,
                "Cron failure"
            );
        }
    }
}

impl Default for CronSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// One failure inside a cron pass
#[derive(Debug, Clone)]
pub struct CronFailure {
    /// Publication the failure belongs to, if it was per-publication
    pub publication_id: Option<i64>,

    pub message: String,
}

impl CronFailure {
    /// Failure of a single publication run
    pub fn publication(publication_id: i64, message: impl Into<String>) -> Self {
        Self {
            publication_id: Some(publication_id),
            message: message.into(),
        }
    }

    /// Failure of a whole phase
    pub fn phase(message: impl Into<String>) -> Self {
        Self {
            publication_id: None,
            message: message.into(),
        }
    }
}

/// Drives the pending and reconciliation phases of one scheduled pass
pub struct CronOrchestrator {
    pipeline: PublicationPipeline,
    reconciler: Reconciler,
    store: Arc<dyn PublicationStore>,
    work_dir: PathBuf,
}

impl CronOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        pipeline: PublicationPipeline,
        reconciler: Reconciler,
        store: Arc<dyn PublicationStore>,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            pipeline,
            reconciler,
            store,
            work_dir,
        }
    }

    /// Run one full pass: pending publications first, then reconciliation
    ///
    /// Never fails as a whole; everything that went wrong is in the summary.
    pub async fn run(&self) -> CronSummary {
        let started = Instant::now();
        let mut summary = CronSummary::new();

        self.process_pending(&mut summary).await;

        // Review decisions have to be picked up even when the pending phase
        // had failures.
        match self.reconciler.run().await {
            Ok(sync) => summary.sync = Some(sync),
            Err(e) => {
                error!(error = %e, "Reconciliation phase failed");
                summary.add_failure(CronFailure::phase(format!("reconciliation failed: {e}")));
            }
        }

        summary.duration = started.elapsed();
        summary.log_summary();
        summary
    }

    /// Run the pipeline for every pending publication
    async fn process_pending(&self, summary: &mut CronSummary) {
        let pending = match self
            .store
            .list_by_status(PublicationStatus::Pending)
            .await
        {
            Ok(publications) => publications,
            Err(e) => {
                error!(error = %e, "Could not list pending publications");
                summary.add_failure(CronFailure::phase(format!(
                    "pending listing failed: {e}"
                )));
                return;
            }
        };

        info!(count = pending.len(), "Processing pending publications");

        for publication in &pending {
            summary.processed += 1;
            let work_folder = publication_work_folder(&self.work_dir, publication.id);

            match self.pipeline.run_safe(publication.id, &work_folder).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    summary.add_failure(CronFailure::publication(publication.id, e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_folder_naming() {
        let folder = publication_work_folder(Path::new("/var/canopy/work"), 36);

        assert_eq!(folder, PathBuf::from("/var/canopy/work/publication_36"));
    }

    #[test]
    fn test_empty_summary_is_successful() {
        assert!(CronSummary::new().is_successful());
    }

    #[test]
    fn test_publication_failure_marks_pass_failed() {
        let mut summary = CronSummary::new();
        summary.add_failure(CronFailure::publication(7, "no archives"));

        assert!(!summary.is_successful());
        assert_eq!(summary.failures[0].publication_id, Some(7));
    }

    #[test]
    fn test_dirty_sync_marks_pass_failed() {
        let mut summary = CronSummary::new();
        let mut sync = SyncSummary::new();
        sync.add_error(crate::core::sync::SyncError::new(3, "record vanished"));
        summary.sync = Some(sync);

        assert!(!summary.is_successful());
    }

    #[test]
    fn test_clean_sync_keeps_pass_successful() {
        let mut summary = CronSummary::new();
        summary.processed = 2;
        summary.succeeded = 2;
        summary.sync = Some(SyncSummary::new());

        assert!(summary.is_successful());
    }
}
