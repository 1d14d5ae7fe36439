//! Review reconciliation
//!
//! Publications sit in `in_review` while a community decides on them. The
//! decision lands on the repository side only, so this pass reads every
//! in-review publication back from the repository and folds the outcome into
//! the store: published records close out with their DOI, dead reviews park
//! the row in `declined`, everything else stays put.
//!
//! Failures never abort the pass. A publication that cannot be classified is
//! recorded in the summary and the remaining rows are still processed.

use crate::adapters::freidata::FreidataApi;
use crate::adapters::store::PublicationStore;
use crate::adapters::zulip::Notifier;
use crate::domain::{CanopyError, FreidataError, Publication, PublicationStatus, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::summary::{SyncError, SyncSummary};

/// Outcome of reconciling one publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewOutcome {
    Published,
    Declined,
    StillInReview,
}

/// Folds remote review decisions back into the publication store
pub struct Reconciler {
    api: Arc<dyn FreidataApi>,
    store: Arc<dyn PublicationStore>,
    notifier: Arc<dyn Notifier>,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(
        api: Arc<dyn FreidataApi>,
        store: Arc<dyn PublicationStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
        }
    }

    /// Reconcile every publication currently in review
    ///
    /// # Errors
    ///
    /// Returns an error only when the in-review listing itself cannot be
    /// read. Per-publication failures end up in the summary instead.
    pub async fn run(&self) -> Result<SyncSummary> {
        let started = Instant::now();
        let publications = self
            .store
            .list_by_status(PublicationStatus::InReview)
            .await?;

        info!(count = publications.len(), "Reconciling in-review publications");

        let mut summary = SyncSummary::new();

        for publication in &publications {
            summary.checked += 1;

            match self.reconcile_one(publication).await {
                Ok(ReviewOutcome::Published) => summary.published += 1,
                Ok(ReviewOutcome::Declined) => summary.declined += 1,
                Ok(ReviewOutcome::StillInReview) => summary.still_in_review += 1,
                Err(e) => {
                    warn!(
                        publication_id = publication.id,
                        error = %e,
                        "Could not reconcile publication"
                    );
                    summary.add_error(SyncError::new(publication.id, e.to_string()));
                }
            }
        }

        summary.duration = started.elapsed();
        summary.log_summary();
        Ok(summary)
    }

    /// Classify one in-review publication against the repository
    async fn reconcile_one(&self, publication: &Publication) -> Result<ReviewOutcome> {
        let record_id = publication.freidata_record_id.as_deref().ok_or_else(|| {
            CanopyError::Validation(format!(
                "publication {} is in review but has no repository record id",
                publication.id
            ))
        })?;

        match self.api.get_record(record_id).await {
            Ok(record) if record.is_published => {
                let doi = record.doi().map(|doi| doi.to_string());
                self.store
                    .set_published(publication.id, doi.as_deref())
                    .await?;

                info!(
                    publication_id = publication.id,
                    record_id = %record_id,
                    doi = doi.as_deref().unwrap_or_default(),
                    "Review accepted, publication is now published"
                );

                self.notify_best_effort(
                    publication,
                    &format!(
                        "Publication {} \"{}\" is published: {}",
                        publication.id,
                        publication.title,
                        doi.as_deref().unwrap_or("no DOI assigned")
                    ),
                )
                .await;

                Ok(ReviewOutcome::Published)
            }
            // No published record yet: the draft either still sits in review
            // or the review ended without publication.
            Ok(_) | Err(CanopyError::Freidata(FreidataError::RecordNotFound(_))) => {
                self.classify_review(publication, record_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Read the draft review request and map its status to an outcome
    async fn classify_review(
        &self,
        publication: &Publication,
        record_id: &str,
    ) -> Result<ReviewOutcome> {
        let review = self.api.get_draft_review(record_id).await?;

        if review.status.is_closed_unpublished() {
            self.store
                .set_status(publication.id, PublicationStatus::Declined)
                .await?;

            info!(
                publication_id = publication.id,
                record_id = %record_id,
                review_status = ?review.status,
                "Review closed without publication, marking declined"
            );

            self.notify_best_effort(
                publication,
                &format!(
                    "Publication {} \"{}\" was declined by community review",
                    publication.id, publication.title
                ),
            )
            .await;

            return Ok(ReviewOutcome::Declined);
        }

        info!(
            publication_id = publication.id,
            record_id = %record_id,
            review_status = ?review.status,
            "Review still open"
        );

        Ok(ReviewOutcome::StillInReview)
    }

    /// Send a notification and stamp the row; failures only warn
    async fn notify_best_effort(&self, publication: &Publication, text: &str) {
        match self.notifier.notify(text).await {
            Ok(()) => {
                if let Err(e) = self.store.mark_notified(publication.id).await {
                    warn!(
                        publication_id = publication.id,
                        error = %e,
                        "Could not stamp notification time"
                    );
                }
            }
            Err(e) => {
                warn!(
                    publication_id = publication.id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}
