//! Publication pipeline coordination
//!
//! Drives one publication from the store through bundle acquisition,
//! archive validation, draft creation, file upload, community review and
//! publication. Every remote step is guarded so an interrupted run can be
//! repeated without duplicating drafts, uploads or review requests.

use crate::adapters::freidata::{DraftRecord, FreidataApi};
use crate::adapters::store::PublicationStore;
use crate::adapters::zulip::Notifier;
use crate::config::PublishConfig;
use crate::core::archive::{clean_archive, validate_work_folder};
use crate::core::bundle::BundleAcquirer;
use crate::core::pipeline::metadata::build_deposit;
use crate::core::pipeline::upload::sync_draft_files;
use crate::core::state::ResumeState;
use crate::domain::{Publication, PublicationStatus, Result};
use crate::{log_error_with_context, log_publish_complete, log_publish_start};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// What a pipeline run did for one publication
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub publication_id: i64,
    pub record_id: Option<String>,
    pub doi: Option<String>,
    pub published: bool,
    pub uploaded_files: Vec<String>,
    pub skipped_files: Vec<String>,
    pub review_created: bool,
    pub review_submitted: bool,
    pub already_published: bool,
}

/// Coordinates one publication run end to end
pub struct PublicationPipeline {
    api: Arc<dyn FreidataApi>,
    store: Arc<dyn PublicationStore>,
    notifier: Arc<dyn Notifier>,
    bundler: Option<BundleAcquirer>,
    publish_config: PublishConfig,
}

impl PublicationPipeline {
    pub fn new(
        api: Arc<dyn FreidataApi>,
        store: Arc<dyn PublicationStore>,
        notifier: Arc<dyn Notifier>,
        bundler: Option<BundleAcquirer>,
        publish_config: PublishConfig,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            bundler,
            publish_config,
        }
    }

    /// Run the pipeline and park the publication in `error` on failure
    ///
    /// The status write and the failure notification are both best-effort;
    /// the original error is propagated either way.
    pub async fn run_safe(&self, publication_id: i64, work_folder: &Path) -> Result<PipelineReport> {
        match self.run(publication_id, work_folder).await {
            Ok(report) => Ok(report),
            Err(e) => {
                log_error_with_context!(e, format!("Publication {} failed", publication_id));

                if let Err(status_err) = self
                    .store
                    .set_status(publication_id, PublicationStatus::Error)
                    .await
                {
                    warn!(
                        publication_id = publication_id,
                        error = %status_err,
                        "Could not record error status"
                    );
                }

                self.notify_best_effort(
                    publication_id,
                    &format!("Publication {} failed: {}", publication_id, e),
                )
                .await;

                Err(e)
            }
        }
    }

    /// Run the pipeline for one publication
    pub async fn run(&self, publication_id: i64, work_folder: &Path) -> Result<PipelineReport> {
        let started = Instant::now();
        let publication = self.store.get_publication(publication_id).await?;

        log_publish_start!(publication_id, publication.title);

        // A stored DOI means the publication already went out. Nothing to
        // redo, and no remote call is worth making.
        if publication.has_doi() {
            info!(
                publication_id = publication_id,
                doi = publication.doi.as_deref().unwrap_or_default(),
                "Publication already has a DOI, nothing to do"
            );
            return Ok(PipelineReport {
                publication_id,
                record_id: publication.freidata_record_id.clone(),
                doi: publication.doi.clone(),
                already_published: true,
                ..Default::default()
            });
        }

        self.store
            .set_status(publication_id, PublicationStatus::Uploading)
            .await?;

        std::fs::create_dir_all(work_folder)?;
        let mut state = ResumeState::load(work_folder)?;

        let archives = self.acquire_archives(&publication, work_folder).await?;

        if self.publish_config.clean_archives {
            for archive in &archives {
                clean_archive(archive)?;
            }
        }

        let (record_id, created) = self.resolve_draft(&publication, &mut state).await?;
        let mut draft = match created {
            Some(draft) => draft,
            None => self.api.get_draft(&record_id).await?,
        };

        draft = self.reserve_doi_best_effort(draft, &mut state).await;

        let outcome = sync_draft_files(
            self.api.as_ref(),
            &record_id,
            &archives,
            self.publish_config.overwrite_remote_files,
        )
        .await?;

        let mut report = PipelineReport {
            publication_id,
            record_id: Some(record_id.clone()),
            doi: draft.doi().map(|doi| doi.to_string()),
            uploaded_files: outcome.uploaded,
            skipped_files: outcome.skipped,
            ..Default::default()
        };

        if let Some(query) = self.publish_config.community.clone() {
            self.handle_review(&publication, &record_id, &query, &mut state, &mut report)
                .await?;
        }

        // A review created and submitted in this run hands control to the
        // community; publication then happens through review acceptance.
        let review_pending = report.review_created && report.review_submitted;
        if self.publish_config.publish_record && !review_pending {
            let published = self.api.publish_draft(&record_id).await?;
            let doi = published
                .doi()
                .or_else(|| draft.doi())
                .map(|doi| doi.to_string());

            self.store
                .set_published(publication_id, doi.as_deref())
                .await?;

            info!(
                publication_id = publication_id,
                record_id = %record_id,
                doi = doi.as_deref().unwrap_or_default(),
                "Publication published"
            );

            let delivered = self
                .notify_best_effort(
                    publication_id,
                    &format!(
                        "Publication {} \"{}\" is published: {}",
                        publication_id,
                        publication.title,
                        doi.as_deref().unwrap_or("no DOI assigned")
                    ),
                )
                .await;
            if delivered {
                self.stamp_notified(publication_id).await;
            }

            report.doi = doi;
            report.published = true;
        } else if self.publish_config.publish_record {
            info!(
                publication_id = publication_id,
                record_id = %record_id,
                "Review submitted in this run, leaving publication to the community"
            );
        }

        log_publish_complete!(publication_id, started.elapsed());
        Ok(report)
    }

    /// Acquire archives into the work folder when it is empty, then validate
    async fn acquire_archives(
        &self,
        publication: &Publication,
        work_folder: &Path,
    ) -> Result<Vec<std::path::PathBuf>> {
        let existing = crate::core::archive::find_archives(work_folder)?;

        if existing.is_empty() {
            if let Some(ref bundler) = self.bundler {
                bundler
                    .acquire(
                        publication.id,
                        &publication.title,
                        &publication.dataset_ids,
                        work_folder,
                    )
                    .await?;
            }
        }

        validate_work_folder(work_folder, &publication.dataset_ids)
    }

    /// Resolve the draft record id, creating the draft at most once
    ///
    /// Resume state wins over the store column so a run interrupted between
    /// the two writes never creates a second draft. On creation the id goes
    /// to the resume state file first, then to the store.
    async fn resolve_draft(
        &self,
        publication: &Publication,
        state: &mut ResumeState,
    ) -> Result<(String, Option<DraftRecord>)> {
        if let Some(record_id) = state.record_id() {
            info!(
                publication_id = publication.id,
                record_id = %record_id,
                "Reusing draft from resume state"
            );
            return Ok((record_id.to_string(), None));
        }

        if let Some(ref record_id) = publication.freidata_record_id {
            info!(
                publication_id = publication.id,
                record_id = %record_id,
                "Reusing draft recorded in the store"
            );
            return Ok((record_id.clone(), None));
        }

        let deposit = build_deposit(publication, Utc::now().date_naive());
        let draft = self.api.create_draft(&deposit).await?;
        let record_id = draft.id.clone();

        info!(
            publication_id = publication.id,
            record_id = %record_id,
            "Created draft record"
        );

        state.set_record_id(&record_id)?;
        self.store
            .set_record_id(publication.id, &record_id)
            .await?;

        Ok((record_id, Some(draft)))
    }

    /// Reserve a DOI if the draft has none; failures only warn
    async fn reserve_doi_best_effort(
        &self,
        draft: DraftRecord,
        state: &mut ResumeState,
    ) -> DraftRecord {
        if draft.doi().is_some() || draft.links.reserve_doi.is_none() {
            return draft;
        }

        match self.api.reserve_doi(&draft).await {
            Ok(response) => {
                if let Err(e) = state.set_doi_response(response) {
                    warn!(record_id = %draft.id, error = %e, "Could not persist DOI response");
                }
                match self.api.get_draft(&draft.id).await {
                    Ok(refreshed) => {
                        info!(
                            record_id = %draft.id,
                            doi = refreshed.doi().unwrap_or_default(),
                            "Reserved DOI"
                        );
                        refreshed
                    }
                    Err(e) => {
                        warn!(record_id = %draft.id, error = %e, "Could not refetch draft after DOI reservation");
                        draft
                    }
                }
            }
            Err(e) => {
                warn!(record_id = %draft.id, error = %e, "DOI reservation failed, continuing without");
                draft
            }
        }
    }

    /// Create and optionally submit the community review request
    async fn handle_review(
        &self,
        publication: &Publication,
        record_id: &str,
        community_query: &str,
        state: &mut ResumeState,
        report: &mut PipelineReport,
    ) -> Result<()> {
        if state.has_community_review() {
            info!(
                record_id = %record_id,
                "Community review already created in an earlier run"
            );
        } else {
            let community = self.api.find_community(community_query).await?;
            info!(
                record_id = %record_id,
                community_id = %community.id,
                "Creating community review request"
            );
            let response = self.api.create_draft_review(record_id, &community.id).await?;
            state.set_community_review(response)?;
            report.review_created = true;
        }

        if self.publish_config.submit_review && !state.review_submitted() {
            let response = self.api.submit_draft_review(record_id).await?;
            state.set_review_submitted(response)?;
            report.review_submitted = true;

            info!(record_id = %record_id, "Submitted community review");
            self.notify_best_effort(
                publication.id,
                &format!(
                    "Publication {} \"{}\" was submitted for community review",
                    publication.id, publication.title
                ),
            )
            .await;
        }

        Ok(())
    }

    /// Send a notification; delivery failures only warn
    async fn notify_best_effort(&self, publication_id: i64, text: &str) -> bool {
        match self.notifier.notify(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    publication_id = publication_id,
                    error = %e,
                    "Notification delivery failed"
                );
                false
            }
        }
    }

    /// Record that a lifecycle notification went out; failures only warn
    async fn stamp_notified(&self, publication_id: i64) {
        if let Err(e) = self.store.mark_notified(publication_id).await {
            warn!(
                publication_id = publication_id,
                error = %e,
                "Could not stamp notification time"
            );
        }
    }
}
