//! Bundle acquisition
//!
//! This module drives the bundle service: submit a job for the
//! publication's datasets, poll until the bundle is assembled, then download
//! it into the working folder. Downloads go through a `.part` temp file and
//! are renamed into place only after the size checks pass, so a partial
//! download never shows up under the final name.

use crate::adapters::bundler::{BundleJob, BundleService};
use crate::config::BundlerConfig;
use crate::domain::{BundlerError, CanopyError, Result};
use crate::log_retry_attempt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::filename::bundle_filename;

/// Fetches publication bundles into the working folder
pub struct BundleAcquirer {
    service: Arc<dyn BundleService>,
    config: BundlerConfig,
}

impl BundleAcquirer {
    /// Create a new acquirer
    pub fn new(service: Arc<dyn BundleService>, config: BundlerConfig) -> Self {
        Self { service, config }
    }

    /// Ensure the bundle for a publication exists in the working folder
    ///
    /// Returns the destination path. A non-empty file already at the
    /// destination short-circuits the whole acquisition.
    ///
    /// # Errors
    ///
    /// Returns an error if the job fails, polling exceeds the configured
    /// deadline, or every download attempt fails.
    pub async fn acquire(
        &self,
        publication_id: i64,
        title: &str,
        dataset_ids: &[i64],
        work_folder: &Path,
    ) -> Result<PathBuf> {
        let dest = work_folder.join(bundle_filename(title, publication_id));

        if let Ok(meta) = tokio::fs::metadata(&dest).await {
            if meta.len() > 0 {
                tracing::info!(
                    publication_id = publication_id,
                    dest = %dest.display(),
                    "Bundle already present, skipping acquisition"
                );
                return Ok(dest);
            }
        }

        tracing::info!(
            publication_id = publication_id,
            dataset_count = dataset_ids.len(),
            "Requesting bundle assembly"
        );

        let job = self.service.submit_job(dataset_ids).await?;
        let job = self.wait_for_completion(job).await?;

        let download_path = job.download_path.ok_or_else(|| {
            CanopyError::Bundler(BundlerError::InvalidResponse(
                "completed job carries no download path".to_string(),
            ))
        })?;

        self.download_with_retries(&download_path, &dest).await?;

        Ok(dest)
    }

    /// Poll the job until completed, failed, or the deadline passes
    async fn wait_for_completion(&self, job: BundleJob) -> Result<BundleJob> {
        if job.is_completed() {
            return Ok(job);
        }
        if job.is_failed() {
            return Err(CanopyError::Bundler(BundlerError::JobFailed(
                "job failed on submission".to_string(),
            )));
        }

        let job_id = job.job_id.ok_or_else(|| {
            CanopyError::Bundler(BundlerError::InvalidResponse(
                "running job carries no job id".to_string(),
            ))
        })?;

        let interval = Duration::from_secs(self.config.poll_interval_seconds);
        let deadline = Instant::now() + Duration::from_secs(self.config.poll_deadline_seconds);

        loop {
            if Instant::now() >= deadline {
                return Err(CanopyError::Bundler(BundlerError::Timeout(format!(
                    "job {job_id} not completed within {}s",
                    self.config.poll_deadline_seconds
                ))));
            }

            tokio::time::sleep(interval).await;

            let current = self.service.job_status(&job_id).await?;
            if current.is_completed() {
                return Ok(current);
            }
            if current.is_failed() {
                return Err(CanopyError::Bundler(BundlerError::JobFailed(format!(
                    "job {job_id} failed on the service side"
                ))));
            }

            tracing::debug!(job_id = %job_id, status = ?current.status, "Bundle job still running");
        }
    }

    /// Download to a `.part` sibling, then rename onto the destination
    async fn download_with_retries(&self, download_path: &str, dest: &Path) -> Result<()> {
        let temp = part_path(dest);
        let max_attempts = self.config.download_attempts.max(1);
        let backoff = Duration::from_millis(self.config.download_backoff_ms);

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.service.download_to(download_path, &temp).await {
                Ok(bytes) => {
                    if let Err(e) = tokio::fs::rename(&temp, dest).await {
                        let _ = tokio::fs::remove_file(&temp).await;
                        return Err(e.into());
                    }
                    tracing::info!(dest = %dest.display(), bytes = bytes, "Bundle downloaded");
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        let _ = tokio::fs::remove_file(&temp).await;
                        return Err(e);
                    }
                    log_retry_attempt!(attempt, max_attempts, e.to_string());
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
