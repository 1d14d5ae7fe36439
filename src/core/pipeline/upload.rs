//! Draft file synchronization
//!
//! Reconciles the archives in the work folder with the files already on
//! the draft, so interrupted runs resume without re-transferring completed
//! uploads.

use crate::adapters::freidata::FreidataApi;
use crate::domain::{CanopyError, FreidataError, Result};
use crate::log_upload_progress;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a draft file synchronization
#[derive(Debug, Default)]
pub struct UploadOutcome {
    /// File keys uploaded and committed this run
    pub uploaded: Vec<String>,

    /// File keys already completed remotely and left untouched
    pub skipped: Vec<String>,
}

/// Bring the draft's files in line with the local archives
///
/// Completed remote files are skipped unless `overwrite` is set, in which
/// case they are deleted and re-uploaded. Files the repository has not
/// seen yet are initialized in one batch call, then uploaded and
/// committed one by one.
pub async fn sync_draft_files(
    api: &dyn FreidataApi,
    record_id: &str,
    archives: &[PathBuf],
    overwrite: bool,
) -> Result<UploadOutcome> {
    let listing = api.list_draft_files(record_id).await?;
    let remote: HashMap<&str, bool> = listing
        .entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.is_completed()))
        .collect();

    let mut outcome = UploadOutcome::default();
    let mut to_init: Vec<String> = Vec::new();
    let mut to_upload: Vec<(String, &Path)> = Vec::new();

    for archive in archives {
        let key = archive_key(archive)?;

        match remote.get(key.as_str()).copied() {
            Some(true) if !overwrite => {
                info!(record_id = %record_id, key = %key, "File already completed, skipping");
                outcome.skipped.push(key);
            }
            Some(true) => {
                info!(record_id = %record_id, key = %key, "Replacing completed file");
                api.delete_draft_file(record_id, &key).await?;
                to_init.push(key.clone());
                to_upload.push((key, archive));
            }
            Some(false) => {
                to_upload.push((key, archive));
            }
            None => {
                to_init.push(key.clone());
                to_upload.push((key, archive));
            }
        }
    }

    if !to_init.is_empty() {
        api.init_draft_files(record_id, &to_init).await?;
    }

    if to_upload.is_empty() {
        return Ok(outcome);
    }

    let registered: HashSet<String> = api
        .list_draft_files(record_id)
        .await?
        .entries
        .into_iter()
        .map(|entry| entry.key)
        .collect();

    for (key, _) in &to_upload {
        if !registered.contains(key) {
            return Err(CanopyError::Freidata(FreidataError::InvalidResponse(
                format!("file {} not registered on draft after init", key),
            )));
        }
    }

    let total = to_upload.len();
    for (index, (key, path)) in to_upload.iter().enumerate() {
        log_upload_progress!(index + 1, total);
        api.upload_draft_file(record_id, key, path).await?;
        api.commit_draft_file(record_id, key).await?;
        outcome.uploaded.push(key.clone());
    }

    Ok(outcome)
}

fn archive_key(archive: &Path) -> Result<String> {
    archive
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| {
            CanopyError::Validation(format!(
                "Archive path {} has no usable file name",
                archive.display()
            ))
        })
}
