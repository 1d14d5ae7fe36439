//! Working folder validation
//!
//! Before any repository call the pipeline checks that the working folder
//! actually contains archives to upload. An empty folder is fatal; count and
//! id mismatches against the publication's dataset list are warnings only,
//! because bundles legitimately pack several datasets into one archive.

use crate::domain::{CanopyError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// List the zip archives in a folder, sorted by name
pub fn find_archives(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
        {
            archives.push(path);
        }
    }

    archives.sort();
    Ok(archives)
}

/// Check the working folder before upload
///
/// Returns the archives to upload.
///
/// # Errors
///
/// Returns a validation error when the folder contains no zip archives.
pub fn validate_work_folder(folder: &Path, expected_dataset_ids: &[i64]) -> Result<Vec<PathBuf>> {
    let archives = find_archives(folder)?;

    if archives.is_empty() {
        return Err(CanopyError::Validation(format!(
            "no zip archives found in {}",
            folder.display()
        )));
    }

    if !expected_dataset_ids.is_empty() && expected_dataset_ids.len() != archives.len() {
        tracing::warn!(
            expected = expected_dataset_ids.len(),
            found = archives.len(),
            folder = %folder.display(),
            "Archive count does not match expected dataset count"
        );
    }

    let numeric_stems: HashSet<i64> = archives
        .iter()
        .filter_map(|path| path.file_stem()?.to_str()?.parse().ok())
        .collect();
    let missing: Vec<i64> = expected_dataset_ids
        .iter()
        .copied()
        .filter(|id| !numeric_stems.contains(id))
        .collect();

    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            folder = %folder.display(),
            "Expected dataset archives missing from working folder"
        );
    }

    Ok(archives)
}
