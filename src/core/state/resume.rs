//! Resume state for publication runs
//!
//! This module defines the state document that makes publication runs
//! resumable. It lives as a JSON file inside the working folder, next to the
//! archives, and records every repository-side step that must not be
//! repeated: the draft record id, the DOI reservation response and the
//! community review exchanges. Each mutation persists immediately so a crash
//! between steps loses nothing.

use crate::domain::{CanopyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Name of the state file inside the working folder
///
/// Uploads only consider `*.zip`, so the state file never ends up in the
/// repository.
pub const STATE_FILE_NAME: &str = "freidata_state.json";

/// Per-run resume state persisted in the working folder
///
/// # Examples
///
/// ```no_run
/// use canopy::core::state::ResumeState;
/// use std::path::Path;
///
/// # fn example() -> canopy::domain::Result<()> {
/// let mut state = ResumeState::load(Path::new("./publications/publication_36"))?;
///
/// if state.record_id().is_none() {
///     state.set_record_id("c7g4e-9kd22")?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeState {
    /// Repository record id assigned on draft creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Raw response of the DOI reservation call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi_response: Option<Value>,

    /// Raw response of the community review creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_review: Option<Value>,

    /// Raw response of the review submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_review_submitted: Option<Value>,

    /// Where this state lives on disk
    #[serde(skip)]
    path: PathBuf,
}

impl ResumeState {
    /// Load the state from a working folder, or start fresh
    ///
    /// # Errors
    ///
    /// Returns a state error when an existing file cannot be read or parsed.
    /// A missing file is not an error.
    pub fn load(work_folder: &Path) -> Result<Self> {
        let path = work_folder.join(STATE_FILE_NAME);

        if !path.exists() {
            return Ok(Self {
                path,
                ..Default::default()
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CanopyError::State(format!("cannot read {}: {e}", path.display())))?;
        let mut state: ResumeState = serde_json::from_str(&content)
            .map_err(|e| CanopyError::State(format!("cannot parse {}: {e}", path.display())))?;
        state.path = path;

        tracing::debug!(
            record_id = ?state.record_id,
            "Loaded resume state from working folder"
        );

        Ok(state)
    }

    /// Persist the state atomically (temp file plus rename)
    pub fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(&tmp, content)
            .map_err(|e| CanopyError::State(format!("cannot write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            CanopyError::State(format!("cannot move state into {}: {e}", self.path.display()))
        })?;

        Ok(())
    }

    /// Repository record id, if a draft was already created
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Record the draft id and persist immediately
    pub fn set_record_id(&mut self, record_id: &str) -> Result<()> {
        self.record_id = Some(record_id.to_string());
        self.save()
    }

    /// Record the DOI reservation response and persist immediately
    pub fn set_doi_response(&mut self, response: Value) -> Result<()> {
        self.doi_response = Some(response);
        self.save()
    }

    /// Whether a DOI reservation response was recorded
    pub fn has_doi_response(&self) -> bool {
        self.doi_response.is_some()
    }

    /// Record the review creation response and persist immediately
    pub fn set_community_review(&mut self, response: Value) -> Result<()> {
        self.community_review = Some(response);
        self.save()
    }

    /// Whether a community review was already created
    pub fn has_community_review(&self) -> bool {
        self.community_review.is_some()
    }

    /// Record the review submission response and persist immediately
    pub fn set_review_submitted(&mut self, response: Value) -> Result<()> {
        self.community_review_submitted = Some(response);
        self.save()
    }

    /// Whether the review was already submitted
    pub fn review_submitted(&self) -> bool {
        self.community_review_submitted.is_some()
    }
}
