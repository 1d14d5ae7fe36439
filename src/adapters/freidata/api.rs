//! FreiData repository API trait
//!
//! This module defines the `FreidataApi` trait that abstracts the InvenioRDM
//! REST API of the FreiData repository. The pipeline and the reconciler only
//! talk to the repository through this trait, which keeps them testable
//! against stub implementations.

use crate::domain::Result;
use async_trait::async_trait;
use std::path::Path;

use super::models::{Community, DepositMetadata, DraftRecord, FileListing, ReviewRequest};

/// Interface to an InvenioRDM-style archival repository
///
/// All record identifiers are the repository's own record ids
/// (e.g. "c7g4e-9kd22"), not local publication ids.
#[async_trait]
pub trait FreidataApi: Send + Sync {
    /// Create a new draft record from a deposit payload
    ///
    /// # Errors
    ///
    /// Returns an error if the repository rejects the deposit or is
    /// unreachable.
    async fn create_draft(&self, deposit: &DepositMetadata) -> Result<DraftRecord>;

    /// Fetch the draft version of a record
    ///
    /// # Errors
    ///
    /// Returns `FreidataError::RecordNotFound` if no draft exists for the id.
    async fn get_draft(&self, record_id: &str) -> Result<DraftRecord>;

    /// Fetch the published version of a record
    ///
    /// # Errors
    ///
    /// Returns `FreidataError::RecordNotFound` if no published record exists
    /// for the id.
    async fn get_record(&self, record_id: &str) -> Result<DraftRecord>;

    /// Reserve a DOI for the draft
    ///
    /// Uses the draft's `reserve_doi` link. Returns the raw response body so
    /// callers can persist it for later inspection.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft carries no `reserve_doi` link or the
    /// reservation is rejected.
    async fn reserve_doi(&self, draft: &DraftRecord) -> Result<serde_json::Value>;

    /// List the files attached to a draft
    async fn list_draft_files(&self, record_id: &str) -> Result<FileListing>;

    /// Register file keys on a draft in a single call
    ///
    /// The repository expects all missing keys in one batch request before
    /// any content is uploaded.
    async fn init_draft_files(&self, record_id: &str, keys: &[String]) -> Result<()>;

    /// Upload the content of a single draft file
    async fn upload_draft_file(&self, record_id: &str, key: &str, path: &Path) -> Result<()>;

    /// Finalize a single draft file after its content was uploaded
    async fn commit_draft_file(&self, record_id: &str, key: &str) -> Result<()>;

    /// Remove a file from a draft
    async fn delete_draft_file(&self, record_id: &str, key: &str) -> Result<()>;

    /// Find the community matching a slug or title query
    ///
    /// # Errors
    ///
    /// Returns `FreidataError::CommunityLookup` unless the query resolves to
    /// exactly one community.
    async fn find_community(&self, query: &str) -> Result<Community>;

    /// Attach a community review request to a draft
    ///
    /// Returns the raw response body so callers can persist it.
    async fn create_draft_review(
        &self,
        record_id: &str,
        community_id: &str,
    ) -> Result<serde_json::Value>;

    /// Submit the draft's review request to the community curators
    ///
    /// Returns the raw response body so callers can persist it.
    async fn submit_draft_review(&self, record_id: &str) -> Result<serde_json::Value>;

    /// Fetch the current review request of a draft
    ///
    /// # Errors
    ///
    /// Returns `FreidataError::RecordNotFound` if the draft has no review
    /// request.
    async fn get_draft_review(&self, record_id: &str) -> Result<ReviewRequest>;

    /// Publish a draft record
    ///
    /// Returns the published record, whose pids usually carry the registered
    /// DOI.
    async fn publish_draft(&self, record_id: &str) -> Result<DraftRecord>;
}
