//! FreiData API models
//!
//! This module defines the request and response structures for the
//! InvenioRDM-style REST API exposed by FreiData. These models are separate
//! from domain models and handle the serialization/deserialization of the
//! repository's wire formats.

use serde::{Deserialize, Serialize};

/// A draft or published record as returned by the repository
///
/// Only the fields the pipeline acts on are modeled; everything else in the
/// response body is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Repository record identifier, e.g. "c7g4e-9kd22"
    pub id: String,

    /// Whether the record has been published
    #[serde(default)]
    pub is_published: bool,

    /// Action and resource links supplied by the server
    #[serde(default)]
    pub links: RecordLinks,

    /// Persistent identifiers attached to the record
    #[serde(default)]
    pub pids: Pids,
}

impl DraftRecord {
    /// DOI identifier if one is reserved or registered
    pub fn doi(&self) -> Option<&str> {
        self.pids.doi.as_ref().map(|d| d.identifier.as_str())
    }
}

/// Links block of a record response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordLinks {
    /// API URL of the record itself
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,

    /// Human-facing URL of the record
    #[serde(default)]
    pub self_html: Option<String>,

    /// URL for reserving a DOI on the draft
    #[serde(default)]
    pub reserve_doi: Option<String>,

    /// URL for publishing the draft
    #[serde(default)]
    pub publish: Option<String>,

    /// URL of the draft files collection
    #[serde(default)]
    pub files: Option<String>,
}

/// Persistent identifier block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pids {
    #[serde(default)]
    pub doi: Option<DoiPid>,
}

/// A DOI persistent identifier entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoiPid {
    pub identifier: String,

    #[serde(default)]
    pub provider: Option<String>,
}

/// Upload status of a single draft file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Initialized but content not yet committed
    Pending,
    /// Content uploaded and committed
    Completed,
}

/// One entry in the draft files listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name (the upload key)
    pub key: String,

    /// Upload status
    #[serde(default = "default_file_status")]
    pub status: FileStatus,
}

impl FileEntry {
    /// Whether the repository considers this file fully uploaded
    pub fn is_completed(&self) -> bool {
        self.status == FileStatus::Completed
    }
}

fn default_file_status() -> FileStatus {
    FileStatus::Pending
}

/// Draft files listing response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub entries: Vec<FileEntry>,
}

/// Body entry for the batch file initialization call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInitEntry {
    pub key: String,
}

/// Community search response
#[derive(Debug, Clone, Deserialize)]
pub struct CommunitySearchResponse {
    pub hits: CommunityHits,
}

/// Hits block of a community search
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityHits {
    #[serde(default)]
    pub hits: Vec<Community>,

    #[serde(default)]
    pub total: u64,
}

/// A community as returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    pub id: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub metadata: CommunityMetadata,
}

/// Community metadata block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

/// Status of a community review request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Created,
    Submitted,
    Accepted,
    Declined,
    Cancelled,
    Expired,
}

impl ReviewStatus {
    /// Whether the review ended without the record being published
    pub fn is_closed_unpublished(&self) -> bool {
        matches!(
            self,
            ReviewStatus::Declined | ReviewStatus::Cancelled | ReviewStatus::Expired
        )
    }
}

/// A community review request attached to a draft
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub id: String,
    pub status: ReviewStatus,
}

/// Body for creating a community review on a draft
#[derive(Debug, Clone, Serialize)]
pub struct ReviewCreateRequest {
    pub receiver: ReviewReceiver,

    #[serde(rename = "type")]
    pub kind: String,
}

impl ReviewCreateRequest {
    /// Community-submission review addressed to the given community
    pub fn community_submission(community_id: impl Into<String>) -> Self {
        Self {
            receiver: ReviewReceiver {
                community: community_id.into(),
            },
            kind: "community-submission".to_string(),
        }
    }
}

/// Receiver block of a review request
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReceiver {
    pub community: String,
}

/// Complete deposit payload for creating a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositMetadata {
    pub access: AccessSettings,
    pub files: FilesSettings,
    pub metadata: RecordMetadata,
}

/// Record and file access policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSettings {
    pub record: String,
    pub files: String,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            record: "public".to_string(),
            files: "public".to_string(),
        }
    }
}

/// Files policy of the deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesSettings {
    pub enabled: bool,
}

/// Descriptive metadata of the deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub resource_type: ResourceType,
    pub title: String,
    pub description: String,

    /// ISO date, e.g. "2026-08-25"
    pub publication_date: String,
    pub publisher: String,
    pub creators: Vec<Creator>,
    pub rights: Vec<RightsEntry>,
}

/// Resource type entry, e.g. `{"id": "dataset"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: String,
}

/// License entry, e.g. `{"id": "cc-by-4.0"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightsEntry {
    pub id: String,
}

/// A creator of the deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub person_or_org: PersonOrOrg,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliations: Option<Vec<Affiliation>>,
}

/// Person or organization block of a creator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonOrOrg {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<CreatorIdentifier>,
}

/// Identifier entry of a creator, e.g. an ORCID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorIdentifier {
    pub scheme: String,
    pub identifier: String,
}

/// Affiliation entry of a creator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
    pub name: String,
}
