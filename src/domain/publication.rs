//! Publication model and lifecycle status
//!
//! This module defines the publication row as read from the Publication
//! Store, together with the lifecycle status enumeration that drives the
//! pipeline state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::CanopyError;

/// Publication lifecycle status
///
/// Transitions: `pending` → `uploading` → `in_review` → `published` or
/// `declined`. Any step may land in `error`, from which a rerun recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    /// Waiting to be picked up by the pipeline
    Pending,
    /// Pipeline has started; draft and uploads may be partially done
    Uploading,
    /// Community review submitted, awaiting curator decision
    InReview,
    /// Review was declined, cancelled or expired
    Declined,
    /// Record is published and has a DOI
    Published,
    /// Last pipeline run failed; rerun to resume
    Error,
}

impl PublicationStatus {
    /// Returns the status as the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Pending => "pending",
            PublicationStatus::Uploading => "uploading",
            PublicationStatus::InReview => "in_review",
            PublicationStatus::Declined => "declined",
            PublicationStatus::Published => "published",
            PublicationStatus::Error => "error",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PublicationStatus::Pending),
            "uploading" => Ok(PublicationStatus::Uploading),
            "in_review" => Ok(PublicationStatus::InReview),
            "declined" => Ok(PublicationStatus::Declined),
            "published" => Ok(PublicationStatus::Published),
            "error" => Ok(PublicationStatus::Error),
            other => Err(CanopyError::Validation(format!(
                "Unknown publication status: {other}"
            ))),
        }
    }
}

/// A publication author
///
/// Maps onto an InvenioRDM personal creator; `organization` becomes the
/// affiliation and `orcid` an identifier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub given_name: String,
    pub family_name: String,

    /// Affiliation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// ORCID identifier without URL prefix, e.g. "0000-0002-1825-0097"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Author {
    /// Full display name in "Given Family" order
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// A publication row from the Publication Store
///
/// `dataset_ids` is read from the denormalized dataset view and defines
/// which archives the working folder is expected to contain, one zip per
/// dataset named `<id>.zip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub authors: Vec<Author>,
    pub status: PublicationStatus,

    /// Set exactly once when the record is published; never overwritten
    pub doi: Option<String>,

    /// Identifier of the draft/record on the remote repository
    pub freidata_record_id: Option<String>,

    /// When the last lifecycle notification for this row went out
    pub notified_at: Option<DateTime<Utc>>,

    /// Ordered dataset identifiers owned by this publication
    #[serde(default)]
    pub dataset_ids: Vec<i64>,
}

impl Publication {
    /// Whether this publication already carries a DOI
    ///
    /// A non-null DOI means the record reached its terminal published state;
    /// the pipeline must not touch the remote repository again.
    pub fn has_doi(&self) -> bool {
        self.doi.is_some()
    }

    /// Expected archive file name for a dataset of this publication
    pub fn expected_archive_name(dataset_id: i64) -> String {
        format!("{dataset_id}.zip")
    }
}
