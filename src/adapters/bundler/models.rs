//! Bundle service models
//!
//! Wire structures of the internal download service that assembles dataset
//! bundles on demand.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a bundle assembly job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleJobStatus {
    /// Accepted but not started
    #[serde(alias = "pending")]
    Queued,
    /// Bundle is being assembled
    Processing,
    /// Bundle is ready for download
    Completed,
    /// Assembly failed on the service side
    Failed,
}

/// State of a bundle job as reported by the service
///
/// Both the submission response and the status poll response use this shape.
/// `download_path` may be relative to the service origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleJob {
    pub status: BundleJobStatus,

    #[serde(default)]
    pub job_id: Option<String>,

    #[serde(default)]
    pub download_path: Option<String>,
}

impl BundleJob {
    /// Whether the bundle is ready for download
    pub fn is_completed(&self) -> bool {
        self.status == BundleJobStatus::Completed
    }

    /// Whether the service gave up on the job
    pub fn is_failed(&self) -> bool {
        self.status == BundleJobStatus::Failed
    }
}
