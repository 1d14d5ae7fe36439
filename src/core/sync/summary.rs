//! Reconciliation summary and reporting

use std::time::Duration;

/// What one reconciliation pass found and changed
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Publications in review that were checked against the repository
    pub checked: usize,

    /// Transitions to `published` applied in this pass
    pub published: usize,

    /// Transitions to `declined` applied in this pass
    pub declined: usize,

    /// Publications whose review is still open
    pub still_in_review: usize,

    /// Publications that could not be classified
    pub errors: Vec<SyncError>,

    /// Duration of the pass
    pub duration: Duration,
}

impl SyncSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self {
            checked: 0,
            published: 0,
            declined: 0,
            still_in_review: 0,
            errors: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error for one publication
    pub fn add_error(&mut self, error: SyncError) {
        self.errors.push(error);
    }

    /// Whether every checked publication was classified
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            checked = self.checked,
            published = self.published,
            declined = self.declined,
            still_in_review = self.still_in_review,
            errors = self.errors.len(),
            duration_secs = self.duration.as_secs(),
            "Reconciliation completed"
        );

        for error in &self.errors {
            tracing::warn!(
                publication_id = error.publication_id,
                message = %error.message,
                "Reconciliation error"
            );
        }
    }
}

impl Default for SyncSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Classification failure for one publication
#[derive(Debug, Clone)]
pub struct SyncError {
    pub publication_id: i64,
    pub message: String,
}

impl SyncError {
    pub fn new(publication_id: i64, message: impl Into<String>) -> Self {
        Self {
            publication_id,
            message: message.into(),
        }
    }
}
