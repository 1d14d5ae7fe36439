//! Publication store
//!
//! This module defines the `PublicationStore` trait and its PostgreSQL
//! implementation. Publications live in the platform database together with
//! their dataset membership, which is read from the `v_publication_datasets`
//! view.

use crate::adapters::store::client::PostgresClient;
use crate::domain::{CanopyError, Publication, PublicationStatus, Result};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tokio_postgres::Row;

/// Storage interface for publications
///
/// The pipeline and the reconciler use this trait to read publication rows
/// and to record lifecycle transitions.
#[async_trait]
pub trait PublicationStore: Send + Sync {
    /// Load a single publication with its ordered dataset ids
    ///
    /// # Errors
    ///
    /// Returns a validation error if the publication does not exist.
    async fn get_publication(&self, id: i64) -> Result<Publication>;

    /// Load all publications in the given status, ordered by id
    async fn list_by_status(&self, status: PublicationStatus) -> Result<Vec<Publication>>;

    /// Record a status transition
    async fn set_status(&self, id: i64, status: PublicationStatus) -> Result<()>;

    /// Record the repository record id assigned to the publication
    async fn set_record_id(&self, id: i64, record_id: &str) -> Result<()>;

    /// Mark the publication as published
    ///
    /// A DOI already present in the row wins over the one passed in.
    async fn set_published(&self, id: i64, doi: Option<&str>) -> Result<()>;

    /// Record that a notification about this publication went out
    async fn mark_notified(&self, id: i64) -> Result<()>;
}

/// PostgreSQL implementation of the publication store
pub struct PostgresPublicationStore {
    client: Arc<PostgresClient>,
}

impl PostgresPublicationStore {
    /// Create a new store
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new store with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgresClient> {
        &self.client
    }

    fn row_to_publication(&self, row: &Row) -> Result<Publication> {
        let status_str: String = row.get("status");
        let status = PublicationStatus::from_str(&status_str)?;

        let authors_json: serde_json::Value = row.get("authors");
        let authors = serde_json::from_value(authors_json).map_err(|e| {
            CanopyError::Database(format!("Invalid authors payload in publications row: {e}"))
        })?;

        Ok(Publication {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            authors,
            status,
            doi: row.get("doi"),
            freidata_record_id: row.get("freidata_record_id"),
            notified_at: row.get("notified_at"),
            dataset_ids: Vec::new(),
        })
    }

    async fn load_dataset_ids(&self, publication_id: i64) -> Result<Vec<i64>> {
        let rows = self
            .client
            .query(
                "SELECT dataset_id FROM v_publication_datasets \
                 WHERE publication_id = $1 ORDER BY position",
                &[&publication_id],
            )
            .await?;

        Ok(rows.iter().map(|row| row.get("dataset_id")).collect())
    }
}

const PUBLICATION_COLUMNS: &str =
    "id, title, description, authors, status, doi, freidata_record_id, notified_at";

#[async_trait]
impl PublicationStore for PostgresPublicationStore {
    async fn get_publication(&self, id: i64) -> Result<Publication> {
        let query = format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE id = $1");

        let rows = self.client.query(&query, &[&id]).await?;

        let row = rows
            .first()
            .ok_or_else(|| CanopyError::Validation(format!("Publication {id} not found")))?;

        let mut publication = self.row_to_publication(row)?;
        publication.dataset_ids = self.load_dataset_ids(id).await?;

        Ok(publication)
    }

    async fn list_by_status(&self, status: PublicationStatus) -> Result<Vec<Publication>> {
        let query = format!(
            "SELECT {PUBLICATION_COLUMNS} FROM publications WHERE status = $1 ORDER BY id"
        );
        let status_str = status.as_str();

        let rows = self.client.query(&query, &[&status_str]).await?;

        let mut publications = Vec::new();
        for row in &rows {
            let mut publication = self.row_to_publication(row)?;
            publication.dataset_ids = self.load_dataset_ids(publication.id).await?;
            publications.push(publication);
        }

        tracing::debug!(
            status = %status,
            count = publications.len(),
            "Loaded publications from store"
        );

        Ok(publications)
    }

    async fn set_status(&self, id: i64, status: PublicationStatus) -> Result<()> {
        let status_str = status.as_str();

        let affected = self
            .client
            .execute(
                "UPDATE publications SET status = $2, updated_at = NOW() WHERE id = $1",
                &[&id, &status_str],
            )
            .await?;

        if affected == 0 {
            return Err(CanopyError::Validation(format!(
                "Publication {id} not found"
            )));
        }

        tracing::debug!(publication_id = id, status = %status, "Publication status updated");
        Ok(())
    }

    async fn set_record_id(&self, id: i64, record_id: &str) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE publications SET freidata_record_id = $2, updated_at = NOW() \
                 WHERE id = $1",
                &[&id, &record_id],
            )
            .await?;

        if affected == 0 {
            return Err(CanopyError::Validation(format!(
                "Publication {id} not found"
            )));
        }

        Ok(())
    }

    async fn set_published(&self, id: i64, doi: Option<&str>) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE publications SET status = 'published', doi = COALESCE(doi, $2), \
                 updated_at = NOW() WHERE id = $1",
                &[&id, &doi],
            )
            .await?;

        if affected == 0 {
            return Err(CanopyError::Validation(format!(
                "Publication {id} not found"
            )));
        }

        tracing::info!(publication_id = id, doi = ?doi, "Publication marked as published");
        Ok(())
    }

    async fn mark_notified(&self, id: i64) -> Result<()> {
        self.client
            .execute(
                "UPDATE publications SET notified_at = NOW() WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(())
    }
}
