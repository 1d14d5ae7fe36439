//! FreiData HTTP client
//!
//! This module implements `FreidataApi` against the InvenioRDM REST API
//! using bearer-token authentication. Endpoint paths follow the InvenioRDM
//! records API: `/api/records`, `/api/records/{id}/draft`,
//! `/api/records/{id}/draft/files` and the draft action endpoints.

use crate::config::FreidataConfig;
use crate::domain::{CanopyError, FreidataError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

use super::api::FreidataApi;
use super::models::{
    Community, CommunitySearchResponse, DepositMetadata, DraftRecord, FileInitEntry, FileListing,
    ReviewCreateRequest, ReviewRequest,
};

/// HTTP client for the FreiData repository
///
/// # Example
///
/// ```no_run
/// use canopy::adapters::freidata::FreidataClient;
/// use canopy::config::FreidataConfig;
/// use canopy::config::secret::secret_string;
///
/// let config = FreidataConfig {
///     base_url: "https://freidata.uni-freiburg.de".to_string(),
///     token: secret_string("api-token".to_string()),
///     ..Default::default()
/// };
/// let client = FreidataClient::new(config);
/// ```
pub struct FreidataClient {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Repository configuration
    config: FreidataConfig,
}

impl FreidataClient {
    /// Create a new client from configuration
    pub fn new(config: FreidataConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        // Build HTTP client with TLS configuration
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().expect("Failed to build HTTP client");

        Self {
            base_url,
            client,
            config,
        }
    }

    /// Base URL of the repository
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn draft_url(&self, record_id: &str) -> String {
        format!("{}/api/records/{record_id}/draft", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.config.token.expose_secret())
    }
}

fn send_error(e: reqwest::Error) -> CanopyError {
    if e.is_timeout() {
        CanopyError::Freidata(FreidataError::Timeout(e.to_string()))
    } else {
        CanopyError::Freidata(FreidataError::ConnectionFailed(e.to_string()))
    }
}

async fn api_error(resp: Response) -> CanopyError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CanopyError::Freidata(
            FreidataError::AuthenticationFailed(format!("status {status}: {body}")),
        ),
        _ => CanopyError::Freidata(FreidataError::ApiError {
            status: status.as_u16(),
            body,
        }),
    }
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| CanopyError::Freidata(FreidataError::InvalidResponse(e.to_string())))
}

#[async_trait]
impl FreidataApi for FreidataClient {
    async fn create_draft(&self, deposit: &DepositMetadata) -> Result<DraftRecord> {
        let url = format!("{}/api/records", self.base_url);

        tracing::debug!(url = %url, "Creating draft record");

        let resp = self
            .authorize(self.client.post(&url).json(deposit))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let draft: DraftRecord = parse_json(resp).await?;

        tracing::info!(record_id = %draft.id, "Created draft record");

        Ok(draft)
    }

    async fn get_draft(&self, record_id: &str) -> Result<DraftRecord> {
        let url = self.draft_url(record_id);

        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(send_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CanopyError::Freidata(FreidataError::RecordNotFound(
                record_id.to_string(),
            )));
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn get_record(&self, record_id: &str) -> Result<DraftRecord> {
        let url = format!("{}/api/records/{record_id}", self.base_url);

        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(send_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CanopyError::Freidata(FreidataError::RecordNotFound(
                record_id.to_string(),
            )));
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn reserve_doi(&self, draft: &DraftRecord) -> Result<serde_json::Value> {
        let url = draft.links.reserve_doi.clone().ok_or_else(|| {
            CanopyError::Freidata(FreidataError::InvalidResponse(format!(
                "Draft {} has no reserve_doi link",
                draft.id
            )))
        })?;

        tracing::debug!(record_id = %draft.id, url = %url, "Reserving DOI");

        let resp = self
            .authorize(self.client.post(&url))
            .send()
            .await
            .map_err(send_error)?;

        // Some InvenioRDM versions expose DOI reservation as PUT only
        let resp = if resp.status() == StatusCode::METHOD_NOT_ALLOWED {
            tracing::debug!(record_id = %draft.id, "POST rejected for DOI reservation, retrying with PUT");
            self.authorize(self.client.put(&url))
                .send()
                .await
                .map_err(send_error)?
        } else {
            resp
        };

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn list_draft_files(&self, record_id: &str) -> Result<FileListing> {
        let url = format!("{}/files", self.draft_url(record_id));

        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn init_draft_files(&self, record_id: &str, keys: &[String]) -> Result<()> {
        let url = format!("{}/files", self.draft_url(record_id));
        let entries: Vec<FileInitEntry> = keys
            .iter()
            .map(|key| FileInitEntry { key: key.clone() })
            .collect();

        tracing::debug!(record_id = %record_id, count = keys.len(), "Registering draft files");

        let resp = self
            .authorize(self.client.post(&url).json(&entries))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        Ok(())
    }

    async fn upload_draft_file(&self, record_id: &str, key: &str, path: &Path) -> Result<()> {
        let url = format!("{}/files/{key}/content", self.draft_url(record_id));

        let body = tokio::fs::read(path).await?;

        tracing::debug!(
            record_id = %record_id,
            key = %key,
            bytes = body.len(),
            "Uploading draft file content"
        );

        let resp = self
            .authorize(
                self.client
                    .put(&url)
                    .header("Content-Type", "application/octet-stream")
                    .body(body),
            )
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        Ok(())
    }

    async fn commit_draft_file(&self, record_id: &str, key: &str) -> Result<()> {
        let url = format!("{}/files/{key}/commit", self.draft_url(record_id));

        let resp = self
            .authorize(self.client.post(&url))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        Ok(())
    }

    async fn delete_draft_file(&self, record_id: &str, key: &str) -> Result<()> {
        let url = format!("{}/files/{key}", self.draft_url(record_id));

        tracing::debug!(record_id = %record_id, key = %key, "Deleting draft file");

        let resp = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        Ok(())
    }

    async fn find_community(&self, query: &str) -> Result<Community> {
        let url = format!("{}/api/communities", self.base_url);

        let resp = self
            .authorize(self.client.get(&url).query(&[("q", query)]))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let response: CommunitySearchResponse = parse_json(resp).await?;

        if response.hits.total > 1 {
            return Err(CanopyError::Freidata(FreidataError::CommunityLookup(
                format!(
                    "query '{query}' matched {} communities, expected exactly one",
                    response.hits.total
                ),
            )));
        }

        response.hits.hits.into_iter().next().ok_or_else(|| {
            CanopyError::Freidata(FreidataError::CommunityLookup(format!(
                "no community matched query '{query}'"
            )))
        })
    }

    async fn create_draft_review(
        &self,
        record_id: &str,
        community_id: &str,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/review", self.draft_url(record_id));
        let body = ReviewCreateRequest::community_submission(community_id);

        tracing::debug!(record_id = %record_id, community_id = %community_id, "Creating community review");

        let resp = self
            .authorize(self.client.put(&url).json(&body))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn submit_draft_review(&self, record_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/actions/submit-review", self.draft_url(record_id));

        tracing::debug!(record_id = %record_id, "Submitting community review");

        let resp = self
            .authorize(self.client.post(&url).json(&serde_json::json!({})))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn get_draft_review(&self, record_id: &str) -> Result<ReviewRequest> {
        let url = format!("{}/review", self.draft_url(record_id));

        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(send_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CanopyError::Freidata(FreidataError::RecordNotFound(
                format!("draft review for {record_id}"),
            )));
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }

    async fn publish_draft(&self, record_id: &str) -> Result<DraftRecord> {
        let url = format!("{}/actions/publish", self.draft_url(record_id));

        tracing::info!(record_id = %record_id, "Publishing draft record");

        let resp = self
            .authorize(self.client.post(&url))
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        parse_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::freidata::models::{
        FilesSettings, RecordLinks, RecordMetadata, ResourceType,
    };
    use crate::config::secret::secret_string;

    fn test_config(base_url: &str) -> FreidataConfig {
        FreidataConfig {
            base_url: base_url.to_string(),
            token: secret_string("test-token".to_string()),
            tls_verify: true,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = FreidataClient::new(test_config("https://freidata.example.org/"));
        assert_eq!(client.base_url(), "https://freidata.example.org");
    }

    #[test]
    fn test_draft_url() {
        let client = FreidataClient::new(test_config("https://freidata.example.org"));
        assert_eq!(
            client.draft_url("c7g4e-9kd22"),
            "https://freidata.example.org/api/records/c7g4e-9kd22/draft"
        );
    }

    #[tokio::test]
    async fn test_get_draft_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/records/missing/draft")
            .with_status(404)
            .with_body(r#"{"status": 404, "message": "not found"}"#)
            .create_async()
            .await;

        let client = FreidataClient::new(test_config(&server.url()));
        let result = client.get_draft("missing").await;

        mock.assert_async().await;
        match result {
            Err(CanopyError::Freidata(FreidataError::RecordNotFound(id))) => {
                assert_eq!(id, "missing");
            }
            other => panic!("Expected RecordNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_draft_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/records")
            .match_header("authorization", "Bearer test-token")
            .with_status(201)
            .with_body(
                r#"{
                    "id": "c7g4e-9kd22",
                    "is_published": false,
                    "links": {"reserve_doi": "https://freidata.example.org/api/records/c7g4e-9kd22/draft/pids/doi"}
                }"#,
            )
            .create_async()
            .await;

        let client = FreidataClient::new(test_config(&server.url()));
        let deposit = DepositMetadata {
            access: Default::default(),
            files: FilesSettings { enabled: true },
            metadata: RecordMetadata {
                resource_type: ResourceType {
                    id: "dataset".to_string(),
                },
                title: "Test".to_string(),
                description: "Test".to_string(),
                publication_date: "2026-08-25".to_string(),
                publisher: "deadtrees.earth".to_string(),
                creators: vec![],
                rights: vec![],
            },
        };

        let draft = client.create_draft(&deposit).await.unwrap();

        mock.assert_async().await;
        assert_eq!(draft.id, "c7g4e-9kd22");
        assert!(draft.links.reserve_doi.is_some());
    }

    #[tokio::test]
    async fn test_reserve_doi_falls_back_to_put() {
        let mut server = mockito::Server::new_async().await;
        let post_mock = server
            .mock("POST", "/api/records/c7g4e/draft/pids/doi")
            .with_status(405)
            .create_async()
            .await;
        let put_mock = server
            .mock("PUT", "/api/records/c7g4e/draft/pids/doi")
            .with_status(200)
            .with_body(r#"{"pids": {"doi": {"identifier": "10.60493/c7g4e"}}}"#)
            .create_async()
            .await;

        let client = FreidataClient::new(test_config(&server.url()));
        let draft = DraftRecord {
            id: "c7g4e".to_string(),
            is_published: false,
            links: RecordLinks {
                reserve_doi: Some(format!("{}/api/records/c7g4e/draft/pids/doi", server.url())),
                ..Default::default()
            },
            pids: Default::default(),
        };

        let response = client.reserve_doi(&draft).await.unwrap();

        post_mock.assert_async().await;
        put_mock.assert_async().await;
        assert_eq!(response["pids"]["doi"]["identifier"], "10.60493/c7g4e");
    }

    #[tokio::test]
    async fn test_find_community_requires_single_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/communities?q=deadtrees")
            .with_status(200)
            .with_body(
                r#"{"hits": {"hits": [{"id": "a1"}, {"id": "b2"}], "total": 2}}"#,
            )
            .create_async()
            .await;

        let client = FreidataClient::new(test_config(&server.url()));
        let result = client.find_community("deadtrees").await;

        match result {
            Err(CanopyError::Freidata(FreidataError::CommunityLookup(msg))) => {
                assert!(msg.contains("matched 2"));
            }
            other => panic!("Expected CommunityLookup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/records/c7g4e/draft/actions/publish")
            .with_status(400)
            .with_body(r#"{"message": "validation failed"}"#)
            .create_async()
            .await;

        let client = FreidataClient::new(test_config(&server.url()));
        let result = client.publish_draft("c7g4e").await;

        match result {
            Err(CanopyError::Freidata(FreidataError::ApiError { status, body })) => {
                assert_eq!(status, 400);
                assert!(body.contains("validation failed"));
            }
            other => panic!("Expected ApiError, got {other:?}"),
        }
    }
}
