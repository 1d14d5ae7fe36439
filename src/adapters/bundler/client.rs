//! Bundle service client
//!
//! This module implements `BundleService` against the internal download
//! service. Job submission and status polls are plain GET endpoints; bundle
//! downloads are streamed to disk with a size check.

use crate::config::BundlerConfig;
use crate::domain::{BundlerError, CanopyError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

use super::models::BundleJob;

/// Interface to the bundle assembly service
///
/// One call maps to one request; retry and poll loops live with the caller.
#[async_trait]
pub trait BundleService: Send + Sync {
    /// Submit a bundle assembly job for the given datasets
    async fn submit_job(&self, dataset_ids: &[i64]) -> Result<BundleJob>;

    /// Fetch the current state of a job
    async fn job_status(&self, job_id: &str) -> Result<BundleJob>;

    /// Download a bundle to `dest` in a single attempt
    ///
    /// `download_path` may be absolute or relative to the service origin.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `BundlerError::Integrity` when the download is empty or does
    /// not match the advertised Content-Length.
    async fn download_to(&self, download_path: &str, dest: &Path) -> Result<u64>;
}

/// HTTP client for the bundle assembly service
pub struct BundlerClient {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for job submission and status polls
    client: Client,

    /// Separate client for downloads, without an overall request timeout
    download_client: Client,

    /// Bundler configuration
    config: BundlerConfig,
}

impl BundlerClient {
    /// Create a new client from configuration
    pub fn new(config: BundlerConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        // Bundles can take minutes to transfer, so the download client only
        // bounds connection establishment
        let download_client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url,
            client,
            download_client,
            config,
        }
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a download path against the service origin
    fn resolve_download_url(&self, download_path: &str) -> Result<String> {
        if download_path.starts_with("http://") || download_path.starts_with("https://") {
            return Ok(download_path.to_string());
        }

        let base = Url::parse(&self.base_url).map_err(|e| {
            CanopyError::Bundler(BundlerError::InvalidResponse(format!(
                "invalid bundler base URL: {e}"
            )))
        })?;
        let url = base.join(download_path).map_err(|e| {
            CanopyError::Bundler(BundlerError::InvalidResponse(format!(
                "invalid download path '{download_path}': {e}"
            )))
        })?;

        Ok(url.to_string())
    }
}

fn send_error(e: reqwest::Error) -> CanopyError {
    if e.is_timeout() {
        CanopyError::Bundler(BundlerError::Timeout(e.to_string()))
    } else {
        CanopyError::Bundler(BundlerError::ConnectionFailed(e.to_string()))
    }
}

async fn api_error(resp: Response) -> CanopyError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    CanopyError::Bundler(BundlerError::ApiError {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl BundleService for BundlerClient {
    async fn submit_job(&self, dataset_ids: &[i64]) -> Result<BundleJob> {
        let url = format!("{}/api/v1/bundle", self.base_url);

        let mut params: Vec<(&str, String)> = dataset_ids
            .iter()
            .map(|id| ("dataset-id", id.to_string()))
            .collect();
        params.push(("label", self.config.include_labels.to_string()));
        params.push(("parquet", self.config.include_parquet.to_string()));
        params.push((
            "original-filename",
            self.config.original_filenames.to_string(),
        ));

        tracing::debug!(
            dataset_count = dataset_ids.len(),
            url = %url,
            "Submitting bundle job"
        );

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        resp.json::<BundleJob>()
            .await
            .map_err(|e| CanopyError::Bundler(BundlerError::InvalidResponse(e.to_string())))
    }

    async fn job_status(&self, job_id: &str) -> Result<BundleJob> {
        let url = format!("{}/api/v1/bundle/status/{job_id}", self.base_url);

        let resp = self.client.get(&url).send().await.map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        resp.json::<BundleJob>()
            .await
            .map_err(|e| CanopyError::Bundler(BundlerError::InvalidResponse(e.to_string())))
    }

    async fn download_to(&self, download_path: &str, dest: &Path) -> Result<u64> {
        let url = self.resolve_download_url(download_path)?;

        tracing::debug!(url = %url, dest = %dest.display(), "Downloading bundle");

        let mut resp = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(send_error)?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let expected = resp.content_length();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| CanopyError::Bundler(BundlerError::ConnectionFailed(e.to_string())))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(CanopyError::Bundler(BundlerError::Integrity(
                "downloaded bundle is empty".to_string(),
            )));
        }
        if let Some(expected) = expected {
            if written != expected {
                return Err(CanopyError::Bundler(BundlerError::Integrity(format!(
                    "expected {expected} bytes, wrote {written}"
                ))));
            }
        }

        tracing::debug!(bytes = written, "Bundle download finished");

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bundler::models::BundleJobStatus;

    fn test_config(base_url: &str) -> BundlerConfig {
        BundlerConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            poll_interval_seconds: 1,
            poll_deadline_seconds: 10,
            include_labels: true,
            include_parquet: false,
            original_filenames: true,
            download_attempts: 3,
            download_backoff_ms: 10,
        }
    }

    #[test]
    fn test_resolve_download_url() {
        let client = BundlerClient::new(test_config("https://processor.deadtrees.earth"));

        assert_eq!(
            client
                .resolve_download_url("/downloads/v1/bundle_36.zip")
                .unwrap(),
            "https://processor.deadtrees.earth/downloads/v1/bundle_36.zip"
        );
        assert_eq!(
            client
                .resolve_download_url("https://cdn.example.org/bundle.zip")
                .unwrap(),
            "https://cdn.example.org/bundle.zip"
        );
    }

    #[tokio::test]
    async fn test_submit_job_sends_repeated_dataset_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/bundle")
            .match_query(mockito::Matcher::AllOf(vec![
                // Matcher::UrlEncoded collapses repeated keys into a HashMap,
                // so the repeated dataset-id pairs are matched by regex instead
                mockito::Matcher::Regex("(^|&)dataset-id=101(&|$)".into()),
                mockito::Matcher::Regex("(^|&)dataset-id=102(&|$)".into()),
                mockito::Matcher::UrlEncoded("label".into(), "true".into()),
                mockito::Matcher::UrlEncoded("parquet".into(), "false".into()),
                mockito::Matcher::UrlEncoded("original-filename".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status": "queued", "job_id": "j-1"}"#)
            .create_async()
            .await;

        let client = BundlerClient::new(test_config(&server.url()));
        let job = client.submit_job(&[101, 102]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(job.status, BundleJobStatus::Queued);
        assert_eq!(job.job_id.as_deref(), Some("j-1"));
    }

    #[tokio::test]
    async fn test_download_rejects_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads/v1/bundle_36.zip")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bundle_36.zip.part");

        let client = BundlerClient::new(test_config(&server.url()));
        let result = client
            .download_to("/downloads/v1/bundle_36.zip", &dest)
            .await;

        match result {
            Err(CanopyError::Bundler(BundlerError::Integrity(msg))) => {
                assert!(msg.contains("empty"));
            }
            other => panic!("Expected Integrity error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_writes_body_to_dest() {
        let mut server = mockito::Server::new_async().await;
        let body = b"PK\x03\x04 not really a zip".to_vec();
        server
            .mock("GET", "/downloads/v1/bundle_36.zip")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bundle_36.zip.part");

        let client = BundlerClient::new(test_config(&server.url()));
        let written = client
            .download_to("/downloads/v1/bundle_36.zip", &dest)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }
}
