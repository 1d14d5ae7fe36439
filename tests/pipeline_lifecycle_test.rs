//! End-to-end pipeline lifecycle tests against scripted collaborators
//!
//! The repository, the store and the notifier are in-memory stubs, so these
//! tests exercise the real coordinator logic: the DOI guard, archive
//! validation, draft reuse across interrupted runs, the review hand-off and
//! the publish step.

use async_trait::async_trait;
use canopy::adapters::freidata::models::{
    Community, CommunityMetadata, DepositMetadata, DoiPid, DraftRecord, FileEntry, FileListing,
    FileStatus, Pids, RecordLinks, ReviewRequest,
};
use canopy::adapters::freidata::FreidataApi;
use canopy::adapters::store::PublicationStore;
use canopy::adapters::zulip::Notifier;
use canopy::config::PublishConfig;
use canopy::core::cron::{publication_work_folder, CronOrchestrator};
use canopy::core::pipeline::PublicationPipeline;
use canopy::core::state::STATE_FILE_NAME;
use canopy::core::sync::Reconciler;
use canopy::domain::{Author, CanopyError, Publication, PublicationStatus, Result};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// FreiData stub that records calls and serves scripted file listings
struct ScriptedApi {
    record_id: String,
    listings: Mutex<Vec<Vec<(String, FileStatus)>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn new(record_id: &str, listings: Vec<Vec<(String, FileStatus)>>) -> Self {
        Self {
            record_id: record_id.to_string(),
            listings: Mutex::new(listings),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Unpublished draft without a DOI or a reserve_doi link
    fn draft(&self) -> DraftRecord {
        DraftRecord {
            id: self.record_id.clone(),
            is_published: false,
            links: RecordLinks::default(),
            pids: Pids::default(),
        }
    }
}

#[async_trait]
impl FreidataApi for ScriptedApi {
    async fn create_draft(&self, _deposit: &DepositMetadata) -> Result<DraftRecord> {
        self.record("create_draft");
        Ok(self.draft())
    }

    async fn get_draft(&self, record_id: &str) -> Result<DraftRecord> {
        self.record(format!("get_draft:{record_id}"));
        Ok(self.draft())
    }

    async fn get_record(&self, _record_id: &str) -> Result<DraftRecord> {
        unimplemented!("not exercised by lifecycle tests")
    }

    async fn reserve_doi(&self, _draft: &DraftRecord) -> Result<serde_json::Value> {
        unimplemented!("drafts carry no reserve_doi link in these tests")
    }

    async fn list_draft_files(&self, _record_id: &str) -> Result<FileListing> {
        self.record("list");
        let mut listings = self.listings.lock().unwrap();
        let entries = if listings.is_empty() {
            Vec::new()
        } else {
            listings.remove(0)
        };
        Ok(FileListing {
            entries: entries
                .into_iter()
                .map(|(key, status)| FileEntry { key, status })
                .collect(),
        })
    }

    async fn init_draft_files(&self, _record_id: &str, keys: &[String]) -> Result<()> {
        self.record(format!("init:{}", keys.join(",")));
        Ok(())
    }

    async fn upload_draft_file(&self, _record_id: &str, key: &str, _path: &Path) -> Result<()> {
        self.record(format!("upload:{key}"));
        Ok(())
    }

    async fn commit_draft_file(&self, _record_id: &str, key: &str) -> Result<()> {
        self.record(format!("commit:{key}"));
        Ok(())
    }

    async fn delete_draft_file(&self, _record_id: &str, key: &str) -> Result<()> {
        self.record(format!("delete:{key}"));
        Ok(())
    }

    async fn find_community(&self, query: &str) -> Result<Community> {
        self.record(format!("find_community:{query}"));
        Ok(Community {
            id: "3d1a2b".to_string(),
            slug: Some(query.to_string()),
            metadata: CommunityMetadata::default(),
        })
    }

    async fn create_draft_review(
        &self,
        record_id: &str,
        community_id: &str,
    ) -> Result<serde_json::Value> {
        self.record(format!("create_review:{record_id}:{community_id}"));
        Ok(json!({"id": "rev-1", "status": "created"}))
    }

    async fn submit_draft_review(&self, record_id: &str) -> Result<serde_json::Value> {
        self.record(format!("submit_review:{record_id}"));
        Ok(json!({"id": "rev-1", "status": "submitted"}))
    }

    async fn get_draft_review(&self, _record_id: &str) -> Result<ReviewRequest> {
        unimplemented!("not exercised by lifecycle tests")
    }

    async fn publish_draft(&self, record_id: &str) -> Result<DraftRecord> {
        self.record(format!("publish:{record_id}"));
        Ok(DraftRecord {
            id: self.record_id.clone(),
            is_published: true,
            links: RecordLinks::default(),
            pids: Pids {
                doi: Some(DoiPid {
                    identifier: "10.60493/test-doi".to_string(),
                    provider: Some("datacite".to_string()),
                }),
            },
        })
    }
}

/// In-memory publication store recording every lifecycle write
struct MemoryStore {
    rows: Mutex<HashMap<i64, Publication>>,
    transitions: Mutex<Vec<(i64, PublicationStatus)>>,
    published: Mutex<Vec<(i64, Option<String>)>>,
    notified: Mutex<Vec<i64>>,
}

impl MemoryStore {
    fn new(rows: Vec<Publication>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().map(|p| (p.id, p)).collect()),
            transitions: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            notified: Mutex::new(Vec::new()),
        }
    }

    fn row(&self, id: i64) -> Publication {
        self.rows.lock().unwrap().get(&id).cloned().unwrap()
    }

    fn transitions(&self) -> Vec<(i64, PublicationStatus)> {
        self.transitions.lock().unwrap().clone()
    }

    fn published(&self) -> Vec<(i64, Option<String>)> {
        self.published.lock().unwrap().clone()
    }

    fn notified(&self) -> Vec<i64> {
        self.notified.lock().unwrap().clone()
    }

    fn clear_record_id(&self, id: i64) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            row.freidata_record_id = None;
        }
    }
}

#[async_trait]
impl PublicationStore for MemoryStore {
    async fn get_publication(&self, id: i64) -> Result<Publication> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CanopyError::Validation(format!("Publication {id} not found")))
    }

    async fn list_by_status(&self, status: PublicationStatus) -> Result<Vec<Publication>> {
        let mut rows: Vec<Publication> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    async fn set_status(&self, id: i64, status: PublicationStatus) -> Result<()> {
        self.transitions.lock().unwrap().push((id, status));
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            row.status = status;
        }
        Ok(())
    }

    async fn set_record_id(&self, id: i64, record_id: &str) -> Result<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            row.freidata_record_id = Some(record_id.to_string());
        }
        Ok(())
    }

    async fn set_published(&self, id: i64, doi: Option<&str>) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((id, doi.map(str::to_string)));
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            row.status = PublicationStatus::Published;
            if row.doi.is_none() {
                row.doi = doi.map(str::to_string);
            }
        }
        Ok(())
    }

    async fn mark_notified(&self, id: i64) -> Result<()> {
        self.notified.lock().unwrap().push(id);
        Ok(())
    }
}

/// Notifier that keeps every delivered message
struct CountingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CountingNotifier {
    fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn pending_publication(id: i64, dataset_ids: Vec<i64>) -> Publication {
    Publication {
        id,
        title: "Östra Göinge, Sweden".to_string(),
        description: "UAV orthophotos of standing deadwood".to_string(),
        authors: vec![Author {
            given_name: "Anna".to_string(),
            family_name: "Lind".to_string(),
            organization: None,
            orcid: None,
        }],
        status: PublicationStatus::Pending,
        doi: None,
        freidata_record_id: None,
        notified_at: None,
        dataset_ids,
    }
}

fn direct_publish_config() -> PublishConfig {
    PublishConfig {
        work_dir: "./publications".to_string(),
        overwrite_remote_files: false,
        clean_archives: false,
        community: None,
        submit_review: false,
        publish_record: true,
    }
}

#[tokio::test]
async fn test_existing_doi_short_circuits_without_remote_calls() {
    let api = Arc::new(ScriptedApi::new("rec-9", vec![]));
    let mut row = pending_publication(36, vec![101]);
    row.status = PublicationStatus::Published;
    row.doi = Some("10.60493/existing".to_string());
    row.freidata_record_id = Some("rec-9".to_string());
    let store = Arc::new(MemoryStore::new(vec![row]));
    let notifier = Arc::new(CountingNotifier::new());

    let pipeline = PublicationPipeline::new(
        api.clone(),
        store.clone(),
        notifier.clone(),
        None,
        direct_publish_config(),
    );

    let dir = tempfile::tempdir().unwrap();
    let report = pipeline
        .run_safe(36, &dir.path().join("publication_36"))
        .await
        .unwrap();

    assert!(report.already_published);
    assert_eq!(report.doi.as_deref(), Some("10.60493/existing"));
    assert_eq!(report.record_id.as_deref(), Some("rec-9"));

    // Terminal state: no remote call, no status write
    assert!(api.calls().is_empty());
    assert!(store.transitions().is_empty());
    assert!(store.published().is_empty());
}

#[tokio::test]
async fn test_empty_work_folder_without_bundler_parks_in_error() {
    let api = Arc::new(ScriptedApi::new("rec-1", vec![]));
    let store = Arc::new(MemoryStore::new(vec![pending_publication(36, vec![101])]));
    let notifier = Arc::new(CountingNotifier::new());

    let pipeline = PublicationPipeline::new(
        api.clone(),
        store.clone(),
        notifier.clone(),
        None,
        direct_publish_config(),
    );

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline.run_safe(36, dir.path()).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("no zip archives"));

    // The run failed before any repository call and parked the row in error
    assert!(api.calls().is_empty());
    assert_eq!(
        store.transitions(),
        vec![
            (36, PublicationStatus::Uploading),
            (36, PublicationStatus::Error),
        ]
    );

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Publication 36 failed"));
}

#[tokio::test]
async fn test_second_run_reuses_draft_and_skips_completed_upload() {
    let api = Arc::new(ScriptedApi::new(
        "rec-1",
        vec![
            vec![],
            vec![("101.zip".to_string(), FileStatus::Pending)],
            vec![("101.zip".to_string(), FileStatus::Completed)],
        ],
    ));
    let store = Arc::new(MemoryStore::new(vec![pending_publication(36, vec![101])]));
    let notifier = Arc::new(CountingNotifier::new());

    let mut config = direct_publish_config();
    config.publish_record = false;

    let pipeline =
        PublicationPipeline::new(api.clone(), store.clone(), notifier.clone(), None, config);

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("101.zip"), b"zip-bytes").unwrap();

    let first = pipeline.run_safe(36, dir.path()).await.unwrap();
    assert_eq!(first.record_id.as_deref(), Some("rec-1"));
    assert_eq!(first.uploaded_files, vec!["101.zip"]);
    assert!(dir.path().join(STATE_FILE_NAME).exists());
    assert_eq!(store.row(36).freidata_record_id.as_deref(), Some("rec-1"));

    // Even with the store column wiped, the resume state still knows the draft
    store.clear_record_id(36);

    let second = pipeline.run_safe(36, dir.path()).await.unwrap();
    assert_eq!(second.record_id.as_deref(), Some("rec-1"));
    assert!(second.uploaded_files.is_empty());
    assert_eq!(second.skipped_files, vec!["101.zip"]);

    assert_eq!(api.count("create_draft"), 1);
    assert_eq!(api.count("get_draft:rec-1"), 1);
    assert_eq!(api.count("upload:"), 1);
    assert_eq!(api.count("commit:"), 1);
}

#[tokio::test]
async fn test_submitted_review_defers_publication_to_later_run() {
    let api = Arc::new(ScriptedApi::new(
        "rec-1",
        vec![vec![], vec![("101.zip".to_string(), FileStatus::Pending)]],
    ));
    let store = Arc::new(MemoryStore::new(vec![pending_publication(36, vec![101])]));
    let notifier = Arc::new(CountingNotifier::new());

    let config = PublishConfig {
        work_dir: "./publications".to_string(),
        overwrite_remote_files: false,
        clean_archives: false,
        community: Some("deadtrees".to_string()),
        submit_review: true,
        publish_record: true,
    };

    let pipeline =
        PublicationPipeline::new(api.clone(), store.clone(), notifier.clone(), None, config);

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("101.zip"), b"zip-bytes").unwrap();

    let report = pipeline.run_safe(36, dir.path()).await.unwrap();

    assert!(report.review_created);
    assert!(report.review_submitted);
    assert!(!report.published);

    let calls = api.calls();
    assert!(calls.contains(&"find_community:deadtrees".to_string()));
    assert!(calls.contains(&"create_review:rec-1:3d1a2b".to_string()));
    assert!(calls.contains(&"submit_review:rec-1".to_string()));

    // Review and publish never happen in the same run
    assert_eq!(api.count("publish:"), 0);
    assert!(store.published().is_empty());
    assert_eq!(store.transitions(), vec![(36, PublicationStatus::Uploading)]);
    assert_eq!(store.row(36).status, PublicationStatus::Uploading);

    let messages = notifier.messages();
    assert!(messages
        .iter()
        .any(|m| m.contains("submitted for community review")));
}

#[tokio::test]
async fn test_direct_publish_records_doi_and_notifies() {
    let api = Arc::new(ScriptedApi::new(
        "rec-1",
        vec![vec![], vec![("101.zip".to_string(), FileStatus::Pending)]],
    ));
    let store = Arc::new(MemoryStore::new(vec![pending_publication(36, vec![101])]));
    let notifier = Arc::new(CountingNotifier::new());

    let pipeline = PublicationPipeline::new(
        api.clone(),
        store.clone(),
        notifier.clone(),
        None,
        direct_publish_config(),
    );

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("101.zip"), b"zip-bytes").unwrap();

    let report = pipeline.run_safe(36, dir.path()).await.unwrap();

    assert!(report.published);
    assert_eq!(report.doi.as_deref(), Some("10.60493/test-doi"));
    assert_eq!(api.count("publish:"), 1);

    assert_eq!(
        store.published(),
        vec![(36, Some("10.60493/test-doi".to_string()))]
    );
    assert_eq!(store.row(36).status, PublicationStatus::Published);
    assert_eq!(store.notified(), vec![36]);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("is published: 10.60493/test-doi"));
}

#[tokio::test]
async fn test_cron_pass_processes_pending_and_always_reconciles() {
    // Publication 1 has its archive staged; publication 2's folder stays empty
    let api = Arc::new(ScriptedApi::new(
        "rec-1",
        vec![vec![], vec![("101.zip".to_string(), FileStatus::Pending)]],
    ));
    let store = Arc::new(MemoryStore::new(vec![
        pending_publication(1, vec![101]),
        pending_publication(2, vec![102]),
    ]));
    let notifier = Arc::new(CountingNotifier::new());

    let work_dir = tempfile::tempdir().unwrap();
    let staged = publication_work_folder(work_dir.path(), 1);
    std::fs::create_dir_all(&staged).unwrap();
    std::fs::write(staged.join("101.zip"), b"zip-bytes").unwrap();

    let mut config = direct_publish_config();
    config.publish_record = false;

    let pipeline =
        PublicationPipeline::new(api.clone(), store.clone(), notifier.clone(), None, config);
    let reconciler = Reconciler::new(api.clone(), store.clone(), notifier.clone());
    let orchestrator = CronOrchestrator::new(
        pipeline,
        reconciler,
        store.clone(),
        work_dir.path().to_path_buf(),
    );

    let summary = orchestrator.run().await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].publication_id, Some(2));
    assert!(!summary.is_successful());

    // The reconciliation phase still ran, with nothing in review to check
    let sync = summary.sync.as_ref().unwrap();
    assert_eq!(sync.checked, 0);

    assert_eq!(store.row(1).freidata_record_id.as_deref(), Some("rec-1"));
    assert_eq!(store.row(2).status, PublicationStatus::Error);
}
