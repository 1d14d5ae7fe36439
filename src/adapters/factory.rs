//! Adapter factory
//!
//! Builds the full adapter set from configuration. The pipeline, the
//! reconciler and the cron pass all consume the same trait objects, so the
//! CLI commands construct them once here and share them.

use crate::adapters::bundler::{BundleService, BundlerClient};
use crate::adapters::freidata::{FreidataApi, FreidataClient};
use crate::adapters::store::{PostgresClient, PostgresPublicationStore, PublicationStore};
use crate::adapters::zulip::{NoopNotifier, Notifier, ZulipNotifier};
use crate::config::CanopyConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Connected adapters for one command invocation
pub struct Services {
    /// Repository API client
    pub api: Arc<dyn FreidataApi>,

    /// Publication store backed by PostgreSQL
    pub store: Arc<dyn PublicationStore>,

    /// Lifecycle notifier (no-op when Zulip is not configured)
    pub notifier: Arc<dyn Notifier>,

    /// Bundle service client, when one is configured
    pub bundler: Option<Arc<dyn BundleService>>,
}

/// Connect every adapter the configuration names
///
/// The store connection is verified and the schema is ensured before the
/// services are handed out, so a dead database fails here rather than in
/// the middle of a publication run.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the schema cannot be
/// applied.
pub async fn connect_services(config: &CanopyConfig) -> Result<Services> {
    tracing::info!(
        base_url = %config.freidata.base_url,
        "Creating FreiData client"
    );
    let api: Arc<dyn FreidataApi> = Arc::new(FreidataClient::new(config.freidata.clone()));

    tracing::info!("Connecting publication store");
    let client = PostgresClient::new(config.database.clone()).await?;
    client.test_connection().await?;
    client.ensure_schema().await?;
    let store: Arc<dyn PublicationStore> = Arc::new(PostgresPublicationStore::new(client));

    let notifier: Arc<dyn Notifier> = match config.zulip {
        Some(ref zulip) => {
            tracing::info!(base_url = %zulip.base_url, stream = %zulip.stream, "Creating Zulip notifier");
            Arc::new(ZulipNotifier::new(zulip.clone()))
        }
        None => {
            tracing::debug!("No Zulip configuration, notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let bundler: Option<Arc<dyn BundleService>> = config.bundler.as_ref().map(|bundler_config| {
        tracing::info!(base_url = %bundler_config.base_url, "Creating bundle service client");
        Arc::new(BundlerClient::new(bundler_config.clone())) as Arc<dyn BundleService>
    });

    Ok(Services {
        api,
        store,
        notifier,
        bundler,
    })
}
