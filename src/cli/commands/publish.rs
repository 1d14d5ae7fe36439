//! Publish command implementation
//!
//! This module implements the `publish` command that runs the full pipeline
//! for one publication.

use crate::adapters::factory::connect_services;
use crate::config::load_config;
use crate::core::bundle::BundleAcquirer;
use crate::core::cron::publication_work_folder;
use crate::core::pipeline::PublicationPipeline;
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Publication to publish
    #[arg(long)]
    pub id: i64,

    /// Working folder override (default: <work_dir>/publication_<id>)
    #[arg(long)]
    pub folder: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(publication_id = self.id, "Starting publish command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("Configuration error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let services = match connect_services(&config).await {
            Ok(services) => services,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect services");
                eprintln!("Failed to connect: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let bundler = services
            .bundler
            .clone()
            .zip(config.bundler.clone())
            .map(|(service, bundler_config)| BundleAcquirer::new(service, bundler_config));

        let pipeline = PublicationPipeline::new(
            services.api.clone(),
            services.store.clone(),
            services.notifier.clone(),
            bundler,
            config.publish.clone(),
        );

        let work_folder = match self.folder {
            Some(ref folder) => folder.clone(),
            None => publication_work_folder(Path::new(&config.publish.work_dir), self.id),
        };

        println!("🚀 Publishing publication {}...", self.id);
        println!("   Working folder: {}", work_folder.display());
        println!();

        let report = match pipeline.run_safe(self.id, &work_folder).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(publication_id = self.id, error = %e, "Publish failed");
                eprintln!("Publish failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("📊 Publish Summary:");
        println!("  Publication: {}", report.publication_id);
        println!(
            "  Record: {}",
            report.record_id.as_deref().unwrap_or("none")
        );
        println!("  DOI: {}", report.doi.as_deref().unwrap_or("none"));
        println!("  Uploaded: {}", report.uploaded_files.len());
        println!("  Skipped: {}", report.skipped_files.len());
        println!("  Review created: {}", report.review_created);
        println!("  Review submitted: {}", report.review_submitted);
        println!();

        if report.already_published {
            println!("✅ Publication already has a DOI, nothing was done");
        } else if report.published {
            println!("✅ Publication published!");
        } else if report.review_submitted {
            println!("✅ Draft submitted for community review");
        } else {
            println!("✅ Draft is up to date");
        }

        Ok(0)
    }
}
