//! Sync command implementation
//!
//! This module implements the `sync` command that reconciles in-review
//! publications against the repository without touching the pending backlog.

use crate::adapters::factory::connect_services;
use crate::config::load_config;
use crate::core::sync::Reconciler;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

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

        let reconciler = Reconciler::new(services.api, services.store, services.notifier);

        println!("🚀 Reconciling in-review publications...");
        println!();

        let summary = match reconciler.run().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation failed");
                eprintln!("Reconciliation failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("📊 Sync Summary:");
        println!("  Checked: {}", summary.checked);
        println!("  Published: {}", summary.published);
        println!("  Declined: {}", summary.declined);
        println!("  Still in review: {}", summary.still_in_review);
        println!("  Errors: {}", summary.errors.len());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors:");
            for error in &summary.errors {
                println!("  - publication {}: {}", error.publication_id, error.message);
            }
            println!();
        }

        if summary.is_clean() {
            println!("✅ Reconciliation completed successfully!");
            Ok(0)
        } else {
            println!("⚠️  Reconciliation completed with errors");
            Ok(1) // Partial success
        }
    }
}
