//! Cron command implementation
//!
//! This module implements the `cron` command, the entry point a scheduler
//! invokes to run one full lifecycle pass.

use crate::adapters::factory::connect_services;
use crate::config::load_config;
use crate::core::bundle::BundleAcquirer;
use crate::core::cron::CronOrchestrator;
use crate::core::pipeline::PublicationPipeline;
use crate::core::sync::Reconciler;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the cron command
#[derive(Args, Debug)]
pub struct CronArgs {}

impl CronArgs {
    /// Execute the cron command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting cron pass");

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

        let reconciler = Reconciler::new(
            services.api.clone(),
            services.store.clone(),
            services.notifier.clone(),
        );

        let orchestrator = CronOrchestrator::new(
            pipeline,
            reconciler,
            services.store.clone(),
            PathBuf::from(&config.publish.work_dir),
        );

        println!("🚀 Running lifecycle pass...");
        println!();

        let summary = orchestrator.run().await;

        println!("📊 Cron Summary:");
        println!("  Pending processed: {}", summary.processed);
        println!("  Succeeded: {}", summary.succeeded);
        println!("  Failed: {}", summary.failures.len());
        if let Some(ref sync) = summary.sync {
            println!("  Reviews checked: {}", sync.checked);
            println!("  Published: {}", sync.published);
            println!("  Declined: {}", sync.declined);
            println!("  Still in review: {}", sync.still_in_review);
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if !summary.failures.is_empty() {
            println!("⚠️  Failures:");
            for failure in &summary.failures {
                match failure.publication_id {
                    Some(id) => println!("  - publication {}: {}", id, failure.message),
                    None => println!("  - {}", failure.message),
                }
            }
            println!();
        }

        if summary.is_successful() {
            println!("✅ Lifecycle pass completed successfully!");
            Ok(0)
        } else {
            println!("⚠️  Lifecycle pass completed with failures");
            Ok(1) // Partial success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cron_args_creation() {
        let args = CronArgs {};
        let _ = format!("{args:?}");
    }
}
