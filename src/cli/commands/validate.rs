//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Canopy configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading covers parsing, env substitution and validation
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  FreiData: {}", config.freidata.base_url);
        println!("  TLS Verify: {}", config.freidata.tls_verify);

        match config.bundler {
            Some(ref bundler) => {
                println!("  Bundler: {}", bundler.base_url);
                println!(
                    "  Bundler Polling: every {}s, deadline {}s",
                    bundler.poll_interval_seconds, bundler.poll_deadline_seconds
                );
            }
            None => println!("  Bundler: disabled (folders must hold archives)"),
        }

        {
            use secrecy::ExposeSecret;
            println!(
                "  Database: {}",
                config
                    .database
                    .connection_string
                    .expose_secret()
                    .as_ref()
                    .split('@')
                    .next_back()
                    .unwrap_or("***")
            );
        }
        println!("  Max Connections: {}", config.database.max_connections);

        println!("  Work Dir: {}", config.publish.work_dir);
        println!("  Clean Archives: {}", config.publish.clean_archives);
        println!(
            "  Overwrite Remote Files: {}",
            config.publish.overwrite_remote_files
        );
        println!(
            "  Community: {}",
            config.publish.community.as_deref().unwrap_or("none")
        );
        println!("  Submit Review: {}", config.publish.submit_review);
        println!("  Publish Record: {}", config.publish.publish_record);

        match config.zulip {
            Some(ref zulip) => {
                println!("  Zulip: {} -> {}/{}", zulip.base_url, zulip.stream, zulip.topic);
            }
            None => println!("  Zulip: disabled"),
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        // Just ensure it compiles and can be created
        let _ = format!("{args:?}");
    }
}
