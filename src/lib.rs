// Canopy - FreiData publication pipeline for deadtrees.earth
// Copyright (c) 2025 Canopy Contributors
// Licensed under the MIT License

//! # Canopy - FreiData Publication Pipeline
//!
//! Canopy publishes curated deadtrees.earth dataset collections to the
//! FreiData archival repository (InvenioRDM). A run takes a publication row
//! from the platform database, pulls its dataset bundle together, creates a
//! draft record, uploads the archives, hands the draft to a community review
//! and finally closes the row out with the registered DOI.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Acquiring** dataset bundles from the internal download service
//! - **Uploading** archives to FreiData drafts, idempotently
//! - **Reviewing** drafts through InvenioRDM community reviews
//! - **Reconciling** review decisions back into the platform database
//!
//! Every remote step is resume-safe: an interrupted run leaves a state file
//! in the working folder and the next run picks up where it stopped, without
//! duplicating drafts, DOIs, uploads or review requests.
//!
//! ## Architecture
//!
//! Canopy follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pipeline, bundle, archive, sync, cron)
//! - [`adapters`] - External integrations (FreiData, bundler, store, Zulip)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canopy::adapters::factory::connect_services;
//! use canopy::config::load_config;
//! use canopy::core::bundle::BundleAcquirer;
//! use canopy::core::pipeline::PublicationPipeline;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("canopy.toml")?;
//!
//!     // Connect the adapters and build the pipeline
//!     let services = connect_services(&config).await?;
//!     let bundler = services
//!         .bundler
//!         .clone()
//!         .zip(config.bundler.clone())
//!         .map(|(service, bundler_config)| BundleAcquirer::new(service, bundler_config));
//!     let pipeline = PublicationPipeline::new(
//!         services.api.clone(),
//!         services.store.clone(),
//!         services.notifier.clone(),
//!         bundler,
//!         config.publish.clone(),
//!     );
//!
//!     // Run one publication
//!     let report = pipeline.run_safe(36, Path::new("./publications/publication_36")).await?;
//!
//!     println!("Uploaded {} archives", report.uploaded_files.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! ### Crash-Resumable Runs
//!
//! Canopy keeps per-folder resume state in `freidata_state.json`, written
//! atomically next to the archives. The draft record id lands there before
//! it lands in the database, so a crash between the two writes never causes
//! a second draft:
//!
//! ```rust,no_run
//! use canopy::core::state::ResumeState;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = ResumeState::load(Path::new("./publications/publication_36"))?;
//!
//! if let Some(record_id) = state.record_id() {
//!     println!("Draft {record_id} already exists, reusing it");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Review Reconciliation
//!
//! Community decisions happen on the repository side. The sync pass reads
//! them back and folds them into the store:
//!
//! ```rust,no_run
//! use canopy::adapters::factory::connect_services;
//! use canopy::config::load_config;
//! use canopy::core::sync::Reconciler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("canopy.toml")?;
//! let services = connect_services(&config).await?;
//!
//! let reconciler = Reconciler::new(services.api, services.store, services.notifier);
//! let summary = reconciler.run().await?;
//!
//! println!(
//!     "published {}, declined {}, still open {}",
//!     summary.published, summary.declined, summary.still_in_review
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Canopy uses the [`domain::CanopyError`] type for all errors:
//!
//! ```rust,no_run
//! use canopy::domain::Result;
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = canopy::config::load_config("canopy.toml")?;
//!     let _ = config;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Canopy uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(publication_id = 36, "Starting publication");
//! warn!(file = "101.zip", "Archive already uploaded, skipping");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
