//! Core business logic for Canopy.
//!
//! This module contains the publication lifecycle logic that sits between
//! the CLI and the adapters.
//!
//! # Modules
//!
//! - [`archive`] - Working folder validation and archive cleaning
//! - [`bundle`] - Bundle naming and acquisition from the bundle service
//! - [`cron`] - Scheduled pass over pending and in-review publications
//! - [`pipeline`] - The per-publication publish pipeline
//! - [`state`] - Crash-resumable per-folder state
//! - [`sync`] - Review reconciliation against the repository
//!
//! # Publication Workflow
//!
//! One pipeline run for a publication:
//!
//! 1. **Guard**: A stored DOI ends the run before any remote call
//! 2. **Acquire**: Fetch the dataset bundle when the folder is empty
//! 3. **Validate**: Check the folder holds exactly the expected archives
//! 4. **Draft**: Create the repository draft at most once, resume-safe
//! 5. **Upload**: Push archives the repository does not already hold
//! 6. **Review**: Hand the draft to the community when configured
//! 7. **Publish**: Publish directly, or leave it to review acceptance
//!
//! # Example
//!
//! ```rust,no_run
//! use canopy::adapters::factory::connect_services;
//! use canopy::config::load_config;
//! use canopy::core::bundle::BundleAcquirer;
//! use canopy::core::cron::publication_work_folder;
//! use canopy::core::pipeline::PublicationPipeline;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration and connect the adapters
//! let config = load_config("canopy.toml")?;
//! let services = connect_services(&config).await?;
//!
//! let bundler = services
//!     .bundler
//!     .clone()
//!     .zip(config.bundler.clone())
//!     .map(|(service, bundler_config)| BundleAcquirer::new(service, bundler_config));
//!
//! let pipeline = PublicationPipeline::new(
//!     services.api.clone(),
//!     services.store.clone(),
//!     services.notifier.clone(),
//!     bundler,
//!     config.publish.clone(),
//! );
//!
//! // Publish one publication in its working folder
//! let work_folder = publication_work_folder(Path::new(&config.publish.work_dir), 36);
//! let report = pipeline.run_safe(36, &work_folder).await?;
//!
//! println!("Record: {:?}", report.record_id);
//! println!("Uploaded: {}", report.uploaded_files.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod bundle;
pub mod cron;
pub mod pipeline;
pub mod state;
pub mod sync;
