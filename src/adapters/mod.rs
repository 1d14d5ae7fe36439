//! External system integrations for Canopy.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`freidata`] - FreiData archival repository (InvenioRDM REST API)
//! - [`bundler`] - Internal download service that assembles dataset bundles
//! - [`store`] - Platform PostgreSQL database holding publications
//! - [`zulip`] - Zulip stream notifications
//! - [`factory`] - Builds the connected adapter set from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with stub implementations. The pipeline and the
//! reconciler only depend on the traits (`FreidataApi`, `BundleService`,
//! `PublicationStore`, `Notifier`), never on the concrete clients.
//!
//! # FreiData Adapter
//!
//! ```rust,no_run
//! use canopy::adapters::freidata::{FreidataApi, FreidataClient};
//! use canopy::config::FreidataConfig;
//! use canopy::config::secret::secret_string;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FreidataConfig {
//!     base_url: "https://freidata.uni-freiburg.de".to_string(),
//!     token: secret_string("api-token".to_string()),
//!     tls_verify: true,
//!     timeout_seconds: 60,
//! };
//!
//! let client = FreidataClient::new(config);
//! let draft = client.get_draft("c7g4e-9kd22").await?;
//! println!("Draft {} published: {}", draft.id, draft.is_published);
//! # Ok(())
//! # }
//! ```

pub mod bundler;
pub mod factory;
pub mod freidata;
pub mod store;
pub mod zulip;
