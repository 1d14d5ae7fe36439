//! FreiData repository adapter
//!
//! This module provides the integration with the FreiData archival repository,
//! including the API trait, the HTTP client and the InvenioRDM wire models.

pub mod api;
pub mod client;
pub mod models;

pub use api::FreidataApi;
pub use client::FreidataClient;
pub use models::{
    Community, DepositMetadata, DraftRecord, FileListing, FileStatus, ReviewRequest, ReviewStatus,
};
