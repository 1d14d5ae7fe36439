//! Bundle service adapter
//!
//! This module provides the integration with the internal download service
//! that assembles dataset bundles: job submission, status polling and
//! streamed downloads.

pub mod client;
pub mod models;

pub use client::{BundleService, BundlerClient};
pub use models::{BundleJob, BundleJobStatus};
