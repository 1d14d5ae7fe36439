//! Domain models and types for Canopy.
//!
//! This module contains the core domain models, types, and business rules for
//! the publication pipeline.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Publication model** ([`Publication`], [`Author`]) as read from the
//!   Publication Store
//! - **Lifecycle status** ([`PublicationStatus`]) driving the state machine
//! - **Error types** ([`CanopyError`], [`FreidataError`], [`BundlerError`])
//! - **Result type alias** ([`Result`])
//!
//! # Lifecycle
//!
//! A publication moves through `pending` → `uploading` → `in_review` →
//! `published` or `declined`; any failed run parks it in `error` until the
//! next attempt. The status is stored as snake_case text:
//!
//! ```rust
//! use canopy::domain::PublicationStatus;
//! use std::str::FromStr;
//!
//! let status = PublicationStatus::from_str("in_review").unwrap();
//! assert_eq!(status, PublicationStatus::InReview);
//! assert_eq!(status.as_str(), "in_review");
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CanopyError>`]:
//!
//! ```rust
//! use canopy::domain::{CanopyError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = canopy::config::load_config("canopy.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod publication;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{BundlerError, CanopyError, FreidataError};
pub use publication::{Author, Publication, PublicationStatus};
pub use result::Result;
