//! Platform database adapter
//!
//! This module provides the PostgreSQL integration for the publications
//! table: a pooled client and the `PublicationStore` trait with its
//! implementation.

pub mod client;
pub mod publications;

pub use client::PostgresClient;
pub use publications::{PostgresPublicationStore, PublicationStore};
