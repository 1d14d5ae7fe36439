//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod cron;
pub mod init;
pub mod publish;
pub mod sync;
pub mod validate;
