// Bundle naming and acquisition

pub mod acquire;
pub mod filename;

pub use acquire::BundleAcquirer;
pub use filename::{bundle_filename, slugify};
