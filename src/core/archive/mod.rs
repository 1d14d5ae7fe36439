// Working folder validation and archive cleaning

pub mod clean;
pub mod validate;

pub use clean::clean_archive;
pub use validate::{find_archives, validate_work_folder};
