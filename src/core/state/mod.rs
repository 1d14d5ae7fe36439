// Resume state for publication runs

pub mod resume;

pub use resume::{ResumeState, STATE_FILE_NAME};
