// Publication pipeline: metadata mapping, file upload, coordination

pub mod coordinator;
pub mod metadata;
pub mod upload;

pub use coordinator::{PipelineReport, PublicationPipeline};
pub use metadata::build_deposit;
pub use upload::{sync_draft_files, UploadOutcome};
