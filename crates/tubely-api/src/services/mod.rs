pub mod upload;

pub use upload::{ParsedUpload, UploadBody, UploadOutcome, UploadParser, UploadPipeline};
