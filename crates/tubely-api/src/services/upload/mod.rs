//! Media upload service
//!
//! [`UploadPipeline`] takes an authenticated upload request through
//! ownership check, multipart parsing, optional staging and classification,
//! storage, and finally the metadata update of the owning video record.

mod parser;
mod pipeline;

pub use parser::{ParsedUpload, UploadBody, UploadParser};
pub use pipeline::{UploadOutcome, UploadPipeline};
