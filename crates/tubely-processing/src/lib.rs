//! Tubely Processing Library
//!
//! Upload-side media handling: content-type allow-lists, scratch staging of
//! large uploads, and ffprobe-based orientation classification of videos.

pub mod error;
pub mod media_types;
pub mod scratch;
pub mod video;

pub use error::ProcessingError;
pub use media_types::{MediaType, MediaTypeRegistry};
pub use scratch::{ScratchStager, StagedFile};
pub use video::{
    classify_ratio, Dimensions, FfprobeProber, MediaClassifier, ProbeResult, VideoProber,
    RATIO_TOLERANCE,
};
