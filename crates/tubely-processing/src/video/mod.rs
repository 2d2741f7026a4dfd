//! Video inspection: probing dimensions and bucketing orientation.

mod orientation;
mod probe;

pub use orientation::{classify_ratio, ProbeResult, RATIO_TOLERANCE};
pub use probe::{parse_probe_output, Dimensions, FfprobeProber, VideoProber};

use std::path::Path;
use std::sync::Arc;

use crate::error::ProcessingError;

/// Probes a staged video and classifies its orientation.
#[derive(Clone)]
pub struct MediaClassifier {
    prober: Arc<dyn VideoProber>,
}

impl MediaClassifier {
    pub fn new(prober: Arc<dyn VideoProber>) -> Self {
        Self { prober }
    }

    pub async fn classify(&self, path: &Path) -> Result<ProbeResult, ProcessingError> {
        let dimensions = self.prober.probe(path).await?;
        let result = ProbeResult::from_dimensions(dimensions)?;

        tracing::info!(
            width = result.width,
            height = result.height,
            ratio = result.ratio,
            orientation = %result.orientation,
            "Video classified"
        );

        Ok(result)
    }
}
