use tubely_core::Orientation;

use super::probe::Dimensions;
use crate::error::ProcessingError;

/// Absolute distance from a target ratio that still counts as a match.
pub const RATIO_TOLERANCE: f64 = 0.02;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Outcome of probing one video upload. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
    pub orientation: Orientation,
}

impl ProbeResult {
    pub fn from_dimensions(dimensions: Dimensions) -> Result<Self, ProcessingError> {
        let Dimensions { width, height } = dimensions;
        if width == 0 || height == 0 {
            return Err(ProcessingError::InvalidDimensions { width, height });
        }

        let ratio = f64::from(width) / f64::from(height);
        Ok(Self {
            width,
            height,
            ratio,
            orientation: classify_ratio(ratio),
        })
    }
}

/// Bucket a width/height ratio. The two target windows do not overlap.
pub fn classify_ratio(ratio: f64) -> Orientation {
    if (ratio - LANDSCAPE_RATIO).abs() < RATIO_TOLERANCE {
        Orientation::Landscape
    } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
        Orientation::Portrait
    } else {
        Orientation::Other
    }
}
