use serde_derive::{Deserialize, Serialize};

use crate::detection::Detection;

/// Raw detector output for one sampled video frame, keyed by the frame's
/// playback timestamp in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampledFrame {
    pub timestamp_ms: u64,
    pub detections: Vec<Detection>,
}

impl SampledFrame {
    pub fn new(timestamp_ms: u64, detections: Vec<Detection>) -> Self {
        Self {
            timestamp_ms,
            detections,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }
}
