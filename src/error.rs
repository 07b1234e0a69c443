use thiserror::Error;

use crate::detection::TrackId;

#[derive(Debug, Error)]
pub enum Error {
    /// Rendering and nearest-frame queries need at least one sampled frame.
    #[error("timeline contains no sampled frames")]
    EmptyTimeline,

    /// The referenced mask image is missing or could not be decoded. The
    /// affected detection falls back to box-only rendering.
    #[error("mask decode failed: {0}")]
    MaskDecode(String),

    /// A stored frame carries a detection with non-finite or negative
    /// geometry. The whole frame is rejected; the engine stays usable.
    #[error("frame at {timestamp_ms}ms carries malformed detection geometry")]
    MalformedDetection { timestamp_ms: u64 },

    /// Frames must be appended in strictly increasing timestamp order.
    #[error("frame at {timestamp_ms}ms does not advance past {last_ms}ms")]
    NonMonotonicFrame { timestamp_ms: u64, last_ms: u64 },

    /// A track id may appear at most once per sampled frame.
    #[error("track {track_id} appears twice in frame at {timestamp_ms}ms")]
    DuplicateTrack { timestamp_ms: u64, track_id: TrackId },

    /// Display scale factors divide by the source dimensions.
    #[error("source content dimensions must be non-zero, got {width}x{height}")]
    InvalidSource { width: u32, height: u32 },

    /// The upstream detector feed failed mid-stream.
    #[error("detection source failed: {0}")]
    FrameSource(String),

    #[error("tracking record JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
