use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use crate::detection::{TrackId, TrackedDetection};
use crate::error::Error;

/// Sampled annotation timeline for one video: playback timestamp in
/// milliseconds mapped to the linked detections observed at that sample.
///
/// Frames are appended in strictly increasing timestamp order while
/// tracking runs; during playback the timeline is read-only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Timeline {
    frames: BTreeMap<u64, Vec<TrackedDetection>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one linked frame. Rejects timestamps that do not advance
    /// past the newest stored frame and frames that carry the same track
    /// id twice.
    pub fn push_frame(
        &mut self,
        timestamp_ms: u64,
        detections: Vec<TrackedDetection>,
    ) -> Result<(), Error> {
        if let Some((&last_ms, _)) = self.frames.last_key_value() {
            if timestamp_ms <= last_ms {
                return Err(Error::NonMonotonicFrame {
                    timestamp_ms,
                    last_ms,
                });
            }
        }
        for (i, det) in detections.iter().enumerate() {
            if detections[..i].iter().any(|d| d.track_id == det.track_id) {
                return Err(Error::DuplicateTrack {
                    timestamp_ms,
                    track_id: det.track_id,
                });
            }
        }
        self.frames.insert(timestamp_ms, detections);
        Ok(())
    }

    /// The stored frame whose timestamp is closest to `timestamp_ms`,
    /// with ties broken toward the earlier frame. Exact in-between
    /// queries never interpolate; annotations hold until the next sample
    /// is nearer.
    pub fn nearest_frame(&self, timestamp_ms: u64) -> Result<(u64, &[TrackedDetection]), Error> {
        let below = self.frames.range(..=timestamp_ms).next_back();
        let above = self.frames.range(timestamp_ms..).next();
        match (below, above) {
            (None, None) => Err(Error::EmptyTimeline),
            (Some((&t, dets)), None) | (None, Some((&t, dets))) => Ok((t, dets.as_slice())),
            (Some((&tb, db)), Some((&ta, da))) => {
                if timestamp_ms - tb <= ta - timestamp_ms {
                    Ok((tb, db.as_slice()))
                } else {
                    Ok((ta, da.as_slice()))
                }
            }
        }
    }

    /// Distinct track ids paired with the label under which each track
    /// first appeared, in first-appearance order.
    pub fn distinct_tracks(&self) -> Vec<(TrackId, &str)> {
        let mut seen = Vec::new();
        for detections in self.frames.values() {
            for det in detections {
                if !seen.iter().any(|&(id, _)| id == det.track_id) {
                    seen.push((det.track_id, det.label.as_str()));
                }
            }
        }
        seen
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[TrackedDetection])> {
        self.frames.iter().map(|(&t, d)| (t, d.as_slice()))
    }

    pub fn first_timestamp(&self) -> Option<u64> {
        self.frames.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.frames.keys().next_back().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
