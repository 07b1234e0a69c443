use tracing::{debug, warn};

use crate::detection::{Detection, TrackId, TrackedDetection};

/// A current detection inherits a previous track id only when their IoU
/// is strictly greater than this.
pub const MATCH_IOU_THRESHOLD: f32 = 0.3;

/// Links per-frame detections into persistent track identities by greedy
/// IoU matching against the immediately preceding frame only.
///
/// One frame of memory: a track that skips a frame is gone, and the
/// reappearing object starts a fresh id. Matching never crosses class
/// labels, and each previous track is claimed by at most one current
/// detection. Given the same frames in the same order, the same ids come
/// out.
#[derive(Debug)]
pub struct Linker {
    next_track_id: TrackId,
}

impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}

impl Linker {
    pub fn new() -> Self {
        Self { next_track_id: 1 }
    }

    /// Assign a track id to every valid detection in `current`, matching
    /// against `previous` (the linked output of the frame before).
    /// Detections with malformed geometry are dropped with a warning;
    /// the rest of the frame still links.
    pub fn link(
        &mut self,
        previous: &[TrackedDetection],
        current: Vec<Detection>,
    ) -> Vec<TrackedDetection> {
        let mut claimed = vec![false; previous.len()];
        let mut linked = Vec::with_capacity(current.len());
        let mut matched = 0usize;

        for det in current {
            if !det.has_valid_geometry() {
                warn!(label = %det.label, "dropping detection with malformed geometry");
                continue;
            }

            // Greedy best-above-threshold; on equal IoU the earlier
            // previous detection wins, which keeps linking deterministic.
            let mut best_iou = MATCH_IOU_THRESHOLD;
            let mut best = None;
            for (idx, prev) in previous.iter().enumerate() {
                if claimed[idx] || prev.label != det.label {
                    continue;
                }
                let iou = prev.bbox.iou(&det.bbox);
                if iou > best_iou {
                    best_iou = iou;
                    best = Some(idx);
                }
            }

            let track_id = match best {
                Some(idx) => {
                    claimed[idx] = true;
                    matched += 1;
                    previous[idx].track_id
                }
                None => self.fresh_id(),
            };

            linked.push(TrackedDetection::from_detection(det, track_id));
        }

        debug!(
            matched,
            fresh = linked.len() - matched,
            "linked frame against {} previous tracks",
            previous.len()
        );
        linked
    }

    fn fresh_id(&mut self) -> TrackId {
        let id = self.next_track_id;
        self.next_track_id += 1;
        id
    }
}
