use serde_derive::{Deserialize, Serialize};

use crate::mask::MaskRef;
use crate::rect::Rect;

/// Persistent object identity. Ids are allocated from 1 by the linker
/// and are unique within one video.
pub type TrackId = u32;

/// One raw detector observation in one sampled frame, before any track
/// identity is assigned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: Rect<f32>,
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f32,
    #[serde(rename = "mask_ref", skip_serializing_if = "Option::is_none", default)]
    pub mask: Option<MaskRef>,
}

impl Detection {
    pub fn new(bbox: Rect<f32>, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: MaskRef) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Geometry usable for linking, rendering and hit testing: all four
    /// coordinates finite, extents non-negative. Zero extents pass; a
    /// degenerate box is legal, it just never overlaps anything.
    pub fn has_valid_geometry(&self) -> bool {
        let b = &self.bbox;
        b.x.is_finite()
            && b.y.is_finite()
            && b.width.is_finite()
            && b.height.is_finite()
            && b.width >= 0.0
            && b.height >= 0.0
    }
}

/// A detection after linking, carrying the track id it inherited or was
/// freshly assigned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    pub track_id: TrackId,
    pub bbox: Rect<f32>,
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f32,
    #[serde(rename = "mask_ref", skip_serializing_if = "Option::is_none", default)]
    pub mask: Option<MaskRef>,
}

impl TrackedDetection {
    pub fn from_detection(det: Detection, track_id: TrackId) -> Self {
        Self {
            track_id,
            bbox: det.bbox,
            label: det.label,
            confidence: det.confidence,
            mask: det.mask,
        }
    }

    pub fn has_valid_geometry(&self) -> bool {
        let b = &self.bbox;
        b.x.is_finite()
            && b.y.is_finite()
            && b.width.is_finite()
            && b.height.is_finite()
            && b.width >= 0.0
            && b.height >= 0.0
    }
}
