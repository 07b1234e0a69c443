//! Two halves of a shoppable-video pipeline.
//!
//! The tracking half folds per-frame object detections into persistent
//! track identities by greedy IoU matching against the previous frame,
//! then freezes the result as a [`TrackingRecord`]. The playback half
//! loads that record into an [`OverlayEngine`] which renders
//! category-colored mask fills, box outlines and label tags for any
//! playback position, and maps pointer clicks back to track ids.

pub mod cache;
pub mod compositor;
pub mod detection;
pub mod error;
pub mod frame;
pub mod linker;
pub mod loader;
pub mod mask;
pub mod palette;
pub mod pipeline;
pub mod product;
pub mod record;
pub mod rect;
pub mod timeline;
pub mod viewport;

mod glyphs;

pub use cache::MaskCache;
pub use compositor::{OverlayEngine, RenderOptions};
pub use detection::{Detection, TrackId, TrackedDetection};
pub use error::Error;
pub use frame::SampledFrame;
pub use linker::{Linker, MATCH_IOU_THRESHOLD};
pub use loader::{DrainStats, FileMaskSource, MaskLoader, MaskSource};
pub use mask::{MaskRef, OccupancyBuffer};
pub use pipeline::{
    FrameSource, ProcessState, ProcessingStatus, ProgressSink, TrackingPipeline,
};
pub use product::{annotate_tracks, Product, ProductSearch, StaticCatalog, TrackProducts};
pub use record::TrackingRecord;
pub use rect::Rect;
pub use timeline::Timeline;
pub use viewport::Viewport;
