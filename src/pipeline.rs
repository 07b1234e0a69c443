use std::fmt;

use serde_derive::{Deserialize, Serialize};
use tracing::info;

use crate::detection::TrackedDetection;
use crate::error::Error;
use crate::frame::SampledFrame;
use crate::linker::Linker;
use crate::product::{annotate_tracks, ProductSearch};
use crate::record::TrackingRecord;
use crate::timeline::Timeline;

/// Pulls sampled frames out of a detector stage, in playback order.
/// Returning `Ok(None)` ends the stream.
pub trait FrameSource {
    type Error: fmt::Display;

    fn next_frame(&mut self) -> Result<Option<SampledFrame>, Self::Error>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Processing,
    Completed,
    Failed,
}

/// Most recent log lines kept in a processing status.
pub const STATUS_LOG_CAP: usize = 50;

/// Wire-shaped processing status a host can poll while tracking runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProcessingStatus {
    pub status: ProcessState,
    pub progress: f32,
    pub message: String,
    pub logs: Vec<String>,
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self {
            status: ProcessState::Processing,
            progress: 0.0,
            message: "Starting video processing...".into(),
            logs: Vec::new(),
        }
    }
}

impl ProcessingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a log line, dropping the oldest once the cap is reached.
    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= STATUS_LOG_CAP {
            self.logs.remove(0);
        }
        self.logs.push(line.into());
    }

    pub fn complete(&mut self, message: impl Into<String>) {
        self.status = ProcessState::Completed;
        self.progress = 100.0;
        self.message = message.into();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ProcessState::Failed;
        self.message = message.into();
    }
}

/// Receives progress while a pipeline runs. All methods default to
/// no-ops so callers that do not report anything can pass `()`.
pub trait ProgressSink {
    fn update(&mut self, _progress: f32, _message: &str) {}
    fn log(&mut self, _line: &str) {}
}

impl ProgressSink for () {}

impl ProgressSink for ProcessingStatus {
    fn update(&mut self, progress: f32, message: &str) {
        self.progress = progress;
        self.message = message.to_string();
    }

    fn log(&mut self, line: &str) {
        self.push_log(line);
    }
}

/// Folds sampled frames into a linked timeline, one frame at a time.
/// State between frames is exactly the previous frame's linked output
/// plus the id counter inside the linker.
#[derive(Debug, Default)]
pub struct TrackingPipeline {
    linker: Linker,
    timeline: Timeline,
    previous: Vec<TrackedDetection>,
}

impl TrackingPipeline {
    pub fn new() -> Self {
        Self {
            linker: Linker::new(),
            timeline: Timeline::new(),
            previous: Vec::new(),
        }
    }

    /// Link one frame against the previous one and append it to the
    /// timeline. Returns how many detections survived linking.
    pub fn ingest(&mut self, frame: SampledFrame) -> Result<usize, Error> {
        let linked = self.linker.link(&self.previous, frame.detections);
        self.timeline.push_frame(frame.timestamp_ms, linked.clone())?;
        let kept = linked.len();
        self.previous = linked;
        Ok(kept)
    }

    /// Drain a frame source to exhaustion, reporting progress along the
    /// way. `expected_frames` scales the progress percentage when the
    /// source knows its length up front.
    pub fn run<F, P>(
        &mut self,
        source: &mut F,
        sink: &mut P,
        expected_frames: Option<u64>,
    ) -> Result<u64, Error>
    where
        F: FrameSource,
        P: ProgressSink,
    {
        let mut processed = 0u64;
        loop {
            let frame = source
                .next_frame()
                .map_err(|e| Error::FrameSource(e.to_string()))?;
            let Some(frame) = frame else { break };

            let timestamp_ms = frame.timestamp_ms;
            let found = self.ingest(frame)?;
            processed += 1;

            let progress = match expected_frames {
                Some(total) if total > 0 => {
                    (processed as f32 / total as f32 * 100.0).min(100.0)
                }
                _ => 0.0,
            };
            sink.update(
                progress,
                &format!("Processing frame at {timestamp_ms}ms - found {found} objects"),
            );
            sink.log(&format!("Frame {timestamp_ms}ms: {found} objects"));
        }

        info!(
            frames = processed,
            tracks = self.timeline.distinct_tracks().len(),
            "tracking pass finished"
        );
        sink.update(100.0, "Tracking complete");
        Ok(processed)
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Close the timeline, resolve products for every track and emit the
    /// persistent record.
    pub fn finish<S: ProductSearch>(
        self,
        video_id: impl Into<String>,
        fps: f64,
        total_frames: u64,
        search: &S,
        product_limit: usize,
    ) -> TrackingRecord {
        let object_products = annotate_tracks(&self.timeline, search, product_limit);
        TrackingRecord {
            video_id: video_id.into(),
            fps,
            total_frames,
            tracks_by_frame: self.timeline,
            object_products,
        }
    }
}
