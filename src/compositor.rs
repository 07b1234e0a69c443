use std::collections::BTreeMap;

use image::{Rgba, RgbaImage};
use nalgebra::Point2;
use tracing::debug;

use crate::cache::MaskCache;
use crate::detection::TrackId;
use crate::error::Error;
use crate::glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::loader::{DrainStats, MaskLoader, MaskSource};
use crate::mask::OccupancyBuffer;
use crate::palette::{category_color, Color, LABEL_TEXT_COLOR};
use crate::product::TrackProducts;
use crate::record::TrackingRecord;
use crate::rect::Rect;
use crate::timeline::Timeline;
use crate::viewport::Viewport;

const TAG_PADDING: u32 = 3;

/// Rendering tunables. Defaults match the stock player chrome.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Alpha of the translucent mask fill, 0-255.
    pub fill_alpha: u8,
    /// Stroke width of the box-only fallback outline, in display pixels.
    /// Mask boundary outlines are always one pixel.
    pub box_stroke: u32,
    /// Bottom strip reserved for playback controls; pointer events there
    /// never hit a track.
    pub controls_margin: u32,
    /// Corner cut of the label tag background, in pixels.
    pub tag_corner: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fill_alpha: 96,
            box_stroke: 2,
            controls_margin: 56,
            tag_corner: 2,
        }
    }
}

/// Overlay renderer and hit tester for one processed video.
///
/// Owns the read-only annotation timeline, the decoded-mask cache and
/// the background mask loader. The host drives it with three calls:
/// `render` per displayed frame, `on_resize` when the surface changes,
/// `hit_test` on pointer events. All rendering happens on the caller's
/// thread; only mask fetch and decode run in the background.
pub struct OverlayEngine {
    timeline: Timeline,
    products: BTreeMap<TrackId, TrackProducts>,
    viewport: Viewport,
    cache: MaskCache,
    loader: MaskLoader,
    surface: RgbaImage,
    options: RenderOptions,
    current: Option<u64>,
}

impl OverlayEngine {
    /// Build an engine over a finished tracking record. Fails on an empty
    /// timeline (there is nothing to ever render) and on zero source
    /// dimensions (scale factors would divide by zero).
    pub fn new<S: MaskSource>(
        record: TrackingRecord,
        source_width: u32,
        source_height: u32,
        display_width: u32,
        display_height: u32,
        mask_source: S,
        options: RenderOptions,
    ) -> Result<Self, Error> {
        if record.tracks_by_frame.is_empty() {
            return Err(Error::EmptyTimeline);
        }
        let viewport = Viewport::new(
            source_width,
            source_height,
            display_width,
            display_height,
            options.controls_margin,
        )?;
        Ok(Self {
            timeline: record.tracks_by_frame,
            products: record.object_products,
            viewport,
            cache: MaskCache::new(),
            loader: MaskLoader::spawn(mask_source),
            surface: RgbaImage::new(display_width, display_height),
            options,
            current: None,
        })
    }

    /// Compose the overlay for the annotated frame nearest to
    /// `timestamp_ms` and return the finished surface.
    ///
    /// Masks not yet cached are requested in the background and their
    /// detections fall back to box outlines for this call; a later call
    /// at the same position picks up the decoded fill. A mask whose fetch
    /// failed keeps the box fallback and is not retried. A frame carrying
    /// malformed geometry is rejected whole and the surface cleared, but
    /// the engine stays usable for other frames.
    pub fn render(&mut self, timestamp_ms: u64) -> Result<&RgbaImage, Error> {
        let applied = self.loader.drain(&mut self.cache);
        if applied != DrainStats::default() {
            debug!(
                inserted = applied.inserted,
                stale = applied.stale_discarded,
                failed = applied.failed,
                "applied mask completions"
            );
        }

        let (frame_ts, detections) = self.timeline.nearest_frame(timestamp_ms)?;

        // Crossing to a different annotated frame makes every fetch still
        // in flight stale.
        if self.current != Some(frame_ts) {
            self.loader.bump_epoch();
        }

        if detections.iter().any(|d| !d.has_valid_geometry()) {
            clear_surface(&mut self.surface);
            self.current = None;
            return Err(Error::MalformedDetection {
                timestamp_ms: frame_ts,
            });
        }

        clear_surface(&mut self.surface);

        for det in detections {
            let label = self
                .products
                .get(&det.track_id)
                .map(|tp| tp.category.as_str())
                .unwrap_or(det.label.as_str());
            let color = category_color(label);
            let display_box = self.viewport.project(&det.bbox);

            let mut boxed = true;
            if let Some(mask) = &det.mask {
                if let Some(buffer) = self.cache.get(mask) {
                    draw_mask_overlay(
                        &mut self.surface,
                        &self.viewport,
                        &display_box,
                        &buffer,
                        color,
                        self.options.fill_alpha,
                    );
                    boxed = false;
                } else {
                    self.loader.request(
                        mask,
                        self.viewport.source_width(),
                        self.viewport.source_height(),
                    );
                }
            }
            if boxed {
                draw_box_outline(
                    &mut self.surface,
                    &display_box,
                    color,
                    self.options.box_stroke,
                );
            }

            draw_label_tag(
                &mut self.surface,
                display_box.x.round() as i64,
                display_box.y.round() as i64,
                label,
                color,
                self.options.tag_corner,
            );
        }

        self.current = Some(frame_ts);
        Ok(&self.surface)
    }

    /// Adopt new display dimensions. Cached masks are decoded at source
    /// resolution and carry over unchanged.
    pub fn on_resize(&mut self, display_width: u32, display_height: u32) {
        self.viewport.resize(display_width, display_height);
        self.surface = RgbaImage::new(display_width, display_height);
    }

    /// The track under a pointer position, in display coordinates.
    ///
    /// Boxes are projected with the current scale factors at call time,
    /// so the answer is correct immediately after a resize. When boxes
    /// overlap, the first match in stored frame order wins. Returns
    /// `None` before the first successful render, outside the surface,
    /// and inside the reserved controls strip.
    pub fn hit_test(&self, point: Point2<f32>) -> Option<TrackId> {
        if !self.viewport.contains(point) || self.viewport.in_controls_margin(point) {
            return None;
        }
        let current = self.current?;
        let (_, detections) = self.timeline.nearest_frame(current).ok()?;
        detections
            .iter()
            .find(|d| self.viewport.project(&d.bbox).contains(point.x, point.y))
            .map(|d| d.track_id)
    }

    /// Block until every requested mask has been fetched, decoded and
    /// applied. For offline rendering and tests; interactive hosts just
    /// keep calling `render`.
    pub fn settle_masks(&mut self) -> DrainStats {
        self.loader.wait_idle(&mut self.cache)
    }

    #[inline]
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Timestamp of the last successfully rendered annotated frame.
    #[inline]
    pub fn current_frame(&self) -> Option<u64> {
        self.current
    }

    #[inline]
    pub fn cached_masks(&self) -> usize {
        self.cache.len()
    }
}

fn clear_surface(surface: &mut RgbaImage) {
    for px in surface.pixels_mut() {
        *px = Rgba([0, 0, 0, 0]);
    }
}

fn put_opaque(surface: &mut RgbaImage, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    surface.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
}

/// Source-over blend of a translucent color onto the surface.
fn blend_pixel(surface: &mut RgbaImage, x: i64, y: i64, color: Color, alpha: u8) {
    if x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    let dst = surface.get_pixel_mut(x as u32, y as u32);
    let src_a = alpha as u32;
    let kept = dst[3] as u32 * (255 - src_a) / 255;
    let out_a = src_a + kept;
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        dst[c] = ((color[c] as u32 * src_a + dst[c] as u32 * kept) / out_a) as u8;
    }
    dst[3] = out_a as u8;
}

/// Translucent fill over occupied pixels, opaque one-pixel outline on
/// boundary pixels. The buffer holds source-resolution occupancy; each
/// display pixel inside the projected box is floor-mapped back onto it.
/// The scan covers the box intersected with the surface, nothing more.
fn draw_mask_overlay(
    surface: &mut RgbaImage,
    viewport: &Viewport,
    display_box: &Rect<f32>,
    buffer: &OccupancyBuffer,
    color: Color,
    fill_alpha: u8,
) {
    let w = surface.width() as i64;
    let h = surface.height() as i64;
    let x0 = (display_box.x.floor() as i64).clamp(0, w) as u32;
    let y0 = (display_box.y.floor() as i64).clamp(0, h) as u32;
    let x1 = (display_box.right().ceil() as i64).clamp(0, w) as u32;
    let y1 = (display_box.bottom().ceil() as i64).clamp(0, h) as u32;

    for dy in y0..y1 {
        for dx in x0..x1 {
            let (sx, sy) = viewport.source_pixel(dx, dy);
            if buffer.is_boundary(sx, sy) {
                put_opaque(surface, dx as i64, dy as i64, color);
            } else if buffer.is_occupied(sx, sy) {
                blend_pixel(surface, dx as i64, dy as i64, color, fill_alpha);
            }
        }
    }
}

/// Opaque rectangular outline, clipped to the surface.
fn draw_box_outline(surface: &mut RgbaImage, rect: &Rect<f32>, color: Color, stroke: u32) {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = rect.right().round() as i64;
    let y1 = rect.bottom().round() as i64;
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let s = (stroke as i64).min(x1 - x0).min(y1 - y0);
    let w = surface.width() as i64;
    let h = surface.height() as i64;

    for y in y0.max(0)..y1.min(h) {
        let on_horizontal_band = y - y0 < s || y1 - y <= s;
        if on_horizontal_band {
            for x in x0.max(0)..x1.min(w) {
                put_opaque(surface, x, y, color);
            }
        } else {
            for x in x0.max(0)..(x0 + s).min(w) {
                put_opaque(surface, x, y, color);
            }
            for x in (x1 - s).max(0)..x1.min(w) {
                put_opaque(surface, x, y, color);
            }
        }
    }
}

/// Solid tag with cut corners at the box's top-left, label text in the
/// built-in 5x7 face.
fn draw_label_tag(surface: &mut RgbaImage, x: i64, y: i64, text: &str, color: Color, corner: u32) {
    let tag_w = glyphs::text_width(text) + 2 * TAG_PADDING;
    let tag_h = GLYPH_HEIGHT + 2 * TAG_PADDING;

    for ty in 0..tag_h {
        for tx in 0..tag_w {
            let edge_x = tx.min(tag_w - 1 - tx);
            let edge_y = ty.min(tag_h - 1 - ty);
            if edge_x + edge_y < corner {
                continue;
            }
            put_opaque(surface, x + tx as i64, y + ty as i64, color);
        }
    }

    let mut pen = x + TAG_PADDING as i64;
    let top = y + TAG_PADDING as i64;
    for ch in text.chars() {
        if let Some(rows) = glyphs::glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        put_opaque(surface, pen + col as i64, top + row as i64, LABEL_TEXT_COLOR);
                    }
                }
            }
        }
        pen += GLYPH_ADVANCE as i64;
    }
}
