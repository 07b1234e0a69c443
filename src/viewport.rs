use nalgebra::Point2;

use crate::error::Error;
use crate::rect::Rect;

/// Maps source content coordinates to the current display surface.
///
/// Scale factors are derived from the stored dimensions on every call,
/// so a resize immediately affects all later projections and hit tests.
/// Nothing here caches a scaled coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    source_width: u32,
    source_height: u32,
    display_width: u32,
    display_height: u32,
    controls_margin: u32,
}

impl Viewport {
    pub fn new(
        source_width: u32,
        source_height: u32,
        display_width: u32,
        display_height: u32,
        controls_margin: u32,
    ) -> Result<Self, Error> {
        if source_width == 0 || source_height == 0 {
            return Err(Error::InvalidSource {
                width: source_width,
                height: source_height,
            });
        }
        Ok(Self {
            source_width,
            source_height,
            display_width,
            display_height,
            controls_margin,
        })
    }

    pub fn resize(&mut self, display_width: u32, display_height: u32) {
        self.display_width = display_width;
        self.display_height = display_height;
    }

    #[inline]
    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    #[inline]
    pub fn display_height(&self) -> u32 {
        self.display_height
    }

    #[inline]
    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    #[inline]
    pub fn source_height(&self) -> u32 {
        self.source_height
    }

    #[inline]
    pub fn scale_x(&self) -> f32 {
        self.display_width as f32 / self.source_width as f32
    }

    #[inline]
    pub fn scale_y(&self) -> f32 {
        self.display_height as f32 / self.source_height as f32
    }

    #[inline]
    pub fn project(&self, rect: &Rect<f32>) -> Rect<f32> {
        rect.scale(self.scale_x(), self.scale_y())
    }

    /// The source pixel under a display pixel, floor-mapped. Callers only
    /// pass coordinates inside the display surface.
    #[inline]
    pub fn source_pixel(&self, display_x: u32, display_y: u32) -> (u32, u32) {
        let sx = display_x as u64 * self.source_width as u64 / self.display_width as u64;
        let sy = display_y as u64 * self.source_height as u64 / self.display_height as u64;
        (sx as u32, sy as u32)
    }

    #[inline]
    pub fn contains(&self, point: Point2<f32>) -> bool {
        point.x >= 0.0
            && point.x < self.display_width as f32
            && point.y >= 0.0
            && point.y < self.display_height as f32
    }

    /// True when the point falls in the bottom strip reserved for
    /// playback controls; those clicks belong to the controls, never to
    /// object hit testing.
    #[inline]
    pub fn in_controls_margin(&self, point: Point2<f32>) -> bool {
        point.y >= self.display_height.saturating_sub(self.controls_margin) as f32
    }
}
