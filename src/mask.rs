use std::fmt;

use ndarray::Array2;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Luminance strictly above this value counts as occupied. Stored masks
/// are white-on-black; mid-gray compression artifacts stay background.
pub const OCCUPANCY_LUMA_THRESHOLD: u8 = 128;

/// Opaque reference to a stored mask image, as produced by the detector
/// stage (e.g. `/static/masks/<video_id>/track_3_frame_12.png`). Used
/// verbatim as the cache key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MaskRef(String);

impl MaskRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaskRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MaskRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Boolean occupancy grid decoded from a mask image, resampled to a
/// target resolution. Row-major: `grid[[y, x]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyBuffer {
    grid: Array2<bool>,
}

impl OccupancyBuffer {
    /// Decode encoded image bytes into an occupancy grid of
    /// `target_width x target_height`, nearest-neighbor resampled.
    /// Any channel layout is accepted; pixels are collapsed to luminance
    /// first, then thresholded.
    pub fn decode(bytes: &[u8], target_width: u32, target_height: u32) -> Result<Self, Error> {
        if target_width == 0 || target_height == 0 {
            return Err(Error::MaskDecode(format!(
                "target resolution must be non-zero, got {}x{}",
                target_width, target_height
            )));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| Error::MaskDecode(e.to_string()))?
            .to_luma8();
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(Error::MaskDecode("mask image has zero extent".into()));
        }

        let mut grid = Array2::from_elem((target_height as usize, target_width as usize), false);
        for y in 0..target_height {
            let sy = (y as u64 * src_h as u64 / target_height as u64) as u32;
            for x in 0..target_width {
                let sx = (x as u64 * src_w as u64 / target_width as u64) as u32;
                grid[[y as usize, x as usize]] =
                    image.get_pixel(sx, sy)[0] > OCCUPANCY_LUMA_THRESHOLD;
            }
        }

        Ok(Self { grid })
    }

    pub fn from_grid(grid: Array2<bool>) -> Self {
        Self { grid }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.grid.ncols() as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.grid.nrows() as u32
    }

    /// Out-of-bounds coordinates are unoccupied.
    #[inline]
    pub fn is_occupied(&self, x: u32, y: u32) -> bool {
        self.grid
            .get([y as usize, x as usize])
            .copied()
            .unwrap_or(false)
    }

    /// A pixel is a boundary pixel iff it is occupied and at least one of
    /// its 4-connected neighbors is unoccupied. Neighbors outside the
    /// buffer count as unoccupied, so occupied pixels on the buffer edge
    /// are boundary pixels.
    pub fn is_boundary(&self, x: u32, y: u32) -> bool {
        if !self.is_occupied(x, y) {
            return false;
        }
        let (x, y) = (x as i64, y as i64);
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .any(|(nx, ny)| {
                nx < 0
                    || ny < 0
                    || nx >= self.width() as i64
                    || ny >= self.height() as i64
                    || !self.grid[[ny as usize, nx as usize]]
            })
    }

    pub fn occupied_count(&self) -> usize {
        self.grid.iter().filter(|&&v| v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageOutputFormat, Luma};
    use std::io::Cursor;

    fn png_bytes(image: &GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn threshold_is_strict() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([128])); // exactly at threshold: background
        img.put_pixel(1, 0, Luma([129]));
        img.put_pixel(2, 0, Luma([255]));
        let buf = OccupancyBuffer::decode(&png_bytes(&img), 3, 1).unwrap();
        assert!(!buf.is_occupied(0, 0));
        assert!(buf.is_occupied(1, 0));
        assert!(buf.is_occupied(2, 0));
    }

    #[test]
    fn nearest_neighbor_upsample_keeps_quadrants() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(1, 0, Luma([0]));
        img.put_pixel(0, 1, Luma([0]));
        img.put_pixel(1, 1, Luma([255]));
        let buf = OccupancyBuffer::decode(&png_bytes(&img), 4, 4).unwrap();
        for (x, y, expected) in [
            (0, 0, true),
            (1, 1, true),
            (2, 0, false),
            (3, 1, false),
            (0, 2, false),
            (1, 3, false),
            (2, 2, true),
            (3, 3, true),
        ] {
            assert_eq!(buf.is_occupied(x, y), expected, "pixel ({x},{y})");
        }
    }

    #[test]
    fn downsample_to_single_pixel() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(0, 0, Luma([255]));
        let buf = OccupancyBuffer::decode(&png_bytes(&img), 1, 1).unwrap();
        // nearest neighbor samples the top-left source pixel
        assert!(buf.is_occupied(0, 0));
    }

    #[test]
    fn corrupt_bytes_fail_decode() {
        let err = OccupancyBuffer::decode(b"not an image", 4, 4).unwrap_err();
        assert!(matches!(err, Error::MaskDecode(_)));
    }

    #[test]
    fn zero_target_fails_decode() {
        let img = GrayImage::new(2, 2);
        let err = OccupancyBuffer::decode(&png_bytes(&img), 0, 2).unwrap_err();
        assert!(matches!(err, Error::MaskDecode(_)));
    }

    #[test]
    fn boundary_classification() {
        // 4x4 with a filled 3x3 block at top-left: center (1,1) is interior
        let mut grid = Array2::from_elem((4, 4), false);
        for y in 0..3 {
            for x in 0..3 {
                grid[[y, x]] = true;
            }
        }
        let buf = OccupancyBuffer::from_grid(grid);
        assert!(buf.is_boundary(0, 0)); // buffer edge counts as unoccupied neighbor
        assert!(buf.is_boundary(2, 1)); // right edge of the block
        assert!(!buf.is_boundary(1, 1)); // interior
        assert!(!buf.is_boundary(3, 3)); // unoccupied pixel is never boundary
    }

    #[test]
    fn isolated_pixel_is_boundary() {
        let mut grid = Array2::from_elem((3, 3), false);
        grid[[1, 1]] = true;
        let buf = OccupancyBuffer::from_grid(grid);
        assert!(buf.is_boundary(1, 1));
        assert_eq!(buf.occupied_count(), 1);
    }

    #[test]
    fn out_of_bounds_is_unoccupied() {
        let buf = OccupancyBuffer::from_grid(Array2::from_elem((2, 2), true));
        assert!(!buf.is_occupied(5, 0));
        assert!(!buf.is_occupied(0, 5));
    }
}
