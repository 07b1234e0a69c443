use num_traits::Float;
use serde_derive::{Deserialize, Serialize};

/// Axis-aligned box in source pixel coordinates, top-left origin.
///
/// Width and height extend right and down; the right and bottom edges
/// are exclusive ([x, x + width) x [y, y + height)).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect<T: Float> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T: Float> Rect<T> {
    #[inline]
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> T {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> T {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> T {
        self.width * self.height
    }

    /// A box with zero (or negative) extent on either axis. Degenerate
    /// boxes are legal input; they simply overlap nothing.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width <= T::zero() || self.height <= T::zero()
    }

    /// Intersection-over-union in [0, 1].
    ///
    /// Symmetric, 1 for identical non-degenerate boxes, 0 for disjoint
    /// pairs. A degenerate box yields 0 against everything, including an
    /// identical degenerate box.
    pub fn iou(&self, other: &Self) -> T {
        let zero = T::zero();
        if self.is_degenerate() || other.is_degenerate() {
            return zero;
        }

        let ix = self.x.max(other.x);
        let iy = self.y.max(other.y);
        let ir = self.right().min(other.right());
        let ib = self.bottom().min(other.bottom());
        if ir < ix || ib < iy {
            return zero;
        }

        let inter = (ir - ix) * (ib - iy);
        let union = self.area() + other.area() - inter;
        if union > zero {
            inter / union
        } else {
            zero
        }
    }

    #[inline]
    pub fn scale(&self, sx: T, sy: T) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    /// Point containment; left and top edges closed, right and bottom open.
    #[inline]
    pub fn contains(&self, px: T, py: T) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_identity() {
        let a = Rect::new(10.0f32, 20.0, 30.0, 40.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_symmetric() {
        let a = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0f32, 5.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), b.iou(&a));
        assert!(a.iou(&b) > 0.0);
    }

    #[test]
    fn iou_disjoint_is_zero() {
        let a = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0f32, 20.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_touching_edges_is_zero() {
        let a = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0f32, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_quarter_overlap() {
        let a = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0f32, 5.0, 10.0, 10.0);
        // intersection 25, union 175
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_never_matches() {
        let point = Rect::new(5.0f32, 5.0, 0.0, 0.0);
        let other = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        assert_eq!(point.iou(&other), 0.0);
        assert_eq!(other.iou(&point), 0.0);
        // not even an identical degenerate box
        assert_eq!(point.iou(&point), 0.0);
    }

    #[test]
    fn scale_is_per_axis() {
        let a = Rect::new(10.0f32, 20.0, 30.0, 40.0);
        let s = a.scale(2.0, 0.5);
        assert_eq!(s, Rect::new(20.0, 10.0, 60.0, 20.0));
    }

    #[test]
    fn contains_half_open_edges() {
        let a = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        assert!(a.contains(0.0, 0.0));
        assert!(a.contains(9.9, 9.9));
        assert!(!a.contains(10.0, 5.0));
        assert!(!a.contains(5.0, 10.0));
    }

    #[test]
    fn serde_named_fields() {
        let a = Rect::new(1.0f32, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.0}"#);
        let back: Rect<f32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
