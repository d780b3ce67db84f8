/// Axis-aligned face bounding box in pixel coordinates.
///
/// Edges are stored as `(top, right, bottom, left)`, the order face
/// location APIs conventionally report. Coordinates belong to the frame the
/// box was detected on; use [`FaceBox::scaled`] to map them onto a larger
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from floating-point corners `(x1, y1)`-`(x2, y2)`,
    /// rounding each edge to the nearest pixel.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            top: y1.round() as i32,
            right: x2.round() as i32,
            bottom: y2.round() as i32,
            left: x1.round() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Multiplies every edge by `factor`. Exact integer scaling, no rounding.
    pub fn scaled(&self, factor: i32) -> Self {
        Self {
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
            left: self.left * factor,
        }
    }

    /// Clips the box to a `width` x `height` frame.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let w = width as i32;
        let h = height as i32;
        Self {
            top: self.top.clamp(0, h),
            right: self.right.clamp(0, w),
            bottom: self.bottom.clamp(0, h),
            left: self.left.clamp(0, w),
        }
    }
}
