//! Bounding boxes and raw shape observations.

use serde::{Deserialize, Serialize};

use crate::{SketchError, SketchResult};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
}

impl BBox {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Area in square pixels.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Width divided by height. Zero for a degenerate box.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.h > 0.0 {
            self.w / self.h
        } else {
            0.0
        }
    }

    /// Vertical centre.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Area of the intersection with `other`, 0 when they do not overlap.
    #[must_use]
    pub fn intersection_area(&self, other: &BBox) -> f32 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            0.0
        } else {
            (right - left) * (bottom - top)
        }
    }

    /// Intersection over union with `other`.
    #[must_use]
    pub fn iou(&self, other: &BBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Check that every value is finite and the box has positive size.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the box is unusable.
    pub fn check(&self) -> Result<(), String> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err("origin is not finite".to_string());
        }
        if !(self.w.is_finite() && self.h.is_finite()) {
            return Err("size is not finite".to_string());
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(format!(
                "width and height must be positive (got {}x{})",
                self.w, self.h
            ));
        }
        Ok(())
    }
}

/// The geometric quantities the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeGeometry {
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
    /// `w * h`.
    pub area: f32,
    /// `w / h`.
    pub aspect_ratio: f32,
}

impl From<&BBox> for ShapeGeometry {
    fn from(bbox: &BBox) -> Self {
        Self {
            w: bbox.w,
            h: bbox.h,
            area: bbox.area(),
            aspect_ratio: bbox.aspect_ratio(),
        }
    }
}

/// One detected quadrilateral region, already validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeObservation {
    /// Index of the observation in detection order.
    pub index: usize,
    /// Bounding box.
    pub bbox: BBox,
}

impl ShapeObservation {
    /// Geometry used for classification.
    #[must_use]
    pub fn geometry(&self) -> ShapeGeometry {
        ShapeGeometry::from(&self.bbox)
    }
}

/// Wire form of an observation as produced by the external detector.
///
/// Every field is optional so one incomplete shape can be rejected on its own
/// instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawShape {
    /// X position.
    #[serde(default)]
    pub x: Option<f32>,
    /// Y position.
    #[serde(default)]
    pub y: Option<f32>,
    /// Width.
    #[serde(default)]
    pub w: Option<f32>,
    /// Height.
    #[serde(default)]
    pub h: Option<f32>,
}

impl RawShape {
    /// Shape with every field present.
    #[must_use]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w: Some(w),
            h: Some(h),
        }
    }

    /// Validate into an observation.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::MalformedShape`] when a field is missing or the
    /// box has a non-finite or non-positive dimension.
    pub fn validate(&self, index: usize) -> SketchResult<ShapeObservation> {
        let malformed = |reason: String| SketchError::MalformedShape { index, reason };

        let (Some(x), Some(y), Some(w), Some(h)) = (self.x, self.y, self.w, self.h) else {
            let missing: Vec<&str> = [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h)]
                .iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();
            return Err(malformed(format!("missing {}", missing.join(", "))));
        };

        let bbox = BBox::new(x, y, w, h);
        bbox.check().map_err(malformed)?;
        Ok(ShapeObservation { index, bbox })
    }
}
