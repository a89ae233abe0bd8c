//! Detection records produced by the matcher.
//!
//! A [`Detection`] is created once by the candidate assembler and never
//! mutated afterwards. Rescaling for display produces a separate
//! [`ScaledDetection`].

use crate::util::{MultiMatchError, MultiMatchResult};

/// Axis-aligned box in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl BoundingBox {
    /// Creates a box from its top-left corner and positive size.
    ///
    /// The far corner must be representable, so `corners` never overflows.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> MultiMatchResult<Self> {
        if width == 0
            || height == 0
            || x.checked_add(width).is_none()
            || y.checked_add(height).is_none()
        {
            return Err(MultiMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Left edge.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Top edge.
    pub fn y(&self) -> usize {
        self.y
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(x, y, width, height)`.
    pub fn xywh(&self) -> (usize, usize, usize, usize) {
        (self.x, self.y, self.width, self.height)
    }

    /// Returns `(x1, y1, x2, y2)` with exclusive right/bottom edges.
    pub fn corners(&self) -> (usize, usize, usize, usize) {
        (
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        )
    }

    pub fn area(&self) -> u128 {
        self.width as u128 * self.height as u128
    }

    /// Area shared with `other`, zero when the boxes are disjoint.
    pub fn intersection_area(&self, other: &BoundingBox) -> u128 {
        let (ax1, ay1, ax2, ay2) = self.corners();
        let (bx1, by1, bx2, by2) = other.corners();
        let w = ax2.min(bx2).saturating_sub(ax1.max(bx1));
        let h = ay2.min(by2).saturating_sub(ay1.max(by1));
        w as u128 * h as u128
    }

    /// Intersection over union, in `[0, 1]`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area().saturating_add(other.area()) - intersection;
        if union == 0 {
            return 0.0;
        }
        (intersection as f64 / union as f64) as f32
    }
}

/// One template hit: where, how well, and which template produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    bbox: BoundingBox,
    score: f32,
    template_index: usize,
    label: String,
}

impl Detection {
    /// Creates a detection. An empty label means uncategorized.
    pub fn new(
        bbox: BoundingBox,
        score: f32,
        template_index: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            bbox,
            score,
            template_index,
            label: label.into(),
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn x(&self) -> usize {
        self.bbox.x
    }

    pub fn y(&self) -> usize {
        self.bbox.y
    }

    pub fn width(&self) -> usize {
        self.bbox.width
    }

    pub fn height(&self) -> usize {
        self.bbox.height
    }

    /// Returns `(x, y, width, height)`.
    pub fn xywh(&self) -> (usize, usize, usize, usize) {
        self.bbox.xywh()
    }

    /// Returns `(x1, y1, x2, y2)`.
    pub fn corners(&self) -> (usize, usize, usize, usize) {
        self.bbox.corners()
    }

    /// Correlation score at the detection position.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Index of the template that produced this detection.
    pub fn template_index(&self) -> usize {
        self.template_index
    }

    /// Category label, empty when templates were not labelled.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Overlap ratio with another detection's box.
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Maps the detection from a downscaled image back to full resolution.
    ///
    /// `ratio` is the downscale factor that was applied to the searched
    /// image, typically in `(0, 1]`.
    pub fn upscaled(&self, ratio: f32) -> MultiMatchResult<ScaledDetection> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(MultiMatchError::InvalidScale { ratio });
        }
        Ok(ScaledDetection {
            x: self.bbox.x as f32 / ratio,
            y: self.bbox.y as f32 / ratio,
            width: self.bbox.width as f32 / ratio,
            height: self.bbox.height as f32 / ratio,
            score: self.score,
            template_index: self.template_index,
            label: self.label.clone(),
        })
    }
}

/// Detection with real-valued geometry, produced by rescaling.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledDetection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub score: f32,
    pub template_index: usize,
    pub label: String,
}

/// Rescales every detection with [`Detection::upscaled`].
pub fn upscale_detections(
    detections: &[Detection],
    ratio: f32,
) -> MultiMatchResult<Vec<ScaledDetection>> {
    detections.iter().map(|d| d.upscaled(ratio)).collect()
}
