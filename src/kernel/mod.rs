//! Correlation kernels producing score maps.
//!
//! A [`Kernel`] turns an image and a template into a [`ScoreMap`]: one score
//! per valid top-left placement, higher meaning a better match. The pipeline
//! only depends on this trait, so callers can plug in their own similarity
//! measure.

use crate::template::Template;
use crate::util::{MultiMatchError, MultiMatchResult};
use crate::ImageView;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Row-major correlation surface indexed by `(row, col)` placements.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl ScoreMap {
    /// Wraps a row-major buffer of `width * height` scores.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> MultiMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(MultiMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(MultiMatchError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(MultiMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a map by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> MultiMatchResult<Self>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self::new(data, width, height)
    }

    /// Wraps a single score, the surface of a template that fills the image.
    pub fn single(score: f32) -> Self {
        Self {
            data: vec![score],
            width: 1,
            height: 1,
        }
    }

    /// Number of columns (horizontal placements).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (vertical placements).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true for the degenerate 1x1 surface.
    pub fn is_single_cell(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Returns the score at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Returns the scores of row `row`.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the row-major score buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Similarity measure between an image and a template.
///
/// Implementations must fail with [`MultiMatchError::ChannelMismatch`] or
/// [`MultiMatchError::TemplateTooLarge`] when the inputs are incompatible.
/// The returned map has `(H - h + 1)` rows and `(W - w + 1)` columns.
pub trait Kernel {
    /// Computes the score of every placement of `template` inside `image`.
    fn correlate(
        &self,
        image: ImageView<'_, u8>,
        template: &Template,
    ) -> MultiMatchResult<ScoreMap>;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn correlate(
        &self,
        image: ImageView<'_, u8>,
        template: &Template,
    ) -> MultiMatchResult<ScoreMap> {
        (**self).correlate(image, template)
    }
}

/// Checks layout compatibility and returns the output `(width, height)`.
pub fn placement_range(
    image: ImageView<'_, u8>,
    tpl_width: usize,
    tpl_height: usize,
    tpl_channels: usize,
) -> MultiMatchResult<(usize, usize)> {
    if image.channels() != tpl_channels {
        return Err(MultiMatchError::ChannelMismatch {
            image: image.channels(),
            template: tpl_channels,
        });
    }
    if image.width() < tpl_width || image.height() < tpl_height {
        return Err(MultiMatchError::TemplateTooLarge {
            tpl_width,
            tpl_height,
            img_width: image.width(),
            img_height: image.height(),
        });
    }
    Ok((
        image.width() - tpl_width + 1,
        image.height() - tpl_height + 1,
    ))
}

/// Kernel used when the caller does not pick one.
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::ZnccScalar;

/// Kernel used when the caller does not pick one.
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::ZnccSimd;

#[cfg(test)]
mod tests {
    use super::{placement_range, ScoreMap};
    use crate::util::MultiMatchError;
    use crate::ImageView;

    #[test]
    fn score_map_indexes_row_major() {
        let map = ScoreMap::from_fn(3, 2, |row, col| (row * 10 + col) as f32).unwrap();
        assert_eq!(map.get(1, 2), Some(12.0));
        assert_eq!(map.row(0).unwrap(), &[0.0, 1.0, 2.0]);
        assert!(map.get(2, 0).is_none());
        assert!(!map.is_single_cell());
        assert!(ScoreMap::single(0.3).is_single_cell());
    }

    #[test]
    fn placement_range_reports_incompatible_inputs() {
        let data = [0u8; 12];
        let gray = ImageView::from_slice(&data, 4, 3).unwrap();
        assert_eq!(placement_range(gray, 2, 2, 1).unwrap(), (3, 2));
        assert_eq!(placement_range(gray, 4, 3, 1).unwrap(), (1, 1));
        assert_eq!(
            placement_range(gray, 5, 1, 1).unwrap_err(),
            MultiMatchError::TemplateTooLarge {
                tpl_width: 5,
                tpl_height: 1,
                img_width: 4,
                img_height: 3,
            }
        );
        assert_eq!(
            placement_range(gray, 1, 1, 3).unwrap_err(),
            MultiMatchError::ChannelMismatch {
                image: 1,
                template: 3,
            }
        );
    }
}
