//! Template plan precomputation for normalized cross-correlation.

use crate::image::ImageView;
use crate::util::{MultiMatchError, MultiMatchResult};

/// Variance below which a window or template counts as flat.
pub(crate) const FLAT_VARIANCE: f64 = 1e-8;

/// Precomputed zero-mean buffer and energy for NCC scoring.
///
/// All channels are pooled: the mean is taken over every sample of the
/// template, matching a joint correlation over the channel axis.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    channels: usize,
    mean: f32,
    energy: f64,
    zero_mean: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> MultiMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let channels = tpl.channels();
        let count = tpl
            .row_len()
            .checked_mul(height)
            .ok_or(MultiMatchError::InvalidDimensions { width, height })?;

        let mut samples = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).ok_or(MultiMatchError::BufferTooSmall {
                needed: y * tpl.stride() + tpl.row_len(),
                got: tpl.as_slice().len(),
            })?;
            samples.extend_from_slice(row);
        }

        let sum: f64 = samples.iter().map(|&v| f64::from(v)).sum();
        let mean = sum / count as f64;
        let mut energy = 0.0f64;
        let zero_mean: Vec<f32> = samples
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                energy += d * d;
                d as f32
            })
            .collect();

        Ok(Self {
            width,
            height,
            channels,
            mean: mean as f32,
            energy,
            zero_mean,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the number of samples (`width * height * channels`).
    pub fn len(&self) -> usize {
        self.zero_mean.len()
    }

    /// Always false; templates have positive dimensions.
    pub fn is_empty(&self) -> bool {
        self.zero_mean.is_empty()
    }

    /// Returns the mean intensity over all samples.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Returns true when the template has no usable contrast.
    pub fn is_flat(&self) -> bool {
        self.energy <= FLAT_VARIANCE
    }

    /// Returns the zero-mean template buffer in row-major interleaved order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }
}

#[cfg(test)]
mod tests {
    use super::TemplatePlan;
    use crate::image::ImageView;

    #[test]
    fn plan_matches_known_stats() {
        let data = [0u8, 1, 2, 3];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let plan = TemplatePlan::from_view(view).unwrap();

        assert!((plan.mean() - 1.5).abs() < 1e-6);
        assert!((plan.energy() - 5.0).abs() < 1e-9);
        assert_eq!(plan.zero_mean(), &[-1.5, -0.5, 0.5, 1.5]);
        assert!(!plan.is_flat());
    }

    #[test]
    fn plan_pools_channels() {
        let data = [10u8, 20, 30, 40, 50, 60];
        let view = ImageView::from_interleaved(&data, 2, 1, 3).unwrap();
        let plan = TemplatePlan::from_view(view).unwrap();
        assert_eq!(plan.len(), 6);
        assert!((plan.mean() - 35.0).abs() < 1e-6);
    }

    #[test]
    fn flat_template_is_flagged() {
        let data = [7u8; 9];
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        let plan = TemplatePlan::from_view(view).unwrap();
        assert!(plan.is_flat());
    }
}
