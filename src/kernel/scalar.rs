//! Scalar reference kernel for normalized cross-correlation.

use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::template::{Template, TemplatePlan, FLAT_VARIANCE};
use crate::util::MultiMatchResult;
use crate::ImageView;

/// Zero-mean normalized cross-correlation, one placement at a time.
///
/// Scores lie in `[-1, 1]`. Placements where either the template or the image
/// window is flat score `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn correlate(
        &self,
        image: ImageView<'_, u8>,
        template: &Template,
    ) -> MultiMatchResult<ScoreMap> {
        let plan = TemplatePlan::from_view(template.view())?;
        zncc_map(image, &plan)
    }
}

/// Scores every placement of a planned template.
pub fn zncc_map(image: ImageView<'_, u8>, plan: &TemplatePlan) -> MultiMatchResult<ScoreMap> {
    let (out_width, out_height) =
        placement_range(image, plan.width(), plan.height(), plan.channels())?;
    let mut data = vec![0.0f32; out_width * out_height];
    for (y, row) in data.chunks_exact_mut(out_width).enumerate() {
        score_row(image, plan, y, row);
    }
    ScoreMap::new(data, out_width, out_height)
}

/// Fills `out[x]` with the score at placement `(x, y)`.
///
/// The caller guarantees that every placement in the row is valid.
pub(crate) fn score_row(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    y: usize,
    out: &mut [f32],
) {
    if plan.is_flat() {
        out.fill(0.0);
        return;
    }
    for (x, slot) in out.iter_mut().enumerate() {
        *slot = score_at(image, plan, x, y);
    }
}

/// Computes the score at a single top-left placement.
///
/// Returns `0.0` for flat windows and `f32::NEG_INFINITY` for placements that
/// fall outside the image.
pub fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
    let tpl_height = plan.height();
    let seg_len = plan.width() * plan.channels();
    let offset = x * image.channels();
    let tpl = plan.zero_mean();

    let mut dot = 0.0f64;
    let mut sum_i = 0.0f64;
    let mut sum_i2 = 0.0f64;
    for ty in 0..tpl_height {
        let segment = match image
            .row(y + ty)
            .and_then(|row| row.get(offset..offset + seg_len))
        {
            Some(segment) => segment,
            None => return f32::NEG_INFINITY,
        };
        let base = ty * seg_len;
        for (&value, &t) in segment.iter().zip(&tpl[base..base + seg_len]) {
            let v = f64::from(value);
            dot += f64::from(t) * v;
            sum_i += v;
            sum_i2 += v * v;
        }
    }

    finish_score(dot, sum_i, sum_i2, plan)
}

pub(crate) fn finish_score(dot: f64, sum_i: f64, sum_i2: f64, plan: &TemplatePlan) -> f32 {
    let n = plan.len() as f64;
    let var_i = sum_i2 - sum_i * sum_i / n;
    if var_i <= FLAT_VARIANCE || plan.is_flat() {
        return 0.0;
    }
    let score = dot / (plan.energy() * var_i).sqrt();
    if score.is_finite() {
        score as f32
    } else {
        0.0
    }
}
