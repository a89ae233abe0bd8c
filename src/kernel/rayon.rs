//! Rayon-parallel correlation kernel (feature-gated).
//!
//! Rows of the score map are independent, so they are computed on the rayon
//! pool with the scalar row routine. Results are bit-identical to
//! [`ZnccScalar`](crate::kernel::scalar::ZnccScalar).

use crate::kernel::scalar::score_row;
use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::template::{Template, TemplatePlan};
use crate::util::MultiMatchResult;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel zero-mean normalized cross-correlation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZnccParallel;

impl Kernel for ZnccParallel {
    fn correlate(
        &self,
        image: ImageView<'_, u8>,
        template: &Template,
    ) -> MultiMatchResult<ScoreMap> {
        let plan = TemplatePlan::from_view(template.view())?;
        zncc_map_par(image, &plan)
    }
}

/// Scores every placement of a planned template, one rayon task per row.
pub fn zncc_map_par(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> MultiMatchResult<ScoreMap> {
    let (out_width, out_height) =
        placement_range(image, plan.width(), plan.height(), plan.channels())?;
    let mut data = vec![0.0f32; out_width * out_height];
    data.par_chunks_exact_mut(out_width)
        .enumerate()
        .for_each(|(y, row)| score_row(image, plan, y, row));
    ScoreMap::new(data, out_width, out_height)
}
