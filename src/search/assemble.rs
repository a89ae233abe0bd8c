//! Candidate assembly across templates.
//!
//! Each template is correlated against the (optionally cropped) image on its
//! own; peaks become detections in full-image coordinates and are
//! concatenated in template order. No cross-template pruning happens here.

use crate::candidate::peaks::find_peaks;
use crate::candidate::PeakLimit;
use crate::detection::{BoundingBox, Detection};
use crate::kernel::Kernel;
use crate::search::MatchConfig;
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::MultiMatchResult;
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Per-call parameters shared by every template.
struct TemplateScan<'a, K> {
    image: ImageView<'a, u8>,
    kernel: &'a K,
    x_offset: usize,
    y_offset: usize,
    score_threshold: f32,
    limit: PeakLimit,
}

impl<K: Kernel> TemplateScan<'_, K> {
    fn hits(
        &self,
        index: usize,
        template: &Template,
        label: &str,
    ) -> MultiMatchResult<Vec<Detection>> {
        let _span = trace_span!("correlate", template = index).entered();
        let map = self.kernel.correlate(self.image, template)?;
        let peaks = find_peaks(&map, self.score_threshold, self.limit);

        let mut out = Vec::with_capacity(peaks.len());
        for (row, col) in peaks {
            let Some(score) = map.get(row, col) else {
                continue;
            };
            let bbox = BoundingBox::new(
                col + self.x_offset,
                row + self.y_offset,
                template.width(),
                template.height(),
            )?;
            out.push(Detection::new(bbox, score, index, label));
        }

        trace_event!(debug, "template_candidates", template = index, count = out.len());
        Ok(out)
    }
}

/// Builds the candidate pool for all templates.
///
/// Labels, when given, must already be validated to pair with templates.
/// In single-object mode the score threshold is not applied, so the pool
/// always carries each template's best placement.
pub(crate) fn assemble<K, L>(
    image: ImageView<'_, u8>,
    templates: &[Template],
    labels: Option<&[L]>,
    kernel: &K,
    cfg: &MatchConfig,
) -> MultiMatchResult<Vec<Detection>>
where
    K: Kernel + Sync,
    L: AsRef<str>,
{
    let _span = trace_span!("find_matches", templates = templates.len()).entered();

    let (view, x_offset, y_offset) = match cfg.search_region {
        Some(region) => (
            image.roi(region.x, region.y, region.width, region.height)?,
            region.x,
            region.y,
        ),
        None => (image, 0, 0),
    };
    let score_threshold = if cfg.object_count.is_single() {
        f32::NEG_INFINITY
    } else {
        cfg.score_threshold
    };
    let scan = TemplateScan {
        image: view,
        kernel,
        x_offset,
        y_offset,
        score_threshold,
        limit: cfg.object_count.peak_limit(),
    };
    let labels: Vec<&str> = (0..templates.len())
        .map(|index| {
            labels
                .and_then(|labels| labels.get(index))
                .map_or("", |label| label.as_ref())
        })
        .collect();

    let per_template = scan_templates(&scan, templates, &labels, cfg.parallel)?;
    let pool: Vec<Detection> = per_template.into_iter().flatten().collect();
    trace_event!(info, "candidate_pool", count = pool.len());
    Ok(pool)
}

fn scan_sequential<K: Kernel>(
    scan: &TemplateScan<'_, K>,
    templates: &[Template],
    labels: &[&str],
) -> MultiMatchResult<Vec<Vec<Detection>>> {
    templates
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(index, (template, label))| scan.hits(index, template, label))
        .collect()
}

#[cfg(feature = "rayon")]
fn scan_templates<K: Kernel + Sync>(
    scan: &TemplateScan<'_, K>,
    templates: &[Template],
    labels: &[&str],
    parallel: bool,
) -> MultiMatchResult<Vec<Vec<Detection>>> {
    if !parallel {
        return scan_sequential(scan, templates, labels);
    }
    templates
        .par_iter()
        .zip(labels.par_iter())
        .enumerate()
        .map(|(index, (template, label))| scan.hits(index, template, label))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn scan_templates<K: Kernel>(
    scan: &TemplateScan<'_, K>,
    templates: &[Template],
    labels: &[&str],
    _parallel: bool,
) -> MultiMatchResult<Vec<Vec<Detection>>> {
    scan_sequential(scan, templates, labels)
}
