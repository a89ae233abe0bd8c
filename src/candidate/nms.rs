//! Overlap-based non-maximum suppression for detections.

use crate::candidate::ObjectCount;
use crate::detection::Detection;
use crate::trace::{trace_event, trace_span};
use crate::util::{MultiMatchError, MultiMatchResult};
use std::cmp::Ordering;

/// Checks that `max_overlap` is a ratio in `[0, 1]`.
pub fn validate_max_overlap(max_overlap: f32) -> MultiMatchResult<()> {
    if (0.0..=1.0).contains(&max_overlap) {
        Ok(())
    } else {
        Err(MultiMatchError::OverlapOutOfRange { max_overlap })
    }
}

fn score_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    let key = |d: &Detection| {
        if d.score().is_nan() {
            f32::NEG_INFINITY
        } else {
            d.score()
        }
    };
    key(b).total_cmp(&key(a))
}

/// Sorts detections by descending score; equal scores keep their order.
pub(crate) fn sort_detections_desc(detections: &mut [Detection]) {
    detections.sort_by(score_cmp_desc);
}

/// Greedy non-maximum suppression over a pooled set of detections.
///
/// Detections are visited by descending score (ties in pool order) and kept
/// unless their IoU with an already kept detection exceeds `max_overlap`.
/// Suppression ignores template identity: a strong hit of one template
/// removes a weaker overlapping hit of another. Stops once `object_count`
/// detections are kept. The result is ordered by descending score.
pub fn suppress(
    mut pool: Vec<Detection>,
    max_overlap: f32,
    object_count: ObjectCount,
) -> MultiMatchResult<Vec<Detection>> {
    validate_max_overlap(max_overlap)?;
    let _span = trace_span!("suppress", candidates = pool.len()).entered();

    sort_detections_desc(&mut pool);
    let limit = object_count.limit().unwrap_or(usize::MAX);
    let mut kept: Vec<Detection> = Vec::new();

    'outer: for candidate in pool {
        if kept.len() >= limit {
            break;
        }
        for kept_det in kept.iter() {
            if candidate.iou(kept_det) > max_overlap {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }

    trace_event!(info, "suppressed", kept = kept.len());
    Ok(kept)
}
