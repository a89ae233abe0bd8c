//! Peak extraction from score maps.

use crate::candidate::PeakLimit;
use crate::kernel::ScoreMap;

/// Returns `(row, col)` coordinates of the peaks of `map` scoring at least
/// `score_threshold`.
///
/// A 1x1 map is a single score: it yields `(0, 0)` when that score clears
/// the threshold and nothing otherwise. Larger maps yield the global maximum
/// for [`PeakLimit::Single`] and every local maximum for
/// [`PeakLimit::Unbounded`]. Coordinates come out by descending score, ties in
/// row-major order.
pub fn find_peaks(
    map: &ScoreMap,
    score_threshold: f32,
    limit: PeakLimit,
) -> Vec<(usize, usize)> {
    if map.is_single_cell() {
        return match map.get(0, 0) {
            Some(score) if score >= score_threshold => vec![(0, 0)],
            _ => Vec::new(),
        };
    }

    match limit {
        PeakLimit::Single => global_maximum(map, score_threshold).into_iter().collect(),
        PeakLimit::Unbounded => local_maxima(map, score_threshold, None, false),
    }
}

/// Returns the first (row-major) cell holding the largest finite score, if
/// that score is at least `threshold_abs`.
pub fn global_maximum(map: &ScoreMap, threshold_abs: f32) -> Option<(usize, usize)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in map.as_slice().iter().enumerate() {
        if !score.is_finite() || score < threshold_abs {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| (idx / map.width(), idx % map.width()))
}

/// Finds local maxima over the 8-neighbourhood of each cell.
///
/// A cell is a peak when it scores at least `threshold_abs` and no neighbour
/// scores higher. Plateaus report only their first cell in row-major order,
/// and a map with a single constant value has no peaks. With
/// `exclude_border` set, cells on the outer ring are never reported.
/// Results are sorted by descending score and truncated to `max_count`.
pub fn local_maxima(
    map: &ScoreMap,
    threshold_abs: f32,
    max_count: Option<usize>,
    exclude_border: bool,
) -> Vec<(usize, usize)> {
    let width = map.width();
    let height = map.height();
    if max_count == Some(0) || is_constant(map) {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, usize, f32)> = Vec::new();
    for row in 0..height {
        for col in 0..width {
            if exclude_border && (row == 0 || col == 0 || row + 1 == height || col + 1 == width)
            {
                continue;
            }
            let Some(score) = map.get(row, col) else {
                continue;
            };
            if !score.is_finite() || score < threshold_abs {
                continue;
            }
            if is_neighbourhood_max(map, row, col, score) {
                candidates.push((row, col, score));
            }
        }
    }

    // Stable sort keeps row-major order among equal scores.
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut peaks: Vec<(usize, usize)> = Vec::with_capacity(candidates.len());
    'outer: for (row, col, _) in candidates {
        for &(kept_row, kept_col) in peaks.iter() {
            let dr = row.abs_diff(kept_row);
            let dc = col.abs_diff(kept_col);
            if dr.max(dc) <= 1 {
                continue 'outer;
            }
        }
        peaks.push((row, col));
        if max_count.is_some_and(|max| peaks.len() >= max) {
            break;
        }
    }
    peaks
}

fn is_neighbourhood_max(map: &ScoreMap, row: usize, col: usize, score: f32) -> bool {
    let row_end = (row + 1).min(map.height() - 1);
    let col_end = (col + 1).min(map.width() - 1);
    for r in row.saturating_sub(1)..=row_end {
        for c in col.saturating_sub(1)..=col_end {
            if let Some(other) = map.get(r, c) {
                if other > score {
                    return false;
                }
            }
        }
    }
    true
}

fn is_constant(map: &ScoreMap) -> bool {
    let data = map.as_slice();
    data.iter().all(|&v| v == data[0])
}

#[cfg(test)]
mod tests {
    use super::{find_peaks, global_maximum, local_maxima};
    use crate::candidate::PeakLimit;
    use crate::kernel::ScoreMap;

    fn map(width: usize, height: usize, data: &[f32]) -> ScoreMap {
        ScoreMap::new(data.to_vec(), width, height).unwrap()
    }

    #[test]
    fn single_cell_is_thresholded() {
        let surface = ScoreMap::single(0.9);
        assert_eq!(find_peaks(&surface, 0.6, PeakLimit::Unbounded), vec![(0, 0)]);
        assert_eq!(find_peaks(&surface, 0.6, PeakLimit::Single), vec![(0, 0)]);
        assert!(find_peaks(&surface, 0.95, PeakLimit::Unbounded).is_empty());
        assert!(find_peaks(&ScoreMap::single(f32::NAN), 0.0, PeakLimit::Single).is_empty());
    }

    #[test]
    fn finds_separated_local_maxima() {
        #[rustfmt::skip]
        let surface = map(5, 4, &[
            0.1, 0.2, 0.1, 0.0, 0.0,
            0.2, 0.9, 0.2, 0.0, 0.0,
            0.1, 0.2, 0.1, 0.3, 0.7,
            0.0, 0.0, 0.0, 0.2, 0.4,
        ]);
        let peaks = local_maxima(&surface, 0.5, None, false);
        assert_eq!(peaks, vec![(1, 1), (2, 4)]);

        // The border peak disappears when borders are excluded.
        assert_eq!(local_maxima(&surface, 0.5, None, true), vec![(1, 1)]);
        assert_eq!(local_maxima(&surface, 0.5, Some(1), false), vec![(1, 1)]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let surface = map(3, 1, &[0.1, 0.5, 0.1]);
        assert_eq!(local_maxima(&surface, 0.5, None, false), vec![(0, 1)]);
        assert!(local_maxima(&surface, 0.51, None, false).is_empty());
    }

    #[test]
    fn plateau_reports_first_cell() {
        let surface = map(4, 1, &[0.2, 0.8, 0.8, 0.1]);
        assert_eq!(local_maxima(&surface, 0.0, None, false), vec![(0, 1)]);
    }

    #[test]
    fn constant_map_has_no_local_maxima() {
        let surface = map(3, 3, &[0.7; 9]);
        assert!(local_maxima(&surface, 0.0, None, false).is_empty());
        // The global maximum is still defined.
        assert_eq!(global_maximum(&surface, 0.0), Some((0, 0)));
    }

    #[test]
    fn single_limit_returns_global_maximum() {
        #[rustfmt::skip]
        let surface = map(5, 2, &[
            0.6, 0.1, 0.2, 0.1, 0.6,
            0.1, 0.2, 0.95, 0.2, 0.1,
        ]);
        assert_eq!(find_peaks(&surface, 0.5, PeakLimit::Single), vec![(1, 2)]);
        assert!(find_peaks(&surface, 0.99, PeakLimit::Single).is_empty());
        assert_eq!(
            find_peaks(&surface, 0.5, PeakLimit::Unbounded),
            vec![(1, 2), (0, 0), (0, 4)]
        );
    }

    #[test]
    fn ignores_non_finite_scores() {
        let surface = map(3, 1, &[f32::NAN, 0.4, f32::NEG_INFINITY]);
        assert_eq!(global_maximum(&surface, f32::NEG_INFINITY), Some((0, 1)));
        assert_eq!(
            local_maxima(&surface, f32::NEG_INFINITY, None, false),
            vec![(0, 1)]
        );
    }
}
