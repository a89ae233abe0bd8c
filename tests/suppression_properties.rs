//! Randomized checks of greedy overlap suppression.

use multimatch::{suppress, BoundingBox, Detection, ObjectCount};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_pool(rng: &mut StdRng, len: usize) -> Vec<Detection> {
    (0..len)
        .map(|_| {
            let bbox = BoundingBox::new(
                rng.random_range(0..80),
                rng.random_range(0..80),
                rng.random_range(4..24),
                rng.random_range(4..24),
            )
            .unwrap();
            // Coarse scores force ties.
            let score = rng.random_range(0..20) as f32 / 20.0;
            Detection::new(bbox, score, rng.random_range(0..4), "")
        })
        .collect()
}

#[test]
fn kept_set_is_sorted_and_non_overlapping() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.random_range(0..60);
        let pool = random_pool(&mut rng, len);
        let max_overlap = rng.random_range(0..=10) as f32 / 10.0;
        let kept = suppress(pool.clone(), max_overlap, ObjectCount::Unbounded).unwrap();

        assert!(kept.len() <= pool.len());
        for pair in kept.windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
        for (i, a) in kept.iter().enumerate() {
            assert!(pool.contains(a));
            for b in &kept[i + 1..] {
                assert!(a.iou(b) <= max_overlap);
            }
        }
    }
}

#[test]
fn every_dropped_candidate_overlaps_a_stronger_kept_one() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let len = rng.random_range(1..60);
        let pool = random_pool(&mut rng, len);
        let max_overlap = rng.random_range(0..=10) as f32 / 10.0;
        let kept = suppress(pool.clone(), max_overlap, ObjectCount::Unbounded).unwrap();

        let mut remaining = kept.clone();
        for candidate in &pool {
            if let Some(pos) = remaining.iter().position(|k| k == candidate) {
                remaining.swap_remove(pos);
                continue;
            }
            assert!(
                kept.iter()
                    .any(|k| k.score() >= candidate.score() && k.iou(candidate) > max_overlap),
                "{candidate:?} dropped without a stronger overlapping detection"
            );
        }
    }
}

#[test]
fn finite_count_is_a_prefix_of_unbounded_result() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let len = rng.random_range(0..60);
        let pool = random_pool(&mut rng, len);
        let all = suppress(pool.clone(), 0.3, ObjectCount::Unbounded).unwrap();
        let n = rng.random_range(1..8);
        let some = suppress(pool, 0.3, ObjectCount::finite(n).unwrap()).unwrap();
        assert_eq!(some.len(), all.len().min(n));
        assert_eq!(some.as_slice(), &all[..some.len()]);
    }
}

#[test]
fn max_overlap_one_keeps_everything() {
    let mut rng = StdRng::seed_from_u64(11);
    let pool = random_pool(&mut rng, 50);
    let kept = suppress(pool.clone(), 1.0, ObjectCount::Unbounded).unwrap();

    let mut sorted = pool;
    sorted.sort_by(|a, b| b.score().total_cmp(&a.score()));
    assert_eq!(kept, sorted);
}

#[test]
fn single_object_returns_the_maximum() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let len = rng.random_range(1..40);
        let pool = random_pool(&mut rng, len);
        let best = pool
            .iter()
            .map(Detection::score)
            .fold(f32::NEG_INFINITY, f32::max);
        let kept = suppress(pool.clone(), 0.25, ObjectCount::ONE).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score(), best);
        // Ties resolve to the earliest pooled candidate.
        let first = pool.iter().find(|d| d.score() == best).unwrap();
        assert_eq!(&kept[0], first);
    }
}

#[test]
fn suppression_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let len = rng.random_range(0..50);
        let pool = random_pool(&mut rng, len);
        let once = suppress(pool, 0.25, ObjectCount::Unbounded).unwrap();
        let twice = suppress(once.clone(), 0.25, ObjectCount::Unbounded).unwrap();
        assert_eq!(once, twice);
    }
}
