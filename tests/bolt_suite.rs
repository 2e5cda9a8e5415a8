use storm_show::bolt::{BoltPool, FractalBolt};
use storm_show::geometry::{Point, DEAD_ZONE};

const ORIGIN: Point = Point { x: 400.0, y: 0.0 };

fn segment_angle(start: Point, end: Point) -> f32 {
    (end.y - start.y).atan2(end.x - start.x)
}

fn segment_length(start: Point, end: Point) -> f32 {
    ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt()
}

#[test]
fn generation_terminates_and_avoids_the_dead_zone() {
    for round in 0..50 {
        let bolt = FractalBolt::generate(ORIGIN, 7, 3);
        assert!(!bolt.is_empty(), "round {round}: bolt has no segments");

        for (i, seg) in bolt.segments().iter().enumerate() {
            let angle = segment_angle(seg.start, seg.end);
            assert!(
                angle.abs() >= DEAD_ZONE - 1e-3,
                "round {round} segment {i}: angle {angle} falls in the dead zone"
            );
        }
    }
}

#[test]
fn segment_lengths_stay_in_range() {
    let bolt = FractalBolt::generate(ORIGIN, 7, 3);
    for seg in bolt.segments() {
        let len = segment_length(seg.start, seg.end);
        assert!(
            (99.0..=301.0).contains(&len),
            "segment length {len} outside [100, 300]"
        );
    }
}

#[test]
fn every_segment_connects_to_the_tree() {
    let bolt = FractalBolt::generate(ORIGIN, 5, 3);
    let mut known_ends: Vec<Point> = vec![bolt.origin()];

    for (i, seg) in bolt.segments().iter().enumerate() {
        let connected = known_ends
            .iter()
            .any(|p| p.x.to_bits() == seg.start.x.to_bits() && p.y.to_bits() == seg.start.y.to_bits());
        assert!(connected, "segment {i} starts at a point no earlier segment produced");
        known_ends.push(seg.end);
    }
}

#[test]
fn weights_rank_trunk_above_branches() {
    let branches = 7u32;
    let max_depth = 3u32;
    let bolt = FractalBolt::generate(ORIGIN, branches, max_depth);

    let lo = branches as i32 - max_depth as i32;
    let hi = branches as i32;
    for seg in bolt.segments() {
        assert!(
            (lo..=hi).contains(&seg.weight),
            "weight {} outside [{lo}, {hi}]",
            seg.weight
        );
    }
    assert!(
        bolt.segments().iter().any(|s| s.weight == hi),
        "no trunk-weight segment emitted"
    );
}

#[test]
fn zero_branch_count_yields_an_empty_bolt() {
    let bolt = FractalBolt::generate(ORIGIN, 0, 3);
    assert!(bolt.is_empty());
    assert_eq!(bolt.segments().len(), 0);
}

#[test]
fn zero_max_depth_emits_exactly_the_top_branches() {
    for _ in 0..20 {
        let bolt = FractalBolt::generate(ORIGIN, 4, 0);
        assert_eq!(
            bolt.segments().len(),
            4,
            "max_depth 0 must suppress all child branches"
        );
    }
}

#[test]
fn pool_precompute_yields_exactly_n_bolts() {
    for n in [0usize, 1, 13, 50] {
        let pool = BoltPool::precompute(n, ORIGIN, 3, 2);
        assert_eq!(pool.len(), n);
    }
}

#[test]
fn empty_pool_get_random_is_none_not_a_panic() {
    let pool = BoltPool::precompute(0, ORIGIN, 7, 3);
    for _ in 0..10 {
        assert!(pool.get_random().is_none());
    }
}

#[test]
fn populated_pool_always_serves_a_bolt() {
    let pool = BoltPool::precompute(5, ORIGIN, 7, 3);
    for _ in 0..100 {
        let bolt = pool.get_random().expect("non-empty pool must serve a bolt");
        assert!(!bolt.is_empty());
    }
}
