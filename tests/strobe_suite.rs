use std::time::{Duration, Instant};

use storm_show::canvas::Pixmap;
use storm_show::strobe::{
    draw_streak, StrobePhase, StrobeSequencer, StrobeTick, ThunderTransition,
    STRIKES_PER_TRANSITION,
};

/// Drive an armed sequencer at a fixed synthetic tick rate until it
/// advances. Returns (elapsed at advance, blank ticks seen, counter values
/// observed in order).
fn run_to_advance(
    seq: &mut StrobeSequencer,
    t0: Instant,
    tick: Duration,
) -> (Duration, usize, Vec<u32>) {
    let mut blanks = 0usize;
    let mut counters = Vec::new();
    let mut last_counter = 0u32;

    for i in 1..100_000u64 {
        let now = t0 + tick * i as u32;
        let out = seq.tick(now);
        if seq.strikes_done() != last_counter {
            counters.push(seq.strikes_done());
            last_counter = seq.strikes_done();
        }
        match out {
            StrobeTick::Blank => blanks += 1,
            StrobeTick::Advance => return (now.duration_since(t0), blanks, counters),
            _ => {}
        }
    }
    panic!("sequencer never advanced");
}

#[test]
fn advances_after_three_cycles_across_tick_rates() {
    let d = Duration::from_millis(300);
    for hz in [10u64, 30, 60, 144] {
        let t0 = Instant::now();
        let mut seq = StrobeSequencer::new(d);
        seq.arm(t0);

        let tick = Duration::from_nanos(1_000_000_000 / hz);
        let (elapsed, blanks, counters) = run_to_advance(&mut seq, t0, tick);

        assert!(
            elapsed >= d * 6,
            "{hz} Hz: advanced after {elapsed:?}, expected at least {:?}",
            d * 6
        );
        assert!(blanks > 0, "{hz} Hz: no blank phase observed");
        assert_eq!(
            counters,
            vec![1, 2, 0],
            "{hz} Hz: counter must step once per completed blank, then reset"
        );
        assert_eq!(seq.phase(), StrobePhase::Idle);
        assert_eq!(seq.strikes_done(), 0);
    }
}

#[test]
fn advance_fires_exactly_once_per_armed_cycle() {
    let d = Duration::from_millis(50);
    let t0 = Instant::now();
    let mut seq = StrobeSequencer::new(d);
    seq.arm(t0);

    let mut advances = 0;
    for i in 1..2_000u32 {
        if seq.tick(t0 + Duration::from_millis(5) * i) == StrobeTick::Advance {
            advances += 1;
        }
    }
    assert_eq!(advances, 1, "one armed cycle must yield exactly one advance");
}

#[test]
fn idle_sequencer_stays_inactive() {
    let mut seq = StrobeSequencer::new(Duration::from_millis(300));
    let t0 = Instant::now();
    for i in 0..50u32 {
        assert_eq!(seq.tick(t0 + Duration::from_secs(i as u64)), StrobeTick::Inactive);
        assert!(!seq.is_active());
    }
}

#[test]
fn flash_phase_keeps_flashing_until_duration_passes() {
    let d = Duration::from_millis(300);
    let t0 = Instant::now();
    let mut seq = StrobeSequencer::new(d);
    seq.arm(t0);

    assert_eq!(seq.tick(t0 + Duration::from_millis(100)), StrobeTick::Flash);
    assert_eq!(seq.tick(t0 + Duration::from_millis(300)), StrobeTick::Flash);
    assert_eq!(seq.tick(t0 + Duration::from_millis(301)), StrobeTick::Blank);
    assert_eq!(seq.phase(), StrobePhase::Blanked);
}

#[test]
fn strikes_per_transition_is_three() {
    assert_eq!(STRIKES_PER_TRANSITION, 3);
}

#[test]
fn transition_variant_yields_its_payload_once() {
    let d = Duration::from_millis(20);
    let t0 = Instant::now();
    let mut transition: ThunderTransition<usize> = ThunderTransition::new(d);
    assert!(!transition.is_active());

    transition.begin(t0, 7);
    assert!(transition.is_active());

    let mut advanced = false;
    for i in 1..500u32 {
        if transition.tick(t0 + Duration::from_millis(5) * i) == StrobeTick::Advance {
            advanced = true;
            break;
        }
    }
    assert!(advanced, "transition never completed");
    assert_eq!(transition.take(), Some(7));
    assert_eq!(transition.take(), None, "payload must yield exactly once");
    assert!(!transition.is_active());
}

#[test]
fn streak_spans_the_full_surface_height() {
    let mut canvas = Pixmap::new(64, 48);
    draw_streak(&mut canvas);

    let has_lit = |row: usize| {
        (0..canvas.width()).any(|x| canvas.pixel(x, row)[0] == 255)
    };
    assert!(has_lit(0), "streak missing from the top row");
    assert!(has_lit(canvas.height() - 1), "streak missing from the bottom row");
}
