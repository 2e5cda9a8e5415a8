use std::f32::consts::PI;
use std::time::Duration;

use storm_show::canvas::Rgb;
use storm_show::particles::{ColorSpec, Particle, ParticleField, ParticlesConfig};

const BOUNDS: (f32, f32) = (800.0, 600.0);

fn test_config(total: usize) -> ParticlesConfig {
    serde_json::from_str(&format!(
        r#"{{
            "total_particles": {total},
            "particle_properties": [
                {{
                    "color": [10, 200, 30],
                    "size_min": 2.0,
                    "size_max": 10.0,
                    "velocity_range": [0.5, 2.0]
                }}
            ]
        }}"#
    ))
    .expect("test config must parse")
}

fn fixed_particle() -> Particle {
    Particle {
        x: 100.0,
        y: 100.0,
        velocity: 0.0,
        angle: 0.3,
        base_size: 6.0,
        size: 6.0,
        size_min: 2.0,
        size_max: 10.0,
        color: Rgb(255, 255, 255),
    }
}

#[test]
fn config_parses_fixed_and_random_colors() {
    let cfg = test_config(10);
    assert_eq!(cfg.total_particles, 10);
    assert_eq!(cfg.particle_properties.len(), 1);
    let fixed = cfg.particle_properties[0].color.resolve().unwrap();
    assert_eq!(fixed, Rgb(10, 200, 30));

    let random: ColorSpec = serde_json::from_str(r#""random""#).unwrap();
    random.resolve().expect("random mode must resolve");

    let bogus: ColorSpec = serde_json::from_str(r#""chartreuse""#).unwrap();
    assert!(bogus.resolve().is_err(), "unknown color modes must fail");
}

#[test]
fn optional_src_defaults_to_none() {
    let cfg = test_config(1);
    assert!(cfg.particle_properties[0].src.is_none());
}

#[test]
fn zero_velocity_step_leaves_position_unchanged() {
    let mut p = fixed_particle();
    for _ in 0..10 {
        p.step(BOUNDS);
    }
    assert_eq!(p.x, 100.0);
    assert_eq!(p.y, 100.0);
}

#[test]
fn horizontal_crossing_reflects_to_pi_minus_angle() {
    let mut p = fixed_particle();
    p.x = -1.0;
    p.angle = 0.3;
    p.step(BOUNDS);
    assert!(
        (p.angle - (PI - 0.3)).abs() < 1e-6,
        "expected pi - angle, got {}",
        p.angle
    );
}

#[test]
fn vertical_crossing_reflects_to_negated_angle() {
    let mut p = fixed_particle();
    p.y = -1.0;
    p.angle = 0.3;
    p.step(BOUNDS);
    assert!(
        (p.angle - (-0.3)).abs() < 1e-6,
        "expected -angle, got {}",
        p.angle
    );
}

#[test]
fn audio_level_modulation_clamps_to_the_size_range() {
    let mut p = fixed_particle();

    p.apply_audio_level(0.5);
    assert!((p.size - p.base_size).abs() < 1e-6);

    p.apply_audio_level(9.0);
    assert_eq!(p.size, p.size_max);

    p.apply_audio_level(-9.0);
    assert_eq!(p.size, p.size_min);
}

#[test]
fn spawned_particles_start_inside_the_bounds() {
    let field = ParticleField::spawn(&test_config(50), None, BOUNDS).unwrap();
    for p in field.snapshot() {
        assert!((0.0..=BOUNDS.0).contains(&p.x));
        assert!((0.0..=BOUNDS.1).contains(&p.y));
        assert!((2.0..=10.0).contains(&p.size));
        assert!((0.0..2.0 * PI).contains(&p.angle));
    }
}

#[test]
fn sustained_loudness_converges_every_size_to_the_ceiling() {
    let field = ParticleField::spawn(&test_config(10), None, BOUNDS).unwrap();
    for _ in 0..100 {
        field.apply_loudness(true);
    }
    for p in field.snapshot() {
        assert_eq!(p.size, 10.0, "loud growth must clamp at size_max");
    }
}

#[test]
fn sustained_quiet_converges_every_size_to_the_floor() {
    let field = ParticleField::spawn(&test_config(10), None, BOUNDS).unwrap();
    for _ in 0..100 {
        field.apply_loudness(false);
    }
    for p in field.snapshot() {
        assert_eq!(p.size, 2.0, "quiet shrink must clamp at size_min");
    }
}

#[test]
fn both_modulation_paths_may_run_in_one_tick_last_writer_wins() {
    let mut p = fixed_particle();
    p.apply_audio_level(0.9);
    let continuous = p.size;
    p.apply_loudness(true);
    assert_eq!(
        p.size,
        (continuous + 1.0).min(p.size_max),
        "coarse path must overwrite from the continuous path's value"
    );
}

#[test]
fn worker_start_is_idempotent_and_stop_joins() {
    let mut field = ParticleField::spawn(&test_config(20), None, BOUNDS).unwrap();
    assert!(!field.is_running());

    field.start();
    field.start();
    assert!(field.is_running());

    let before = field.snapshot();
    std::thread::sleep(Duration::from_millis(120));
    field.stop();
    assert!(!field.is_running());

    let after = field.snapshot();
    let moved = before
        .iter()
        .zip(&after)
        .any(|(a, b)| a.x != b.x || a.y != b.y);
    assert!(moved, "worker ran for 120ms but no particle moved");

    // Restart after a stop must work.
    field.start();
    assert!(field.is_running());
    field.stop();
}

#[test]
fn step_all_advances_on_the_calling_thread() {
    let field = ParticleField::spawn(&test_config(5), None, BOUNDS).unwrap();
    let before = field.snapshot();
    field.step_all();
    let after = field.snapshot();

    let moved = before
        .iter()
        .zip(&after)
        .any(|(a, b)| a.x != b.x || a.y != b.y);
    assert!(moved, "velocities are at least 0.5, something must move");
}
