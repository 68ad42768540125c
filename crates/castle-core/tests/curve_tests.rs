use castle_core::curve::{approach, cycle, orbit_position, wrap_angle, Curve, Key};
use castle_core::drivers::CYAN_BOOST;
use castle_core::hotspot::{HotspotId, Orbits, Selection, HOTSPOT_COUNT};
use std::f32::consts::TAU;

const RAMP: Curve<f32> = Curve::new(&[
    Key::new(0.0, 2.0),
    Key::new(0.3, 5.0),
    Key::new(0.7, 1.0),
    Key::new(1.0, 4.0),
]);

#[test]
fn keyframe_positions_return_exact_values() {
    for k in RAMP.keys() {
        assert_eq!(RAMP.sample(k.at), k.value);
    }
}

#[test]
fn values_between_keys_are_strictly_between() {
    for w in RAMP.keys().windows(2) {
        let (a, b) = (w[0], w[1]);
        let (lo, hi) = (a.value.min(b.value), a.value.max(b.value));
        for step in 1..20 {
            let x = a.at + (b.at - a.at) * step as f32 / 20.0;
            let v = RAMP.sample(x);
            assert!(v > lo && v < hi, "x={x} v={v}");
        }
    }
}

#[test]
fn out_of_range_clamps_to_end_keys() {
    assert_eq!(RAMP.sample(-1.0), 2.0);
    assert_eq!(RAMP.sample(3.0), 4.0);
    assert_eq!(RAMP.sample(f32::NAN), 2.0);
}

#[test]
fn cyan_boost_curve_shape() {
    assert_eq!(CYAN_BOOST.sample(0.1), 0.2);
    assert!((CYAN_BOOST.sample(0.625) - 0.6).abs() < 1e-6);
    assert_eq!(CYAN_BOOST.sample(1.0), 1.0);
}

#[test]
fn smoothing_converges_without_overshoot() {
    for &(start, target) in &[(0.0f32, 1.0f32), (3.0, 1.0), (-2.0, 0.5)] {
        for &rate in &[0.03f32, 0.1, 0.5, 1.0, 1.7, -0.2] {
            let mut v = start;
            let mut gap = (target - v).abs();
            for _ in 0..500 {
                v = approach(v, target, rate);
                let g = (target - v).abs();
                assert!(g <= gap, "gap grew: rate={rate}");
                if start < target {
                    assert!(v <= target);
                } else {
                    assert!(v >= target);
                }
                gap = g;
            }
        }
    }
}

#[test]
fn untilted_orbit_is_a_flat_circle() {
    let p = orbit_position(2.0, 0.0, 0.0, 0.0);
    assert!((p - glam::Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    let p = orbit_position(2.0, std::f32::consts::FRAC_PI_2, 0.0, 0.0);
    assert!((p - glam::Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
}

#[test]
fn tilt_lifts_the_orbit_plane() {
    let p = orbit_position(1.0, std::f32::consts::FRAC_PI_2, 30f32.to_radians(), 0.0);
    assert!((p.y - 0.5).abs() < 1e-5);
    assert!((p.length() - 1.0).abs() < 1e-5);
}

fn spacing(angles: &[f32; HOTSPOT_COUNT]) -> Vec<f32> {
    (0..HOTSPOT_COUNT)
        .map(|i| (angles[(i + 1) % HOTSPOT_COUNT] - angles[i]).rem_euclid(TAU))
        .collect()
}

#[test]
fn orbits_keep_equal_spacing() {
    let mut orbits = Orbits::new();
    let expected = TAU / HOTSPOT_COUNT as f32;
    for frame in 0..6_000 {
        // freeze and release a few times along the way
        orbits.update(frame % 2000 < 300);
        if frame % 997 == 0 {
            for gap in spacing(&orbits.angles()) {
                assert!((gap - expected).abs() < 1e-2, "gap {gap}");
            }
        }
    }
}

#[test]
fn orbit_spacing_holds_over_a_long_session() {
    let mut orbits = Orbits::new();
    let expected = TAU / HOTSPOT_COUNT as f32;
    // two hours at 60 fps
    for _ in 0..432_000 {
        orbits.update(false);
    }
    for angle in orbits.angles() {
        assert!((0.0..=TAU).contains(&angle));
    }
    for gap in spacing(&orbits.angles()) {
        assert!((gap - expected).abs() < 1e-2, "gap {gap}");
    }
}

#[test]
fn cycle_stays_accurate_after_hours() {
    let t = 5.0 * 3600.0 + 1.0 / 60.0;
    let rate = 1.2_f32;
    let exact = (t * f64::from(rate)).rem_euclid(std::f64::consts::TAU) as f32;
    assert!((cycle(t, rate, 0.0) - exact).abs() < 1e-5);
    let a = cycle(t, 1.5, 0.0);
    let b = cycle(t + 1.0 / 60.0, 1.5, 0.0);
    assert!(((b - a).rem_euclid(TAU) - 0.025).abs() < 1e-5);
}

#[test]
fn wrap_angle_folds_into_one_turn() {
    assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
    assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
}

#[test]
fn orbits_freeze_while_a_hotspot_is_active() {
    let mut orbits = Orbits::new();
    for _ in 0..600 {
        orbits.update(true);
    }
    let v = orbits.state(HotspotId::Database).velocity;
    assert!(v.abs() < 1e-6);
}

#[test]
fn toggling_twice_clears_selection() {
    for id in HotspotId::ALL {
        let mut s = Selection::default();
        assert!(s.toggle(id));
        assert_eq!(s.active(), Some(id));
        assert!(s.toggle(id));
        assert_eq!(s.active(), None);
    }
}

#[test]
fn toggling_another_switches_selection() {
    let mut s = Selection::default();
    s.toggle(HotspotId::AiCube);
    s.toggle(HotspotId::Database);
    assert_eq!(s.active(), Some(HotspotId::Database));
    assert!(s.clear());
    assert!(!s.clear());
}
