//! Composition: combines driver values into final light, material and
//! transform parameters and writes them into the scene handles.

use crate::constants::{
    CASTLE_SCROLL_YAW, CLOUD_BASE_OPACITY, CYAN_PULSE_AMP, CYAN_PULSE_FREQ, FRAGMENT_BASE,
    FRAGMENT_SINK_GAIN, FRAGMENT_SPIN_BASE, FRAGMENT_SPIN_SCROLL, FRAGMENT_SPREAD_GAIN,
    HOTSPOT_ACTIVE_EMISSIVE_GAIN, HOTSPOT_BOB_AMP, HOTSPOT_BOB_FREQ, HOTSPOT_BOB_PHASE,
    HOTSPOT_LIGHT, HOTSPOT_LIGHT_ACTIVE, HOTSPOT_PULSE_AMP, HOTSPOT_PULSE_PHASE, HOTSPOT_SCALE,
    HOTSPOT_SCALE_ACTIVE, HOTSPOT_SPIN_PER_FRAME, SPARKLE_OPACITY_FLOOR, SPARKLE_OPACITY_GAIN,
    STARS_VISIBLE_AFTER, STORY_TINT_COLOR,
};
use crate::curve::{cycle, wrap_angle, Curve, Key, Lerp};
use crate::drivers::Drivers;
use crate::hotspot::{HotspotId, Orbits, Selection};
use crate::scene::SceneHandles;
use crate::signals::TimeMultipliers;
use crate::story::StoryState;
use glam::Vec3;

/// One day-cycle keyframe. Colours are sRGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayLight {
    pub ambient_color: Vec3,
    pub ambient: f32,
    pub directional: f32,
    pub cyan: f32,
}

impl Lerp for DayLight {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            ambient_color: self.ambient_color.lerp(other.ambient_color, t),
            ambient: Lerp::lerp(self.ambient, other.ambient, t),
            directional: Lerp::lerp(self.directional, other.directional, t),
            cyan: Lerp::lerp(self.cyan, other.cyan, t),
        }
    }
}

const fn day(ambient_color: Vec3, ambient: f32, directional: f32, cyan: f32) -> DayLight {
    DayLight {
        ambient_color,
        ambient,
        directional,
        cyan,
    }
}

/// Morning → noon → dusk → night → midnight over page scroll.
pub const DAY_CYCLE: Curve<DayLight> = Curve::new(&[
    Key::new(0.00, day(Vec3::new(1.0, 0.961, 0.878), 0.8, 2.0, 3.0)), // #fff5e0
    Key::new(0.25, day(Vec3::new(1.0, 1.0, 1.0), 1.0, 2.5, 3.0)),
    Key::new(0.50, day(Vec3::new(1.0, 0.549, 0.259), 0.7, 1.5, 5.0)), // #ff8c42
    Key::new(0.75, day(Vec3::new(0.102, 0.102, 0.243), 0.3, 0.5, 8.0)), // #1a1a3e
    Key::new(1.00, day(Vec3::new(0.039, 0.039, 0.102), 0.15, 0.2, 12.0)), // #0a0a1a
]);

/// Final light values for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingSummary {
    pub ambient_color: Vec3,
    pub ambient: f32,
    pub directional: f32,
    pub cyan: f32,
}

impl Default for LightingSummary {
    fn default() -> Self {
        let d = DAY_CYCLE.sample(0.0);
        Self {
            ambient_color: d.ambient_color,
            ambient: d.ambient,
            directional: d.directional,
            cyan: d.cyan,
        }
    }
}

#[inline]
pub fn cyan_pulse(t: f64) -> f32 {
    1.0 + cycle(t, CYAN_PULSE_FREQ, 0.0).sin() * CYAN_PULSE_AMP
}

pub fn lighting(
    t: f64,
    scroll: f32,
    time: TimeMultipliers,
    drivers: &Drivers,
    story: &StoryState,
) -> LightingSummary {
    let d = DAY_CYCLE.sample(scroll);
    let w = &drivers.weather;
    let cyan = d.cyan * time.cyan * cyan_pulse(t) * drivers.database_boost * w.cyan;
    LightingSummary {
        ambient_color: d.ambient_color.lerp(STORY_TINT_COLOR, drivers.story_tint),
        ambient: d.ambient * time.ambient * w.ambient,
        directional: d.directional * time.ambient * w.directional,
        cyan: story.shape_cyan(cyan),
    }
}

pub fn apply_lighting(l: &LightingSummary, handles: &mut SceneHandles) {
    if let Some(a) = handles.ambient.as_mut() {
        a.color = l.ambient_color;
        a.intensity = l.ambient;
    }
    if let Some(d) = handles.directional.as_mut() {
        d.intensity = l.directional;
    }
    if let Some(c) = handles.cyan.as_mut() {
        c.intensity = l.cyan;
    }
}

#[inline]
pub fn crystal_emissive(id: HotspotId, pulse_phase: f32, active: bool) -> f32 {
    let i = id.index() as f32;
    let wave = (pulse_phase + i * HOTSPOT_PULSE_PHASE).sin();
    let pulse = id.spec().emissive_base + wave * HOTSPOT_PULSE_AMP;
    if active {
        pulse * HOTSPOT_ACTIVE_EMISSIVE_GAIN
    } else {
        pulse
    }
}

pub fn apply_crystals(
    t: f64,
    drivers: &Drivers,
    orbits: &Orbits,
    selection: Selection,
    handles: &mut SceneHandles,
) {
    for id in HotspotId::ALL {
        let Some(c) = handles.crystals[id.index()].as_mut() else {
            continue;
        };
        let i = id.index() as f32;
        let active = selection.is_active(id);
        let bob = cycle(t, HOTSPOT_BOB_FREQ, i * HOTSPOT_BOB_PHASE).sin() * HOTSPOT_BOB_AMP;
        c.transform.position = orbits.position(id) + Vec3::Y * bob;
        let dir = if id.index() % 2 == 0 { 1.0 } else { -1.0 };
        let spin = c.transform.rotation.y + HOTSPOT_SPIN_PER_FRAME * dir;
        c.transform.rotation.y = wrap_angle(spin);
        c.transform
            .set_uniform_scale(if active { HOTSPOT_SCALE_ACTIVE } else { HOTSPOT_SCALE });

        let emissive = crystal_emissive(id, drivers.pulse_phase, active);
        for m in &mut c.emissive {
            m.emissive_intensity = emissive;
        }
        if let Some(light) = c.light.as_mut() {
            let (intensity, distance) = if active { HOTSPOT_LIGHT_ACTIVE } else { HOTSPOT_LIGHT };
            light.intensity = intensity;
            light.distance = distance;
        }
    }
}

/// Castle yaw, drifting rock fragments and the night sky.
pub fn apply_castle(t: f64, scroll: f32, handles: &mut SceneHandles) {
    if let Some(castle) = handles.castle.as_mut() {
        castle.rotation.y = scroll * CASTLE_SCROLL_YAW;
    }
    let spread = 1.0 + scroll * FRAGMENT_SPREAD_GAIN;
    for (i, (slot, base)) in handles.fragments.iter_mut().zip(FRAGMENT_BASE).enumerate() {
        let Some(f) = slot.as_mut() else { continue };
        let bob = cycle(t, HOTSPOT_BOB_FREQ, i as f32 * HOTSPOT_BOB_PHASE).sin() * HOTSPOT_BOB_AMP;
        f.position = Vec3::new(
            base[0] * spread,
            base[1] + bob - scroll * FRAGMENT_SINK_GAIN,
            base[2] * spread,
        );
        let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
        let spin = (FRAGMENT_SPIN_BASE + scroll * FRAGMENT_SPIN_SCROLL) * dir;
        f.rotation.y = wrap_angle(f.rotation.y + spin);
    }
    if let Some(stars) = handles.stars.as_mut() {
        stars.visible = scroll > STARS_VISIBLE_AFTER;
    }
}

#[inline]
pub fn sparkle_opacity(scroll_velocity: f32) -> f32 {
    (SPARKLE_OPACITY_FLOOR + scroll_velocity * SPARKLE_OPACITY_GAIN).min(1.0)
}

pub fn apply_atmosphere(drivers: &Drivers, handles: &mut SceneHandles) {
    if let Some(s) = handles.sparkles.as_mut() {
        s.opacity = sparkle_opacity(drivers.scroll_velocity.value());
    }
    for (cloud, base) in handles.clouds.iter_mut().zip(CLOUD_BASE_OPACITY) {
        if let Some(c) = cloud.as_mut() {
            c.opacity = base + drivers.weather.cloud_opacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_lighting_matches_day_cycle() {
        let drivers = Drivers::new();
        // sin(0) pulse is exactly 1
        let l = lighting(0.0, 0.5, TimeMultipliers::NEUTRAL, &drivers, &StoryState::default());
        assert!((l.ambient - 0.7).abs() < 1e-6);
        assert!((l.directional - 1.5).abs() < 1e-6);
        assert!((l.cyan - 5.0).abs() < 1e-6);
    }

    #[test]
    fn active_crystal_doubles_emissive() {
        let idle = crystal_emissive(HotspotId::CodeTablet, 0.0, false);
        let active = crystal_emissive(HotspotId::CodeTablet, 0.0, true);
        assert_eq!(idle, 6.5);
        assert_eq!(active, 13.0);
    }

    #[test]
    fn sparkles_saturate() {
        assert_eq!(sparkle_opacity(0.0), SPARKLE_OPACITY_FLOOR);
        assert_eq!(sparkle_opacity(10.0), 1.0);
    }
}
