//! Castle reactions to the active crystal. One component drives all five
//! variants; each reads its own hotspot's fade from [`Drivers::hotspot`].
//!
//! [`Drivers::hotspot`]: crate::drivers::Drivers::hotspot

use crate::constants::{
    CASTLE_ACTIVE_SCALE, CASTLE_BREATH_AMP, CASTLE_SPIN_DECAY, CASTLE_SPIN_PER_SEC,
    CIRCUIT_PARTICLE_COUNT, HOTSPOT_FADE_PER_SEC,
};
use crate::curve::{approach, cycle, dt_rate};
use crate::hotspot::{HotspotId, ReactionKind};
use crate::particles::CircuitField;
use crate::scene::{ParticleBuffer, ReactionHandles, TransformHandle};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const FADE_FLOOR: f32 = 0.01;
const WINDOW_LIGHT_DISTANCE: f32 = 0.3;
const MIN_GROUP_SCALE: f32 = 0.001;

/// Window light positions on the castle, in castle space.
pub const WINDOW_POSITIONS: [Vec3; 5] = [
    Vec3::new(0.15, 0.25, 0.35),
    Vec3::new(-0.15, 0.30, 0.30),
    Vec3::new(0.25, 0.15, -0.20),
    Vec3::new(-0.20, 0.20, -0.25),
    Vec3::new(0.05, 0.35, 0.15),
];

pub struct CastleReactions {
    circuit: CircuitField,
    spin: f32,
    castle_scale: f32,
}

impl CastleReactions {
    pub fn new(seed: u64) -> Self {
        Self {
            circuit: CircuitField::new(CIRCUIT_PARTICLE_COUNT, seed),
            spin: 0.0,
            castle_scale: 1.0,
        }
    }

    /// Creates the reaction nodes in their idle state.
    pub fn attach(handles: &mut ReactionHandles) {
        let cyan = crate::color::hex(0x00e5ff);
        for (slot, pos) in handles.window_lights.iter_mut().zip(WINDOW_POSITIONS) {
            *slot = Some(crate::scene::LightHandle::new(pos, cyan, 0.0, WINDOW_LIGHT_DISTANCE));
        }
        let idle = TransformHandle {
            scale: Vec3::splat(MIN_GROUP_SCALE),
            ..TransformHandle::default()
        };
        handles.aura_group = Some(TransformHandle::at(Vec3::new(0.0, 0.8, 0.0)));
        handles.aura_outer = Some(Default::default());
        handles.aura_inner = Some(Default::default());
        handles.rings_group = Some(TransformHandle::at(Vec3::new(0.0, 0.3, 0.0)));
        handles.rings = [Some(Default::default()), Some(Default::default())];
        handles.circuit_group = Some(idle);
        handles.circuit = Some(ParticleBuffer::with_len(CIRCUIT_PARTICLE_COUNT));
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn castle_scale(&self) -> f32 {
        self.castle_scale
    }

    pub fn update(
        &mut self,
        t: f64,
        dt_sec: f32,
        fades: &[f32; 5],
        active: Option<HotspotId>,
        handles: &mut ReactionHandles,
        castle_inner: Option<&mut TransformHandle>,
    ) {
        for id in HotspotId::ALL {
            let fade = fades[id.index()];
            match id.spec().reaction {
                ReactionKind::WindowShimmer => window_shimmer(t, fade, handles),
                ReactionKind::Aura => aura(t, fade, handles),
                ReactionKind::Rings => rings(t, fade, handles),
                ReactionKind::CircuitPulse => {
                    if let Some(g) = handles.circuit_group.as_mut() {
                        scale_in(g, t, fade);
                    }
                    if let Some(buf) = handles.circuit.as_mut() {
                        self.circuit.update(dt_sec, fade, buf);
                    }
                }
                ReactionKind::CastleSpin => {
                    if fade > FADE_FLOOR {
                        // within half a turn of rest
                        let spin = self.spin + dt_sec * CASTLE_SPIN_PER_SEC * fade;
                        self.spin = (spin + PI).rem_euclid(TAU) - PI;
                    } else {
                        self.spin *= CASTLE_SPIN_DECAY;
                    }
                }
            }
        }

        let target = if active.is_some() { CASTLE_ACTIVE_SCALE } else { 1.0 };
        self.castle_scale = approach(
            self.castle_scale,
            target,
            dt_rate(HOTSPOT_FADE_PER_SEC, dt_sec),
        );
        let breath = if active.is_some() {
            cycle(t, 1.5, 0.0).sin() * CASTLE_BREATH_AMP
        } else {
            0.0
        };
        if let Some(inner) = castle_inner {
            inner.rotation.y = self.spin;
            inner.set_uniform_scale(self.castle_scale + breath);
        }
    }
}

/// Group scale that reaches full size before the opacity does, plus a slow breath.
fn scale_in(group: &mut TransformHandle, t: f64, fade: f32) {
    let s = (fade * 1.5).min(1.0) * (1.0 + cycle(t, 1.5, 0.0).sin() * 0.1);
    group.set_uniform_scale(if s == 0.0 { MIN_GROUP_SCALE } else { s });
}

fn window_shimmer(t: f64, fade: f32, handles: &mut ReactionHandles) {
    for (i, light) in handles.window_lights.iter_mut().enumerate() {
        let Some(light) = light.as_mut() else { continue };
        if fade < FADE_FLOOR {
            light.intensity = 0.0;
            continue;
        }
        let fi = i as f32;
        let flicker = cycle(t, 3.0, fi * 1.8).sin() * 0.5 + 0.5;
        light.intensity = flicker * 2.0 * fade;
        light.distance = WINDOW_LIGHT_DISTANCE * fade + cycle(t, 1.0, fi).sin() * 0.1;
    }
}

fn aura(t: f64, fade: f32, handles: &mut ReactionHandles) {
    if let Some(g) = handles.aura_group.as_mut() {
        scale_in(g, t, fade);
    }
    if let Some(outer) = handles.aura_outer.as_mut() {
        outer.material.opacity = fade * (0.15 + cycle(t, 2.0, 0.0).sin() * 0.05);
        outer.transform.set_uniform_scale(1.0 + cycle(t, 1.5, 0.0).sin() * 0.1);
        outer.transform.rotation.y = cycle(t, 0.3, 0.0);
    }
    if let Some(inner) = handles.aura_inner.as_mut() {
        inner.material.opacity = fade * (0.6 + cycle(t, 3.0, 0.0).sin() * 0.2);
        inner.transform.set_uniform_scale(0.5 + cycle(t, 2.5, 0.0).sin() * 0.05);
    }
}

fn rings(t: f64, fade: f32, handles: &mut ReactionHandles) {
    if let Some(g) = handles.rings_group.as_mut() {
        scale_in(g, t, fade);
    }
    // (spin rate, tilt, opacity gain) per ring
    const RINGS: [(f32, f32, f32); 2] = [(0.8, PI * 0.3, 0.5), (-0.6, -PI * 0.2, 0.4)];
    for (ring, (rate, tilt, gain)) in handles.rings.iter_mut().zip(RINGS) {
        if let Some(ring) = ring.as_mut() {
            ring.transform.rotation.z = cycle(t, rate, 0.0);
            ring.transform.rotation.x = tilt;
            ring.material.opacity = fade * gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_decays_after_release() {
        let mut r = CastleReactions::new(1);
        let mut h = ReactionHandles::default();
        let mut fades = [0.0; 5];
        fades[HotspotId::HologramDisc.index()] = 1.0;
        for _ in 0..60 {
            r.update(0.0, 1.0 / 60.0, &fades, Some(HotspotId::HologramDisc), &mut h, None);
        }
        let spun = r.spin();
        assert!((spun - 0.8).abs() < 1e-3);
        fades = [0.0; 5];
        for _ in 0..200 {
            r.update(0.0, 1.0 / 60.0, &fades, None, &mut h, None);
        }
        assert!(r.spin() < spun * 0.01);
    }

    #[test]
    fn held_spin_stays_within_half_a_turn() {
        let mut r = CastleReactions::new(1);
        let mut h = ReactionHandles::default();
        let mut fades = [0.0; 5];
        fades[HotspotId::HologramDisc.index()] = 1.0;
        // two hours held open
        for _ in 0..432_000 {
            r.update(0.0, 1.0 / 60.0, &fades, Some(HotspotId::HologramDisc), &mut h, None);
            assert!(r.spin().abs() <= PI + 1e-4);
        }
        fades = [0.0; 5];
        for _ in 0..200 {
            r.update(0.0, 1.0 / 60.0, &fades, None, &mut h, None);
        }
        assert!(r.spin().abs() < 1e-3);
    }

    #[test]
    fn idle_window_lights_are_dark() {
        let mut r = CastleReactions::new(1);
        let mut h = ReactionHandles::default();
        CastleReactions::attach(&mut h);
        r.update(1.0, 1.0 / 60.0, &[0.0; 5], None, &mut h, None);
        assert!(h.window_lights.iter().flatten().all(|l| l.intensity == 0.0));
    }
}
