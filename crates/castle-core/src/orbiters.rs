//! Decorative scale assets around the castle. Every variant is a
//! configuration of the same orbiter: a motion path plus emissive and
//! light gains that follow the scroll cyan boost.

use glam::Vec3;
use std::f32::consts::PI;

use crate::curve::cycle;
use crate::scene::{LightHandle, MaterialHandle, OrbiterHandles, TransformHandle};

/// (asset name, model URL)
pub const ORBITER_MODELS: [(&str, &str); 4] = [
    ("drone-scout", "/models/drone-scout.glb"),
    ("orbital-ring", "/models/orbital-ring.glb"),
    ("tiny-wanderer", "/models/tiny-wanderer.glb"),
    ("mechanical-bird", "/models/mechanical-bird.glb"),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbiterPath {
    /// Horizontal circle with a vertical bob.
    Circle {
        radius: f32,
        speed: f32,
        height: f32,
        bob_amp: f32,
        bob_freq: f32,
        phase: f32,
        /// Added to `-angle` to face along the path.
        heading: f32,
        /// Wing-flap roll amplitude.
        flap: f32,
    },
    /// Fixed position with a slow spin and wobble.
    Spin {
        position: Vec3,
        yaw_rate: f32,
        wobble: f32,
    },
    /// Stands still facing a fixed direction.
    Post { position: Vec3, facing: f32 },
}

/// Point light gain: `(base + amp·sin(freq·t + phase))·boost`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightGain {
    pub base: f32,
    pub amp: f32,
    pub freq: f32,
    pub phase: f32,
    pub distance: f32,
    /// Light position in the model's local space.
    pub offset: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbiterSpec {
    pub model: &'static str,
    pub scale: f32,
    pub path: OrbiterPath,
    pub emissive_gain: f32,
    pub light: Option<LightGain>,
}

const fn bird(radius: f32, speed: f32, height: f32, bob_amp: f32, phase: f32) -> OrbiterSpec {
    OrbiterSpec {
        model: "mechanical-bird",
        scale: 0.035,
        path: OrbiterPath::Circle {
            radius,
            speed,
            height,
            bob_amp,
            bob_freq: 0.8,
            phase,
            heading: -PI * 0.5,
            flap: 0.15,
        },
        emissive_gain: 2.0,
        light: None,
    }
}

const fn wanderer(position: Vec3, facing: f32, phase: f32) -> OrbiterSpec {
    OrbiterSpec {
        model: "tiny-wanderer",
        scale: 0.03,
        path: OrbiterPath::Post { position, facing },
        emissive_gain: 0.0,
        light: Some(LightGain {
            base: 3.0,
            amp: 1.5,
            freq: 2.0,
            phase,
            distance: 2.5,
            offset: Vec3::new(0.0, 12.0, 2.0),
        }),
    }
}

pub const DRONE: OrbiterSpec = OrbiterSpec {
    model: "drone-scout",
    scale: 0.08,
    path: OrbiterPath::Circle {
        radius: 2.5,
        speed: 0.3,
        height: 0.8,
        bob_amp: 0.2,
        bob_freq: 0.5,
        phase: 0.0,
        heading: PI * 0.5,
        flap: 0.0,
    },
    emissive_gain: 2.0,
    light: Some(LightGain {
        base: 1.5,
        amp: 0.0,
        freq: 0.0,
        phase: 0.0,
        distance: 3.0,
        offset: Vec3::ZERO,
    }),
};

pub const BIRDS: [OrbiterSpec; 5] = [
    bird(1.5, 0.25, 0.8, 0.2, 0.0),
    bird(1.8, 0.20, 1.2, 0.3, PI * 0.7),
    bird(1.3, 0.30, 0.6, 0.15, PI * 1.3),
    bird(2.0, 0.18, 1.5, 0.3, PI * 0.4),
    bird(1.6, 0.22, 1.0, 0.25, PI * 1.8),
];
pub const BIRDS_MOBILE: usize = 3;

pub const RING: OrbiterSpec = OrbiterSpec {
    model: "orbital-ring",
    scale: 3.0,
    path: OrbiterPath::Spin {
        position: Vec3::new(4.0, 3.0, -5.0),
        yaw_rate: 0.02,
        wobble: 0.1,
    },
    emissive_gain: 1.5,
    light: None,
};

pub const WANDERERS: [OrbiterSpec; 4] = [
    wanderer(Vec3::new(0.0, -0.115, 0.58), 0.0, 0.0),
    wanderer(Vec3::new(0.0, -0.116, -0.58), PI, 1.5),
    wanderer(Vec3::new(0.55, -0.1, 0.0), PI * 0.5, 3.0),
    wanderer(Vec3::new(-0.55, -0.1, 0.0), PI * 1.5, 4.5),
];

/// Instances for this device class. The distant ring is desktop only.
pub fn roster(mobile: bool) -> Vec<OrbiterSpec> {
    let birds = if mobile { BIRDS_MOBILE } else { BIRDS.len() };
    let mut out = Vec::with_capacity(1 + birds + 1 + WANDERERS.len());
    out.push(DRONE);
    out.extend_from_slice(&BIRDS[..birds]);
    if !mobile {
        out.push(RING);
    }
    out.extend_from_slice(&WANDERERS);
    out
}

impl OrbiterSpec {
    /// Handles for a freshly loaded instance; only emissive materials are kept.
    pub fn handles(&self, materials: Vec<MaterialHandle>) -> OrbiterHandles {
        OrbiterHandles {
            transform: TransformHandle::default(),
            emissive: materials.into_iter().filter(MaterialHandle::is_emissive).collect(),
            light: self.light.map(|g| {
                LightHandle::new(g.offset, crate::color::hex(0x00e5ff), g.base, g.distance)
            }),
        }
    }

    pub fn apply(&self, t: f64, boost: f32, h: &mut OrbiterHandles) {
        let tf = &mut h.transform;
        tf.set_uniform_scale(self.scale);
        match self.path {
            OrbiterPath::Circle {
                radius,
                speed,
                height,
                bob_amp,
                bob_freq,
                phase,
                heading,
                flap,
            } => {
                let angle = cycle(t, speed, phase);
                tf.position = Vec3::new(
                    angle.cos() * radius,
                    height + cycle(t, bob_freq, phase).sin() * bob_amp,
                    angle.sin() * radius,
                );
                tf.rotation.y = -angle + heading;
                tf.rotation.z = cycle(t, 4.0, phase).sin() * flap;
            }
            OrbiterPath::Spin {
                position,
                yaw_rate,
                wobble,
            } => {
                tf.position = position;
                tf.rotation.y = cycle(t, yaw_rate, 0.0);
                tf.rotation.z = cycle(t, 0.01, 0.0).sin() * wobble;
            }
            OrbiterPath::Post { position, facing } => {
                tf.position = position;
                tf.rotation.y = facing;
            }
        }
        if self.emissive_gain > 0.0 {
            for m in &mut h.emissive {
                m.emissive_intensity = self.emissive_gain * boost;
            }
        }
        if let (Some(gain), Some(light)) = (self.light, h.light.as_mut()) {
            let wave = cycle(t, gain.freq, gain.phase).sin();
            light.intensity = (gain.base + wave * gain.amp) * boost;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_roster_drops_birds_and_ring() {
        assert_eq!(roster(false).len(), 11);
        let mobile = roster(true);
        assert_eq!(mobile.len(), 8);
        assert!(mobile.iter().all(|s| s.model != "orbital-ring"));
    }

    #[test]
    fn drone_light_follows_boost() {
        let mut h = DRONE.handles(Vec::new());
        DRONE.apply(0.0, 0.4, &mut h);
        assert!((h.light.unwrap().intensity - 0.6).abs() < 1e-6);
        assert!((h.transform.position - Vec3::new(2.5, 0.8, 0.0)).length() < 1e-6);
    }

    #[test]
    fn birds_have_no_light() {
        let glow = MaterialHandle {
            emissive: Vec3::ONE,
            ..MaterialHandle::default()
        };
        let h = BIRDS[0].handles(vec![glow, MaterialHandle::default()]);
        assert!(h.light.is_none());
        assert_eq!(h.emissive.len(), 1);
    }
}
