//! The skill-crystal hotspots: static catalog, single-select state, and the
//! shared-speed orbit that keeps them evenly spaced.

use crate::color;
use crate::constants::{ASSUMED_FRAME_SEC, ORBIT_VELOCITY_RATE, SHARED_ORBIT_SPEED};
use crate::curve::{approach, orbit_position};
use crate::scene::MaterialHandle;
use glam::Vec3;
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HotspotId {
    CodeTablet,
    AiCube,
    GearNature,
    Database,
    HologramDisc,
}

pub const HOTSPOT_COUNT: usize = 5;

impl HotspotId {
    pub const ALL: [HotspotId; HOTSPOT_COUNT] = [
        HotspotId::CodeTablet,
        HotspotId::AiCube,
        HotspotId::GearNature,
        HotspotId::Database,
        HotspotId::HologramDisc,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HotspotId::CodeTablet => "code-tablet",
            HotspotId::AiCube => "ai-cube",
            HotspotId::GearNature => "gear-nature",
            HotspotId::Database => "database",
            HotspotId::HologramDisc => "hologram-disc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }

    pub fn spec(self) -> &'static HotspotSpec {
        &HOTSPOTS[self.index()]
    }
}

/// Castle effect played while a hotspot is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionKind {
    WindowShimmer,
    Aura,
    Rings,
    CircuitPulse,
    CastleSpin,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitParams {
    pub radius: f32,
    /// Vertical offset of the orbit plane.
    pub height: f32,
    pub tilt_deg: f32,
    pub tilt_dir_deg: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct HotspotSpec {
    pub id: HotspotId,
    pub model: &'static str,
    pub orbit: OrbitParams,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub emissive_base: f32,
    pub light_color: u32,
    pub reaction: ReactionKind,
}

pub const HOTSPOTS: [HotspotSpec; HOTSPOT_COUNT] = [
    HotspotSpec {
        id: HotspotId::CodeTablet,
        model: "/models/crystal-code-tablet.glb",
        orbit: OrbitParams { radius: 1.2, height: 0.10, tilt_deg: 12.0, tilt_dir_deg: 0.0 },
        title: "Markup",
        description: "Modern front-end development with HTML, CSS, JavaScript and TypeScript",
        tags: &["HTML", "CSS", "JavaScript", "TypeScript", "Three.js", "TailwindCSS"],
        emissive_base: 6.5,
        light_color: 0x00e5ff,
        reaction: ReactionKind::WindowShimmer,
    },
    HotspotSpec {
        id: HotspotId::AiCube,
        model: "/models/crystal-ai-cube.glb",
        orbit: OrbitParams { radius: 1.3, height: 0.20, tilt_deg: 18.0, tilt_dir_deg: 120.0 },
        title: "AI",
        description: "AI features built on the Claude and Gemini APIs",
        tags: &["Claude API", "Gemini API"],
        emissive_base: 6.0,
        light_color: 0x22d3ee,
        reaction: ReactionKind::Aura,
    },
    HotspotSpec {
        id: HotspotId::GearNature,
        model: "/models/crystal-gear-nature.glb",
        orbit: OrbitParams { radius: 1.1, height: 0.00, tilt_deg: 15.0, tilt_dir_deg: 240.0 },
        title: "CMS / FW",
        description: "WordPress builds, plugin development, CMS automation and frameworks such as Next.js",
        tags: &["WordPress", "PHP", "REST API", "Next.js", "Astro.js"],
        emissive_base: 2.0,
        light_color: 0x22d3ee,
        reaction: ReactionKind::Rings,
    },
    HotspotSpec {
        id: HotspotId::Database,
        model: "/models/crystal-database.glb",
        orbit: OrbitParams { radius: 1.4, height: 0.30, tilt_deg: 22.0, tilt_dir_deg: 60.0 },
        title: "DB / Infra",
        description: "From database design to infrastructure",
        tags: &["MySQL", "PostgreSQL", "Supabase", "Firebase", "Docker", "Vercel"],
        emissive_base: 5.0,
        light_color: 0x22d3ee,
        reaction: ReactionKind::CircuitPulse,
    },
    HotspotSpec {
        id: HotspotId::HologramDisc,
        model: "/models/crystal-hologram-disc.glb",
        orbit: OrbitParams { radius: 1.5, height: -0.10, tilt_deg: 10.0, tilt_dir_deg: 180.0 },
        title: "Design",
        description: "UI, UX and web design centred on the user experience",
        tags: &["Figma", "Responsive", "Accessibility"],
        emissive_base: 2.5,
        light_color: 0x22d3ee,
        reaction: ReactionKind::CastleSpin,
    },
];

/// Nullable single selection with toggle semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<HotspotId>,
}

impl Selection {
    pub fn active(&self) -> Option<HotspotId> {
        self.active
    }

    pub fn is_active(&self, id: HotspotId) -> bool {
        self.active == Some(id)
    }

    /// Selects `id`, or clears it if it is already selected. Returns whether
    /// the selection changed.
    pub fn toggle(&mut self, id: HotspotId) -> bool {
        let next = if self.active == Some(id) { None } else { Some(id) };
        self.set(next)
    }

    pub fn set(&mut self, next: Option<HotspotId>) -> bool {
        let changed = self.active != next;
        self.active = next;
        changed
    }

    pub fn clear(&mut self) -> bool {
        self.set(None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub angle: f32,
    pub velocity: f32,
}

/// Orbit angles for every hotspot. All share one phase and one velocity
/// driver, so their 360°/N spacing is preserved.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbits {
    /// Shared phase in \[0, 2π).
    phase: f64,
    velocity: f32,
}

impl Default for Orbits {
    fn default() -> Self {
        Self::new()
    }
}

impl Orbits {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            velocity: SHARED_ORBIT_SPEED,
        }
    }

    /// Velocity eases to zero while any hotspot is active and back to the
    /// shared speed otherwise; the phase integrates at the assumed frame step.
    pub fn update(&mut self, any_active: bool) {
        let target = if any_active { 0.0 } else { SHARED_ORBIT_SPEED };
        self.velocity = approach(self.velocity, target, ORBIT_VELOCITY_RATE);
        self.phase = (self.phase + f64::from(self.velocity * ASSUMED_FRAME_SEC)).rem_euclid(TAU);
    }

    /// Orbit angle of `id`, in \[0, 2π).
    pub fn angle(&self, id: HotspotId) -> f32 {
        angle_at(self.phase, id.index())
    }

    pub fn state(&self, id: HotspotId) -> OrbitState {
        OrbitState {
            angle: self.angle(id),
            velocity: self.velocity,
        }
    }

    pub fn angles(&self) -> [f32; HOTSPOT_COUNT] {
        std::array::from_fn(|i| angle_at(self.phase, i))
    }

    /// World position on the tilted orbit, before the per-index bob.
    pub fn position(&self, id: HotspotId) -> Vec3 {
        let spec = id.spec();
        let o = spec.orbit;
        orbit_position(
            o.radius,
            self.angle(id),
            o.tilt_deg.to_radians(),
            o.tilt_dir_deg.to_radians(),
        ) + Vec3::Y * o.height
    }
}

fn angle_at(phase: f64, index: usize) -> f32 {
    let step = TAU / HOTSPOT_COUNT as f64;
    (phase + index as f64 * step).rem_euclid(TAU) as f32
}

/// Load-time material fix-up: the hologram disc ships with near-white faces
/// that bloom out, so they are darkened and made translucent.
pub fn correct_material(id: HotspotId, mat: &mut MaterialHandle) {
    if id != HotspotId::HologramDisc {
        return;
    }
    let (_, _, lightness) = color::to_hsl(mat.color);
    if lightness > 0.6 {
        mat.color = color::from_hsl(0.52, 0.25, 0.15);
        mat.opacity = 0.7;
        mat.transparent = true;
    }
}
