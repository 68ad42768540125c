//! Renderable handles the composition layer writes into each frame.
//!
//! Every object slot is an `Option`: assets load asynchronously and
//! independently, and a slot that is still `None` is simply skipped for that
//! frame. The renderer reads the handles back (or [`SceneHandles::pack`] them)
//! after [`crate::HeroScene::frame`] returns.

use crate::camera::Camera;
use crate::constants::FRAGMENT_BASE;
use crate::hotspot::{correct_material, HotspotId, HOTSPOT_COUNT};
use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightHandle {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub distance: f32,
}

impl LightHandle {
    pub fn new(position: Vec3, color: Vec3, intensity: f32, distance: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            distance,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialHandle {
    pub color: Vec3,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
}

impl Default for MaterialHandle {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
            opacity: 1.0,
            transparent: false,
        }
    }
}

impl MaterialHandle {
    /// Materials with a non-black emissive colour take part in glow pulses.
    pub fn is_emissive(&self) -> bool {
        self.emissive != Vec3::ZERO
    }
}

/// Position, Euler rotation (XYZ, radians), scale and visibility of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformHandle {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
}

impl Default for TransformHandle {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl TransformHandle {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: true,
        }
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }
}

/// A mesh node: one transform plus the material it draws with.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshHandle {
    pub transform: TransformHandle,
    pub material: MaterialHandle,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticlePoint {
    pub position: [f32; 3],
}

/// A point cloud whose positions are rewritten by a particle system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
    pub points: Vec<ParticlePoint>,
    pub opacity: f32,
    pub visible: bool,
}

impl ParticleBuffer {
    pub fn with_len(len: usize) -> Self {
        Self {
            points: vec![ParticlePoint::default(); len],
            opacity: 0.0,
            visible: false,
        }
    }

    /// Raw bytes for a vertex upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }
}

/// Everything belonging to one skill crystal once its model has loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrystalHandles {
    pub transform: TransformHandle,
    pub light: Option<LightHandle>,
    /// Only the materials that ship with a non-black emissive colour.
    pub emissive: Vec<MaterialHandle>,
}

impl CrystalHandles {
    /// Builds the handles from a freshly loaded model, applying the
    /// per-crystal load-time material correction.
    pub fn from_materials(
        id: HotspotId,
        materials: Vec<MaterialHandle>,
        light: Option<LightHandle>,
    ) -> Self {
        let emissive = materials
            .into_iter()
            .map(|mut m| {
                correct_material(id, &mut m);
                m
            })
            .filter(MaterialHandle::is_emissive)
            .collect();
        Self {
            transform: TransformHandle::default(),
            light,
            emissive,
        }
    }
}

/// Nodes driven by the castle reactions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReactionHandles {
    pub window_lights: [Option<LightHandle>; 5],
    pub aura_group: Option<TransformHandle>,
    pub aura_outer: Option<MeshHandle>,
    pub aura_inner: Option<MeshHandle>,
    pub rings_group: Option<TransformHandle>,
    pub rings: [Option<MeshHandle>; 2],
    pub circuit_group: Option<TransformHandle>,
    pub circuit: Option<ParticleBuffer>,
}

/// One scale-asset instance (drone, bird, ring or wanderer).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrbiterHandles {
    pub transform: TransformHandle,
    pub emissive: Vec<MaterialHandle>,
    pub light: Option<LightHandle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneHandles {
    pub camera: Camera,
    pub ambient: Option<LightHandle>,
    pub directional: Option<LightHandle>,
    pub cyan: Option<LightHandle>,
    /// Outer castle group, yawed by scroll.
    pub castle: Option<TransformHandle>,
    /// Inner castle group, scaled and spun by reactions.
    pub castle_inner: Option<TransformHandle>,
    pub fragments: [Option<TransformHandle>; 5],
    pub stars: Option<TransformHandle>,
    pub sparkles: Option<MaterialHandle>,
    pub clouds: [Option<MaterialHandle>; 2],
    pub rain: Option<ParticleBuffer>,
    pub crystals: [Option<CrystalHandles>; HOTSPOT_COUNT],
    pub reactions: ReactionHandles,
    pub orbiters: Vec<Option<OrbiterHandles>>,
}

impl SceneHandles {
    /// Empty scene: only the camera exists until assets report in.
    pub fn new(camera: Camera, orbiter_count: usize) -> Self {
        Self {
            camera,
            ambient: None,
            directional: None,
            cyan: None,
            castle: None,
            castle_inner: None,
            fragments: [None; 5],
            stars: None,
            sparkles: None,
            clouds: [None; 2],
            rain: None,
            crystals: Default::default(),
            reactions: ReactionHandles::default(),
            orbiters: vec![None; orbiter_count],
        }
    }

    /// Lights exist as soon as the canvas does.
    pub fn attach_lights(&mut self) {
        self.ambient = Some(LightHandle::new(Vec3::ZERO, crate::color::hex(0xe8f4ff), 0.5, 0.0));
        self.directional = Some(LightHandle::new(Vec3::new(5.0, 8.0, 3.0), Vec3::ONE, 2.0, 0.0));
        self.cyan = Some(LightHandle::new(
            Vec3::new(0.0, -0.55, 0.0),
            crate::color::hex(0x00e5ff),
            3.0,
            3.0,
        ));
    }

    /// Castle model loaded: groups, rock fragments, stars and sparkles.
    pub fn attach_castle(&mut self) {
        self.castle = Some(TransformHandle::default());
        self.castle_inner = Some(TransformHandle::default());
        for (slot, base) in self.fragments.iter_mut().zip(FRAGMENT_BASE) {
            *slot = Some(TransformHandle::at(Vec3::from_array(base)));
        }
        self.stars = Some(TransformHandle {
            visible: false,
            ..TransformHandle::default()
        });
        self.sparkles = Some(MaterialHandle {
            color: crate::color::hex(0x00e5ff),
            opacity: 0.5,
            transparent: true,
            ..MaterialHandle::default()
        });
    }

    pub fn attach_clouds(&mut self) {
        self.clouds = [
            Some(MaterialHandle {
                color: crate::color::hex(0xb0e8ff),
                transparent: true,
                ..MaterialHandle::default()
            }),
            Some(MaterialHandle {
                color: crate::color::hex(0xe0f0ff),
                transparent: true,
                ..MaterialHandle::default()
            }),
        ];
    }

    pub fn attach_crystal(&mut self, id: HotspotId, handles: CrystalHandles) {
        self.crystals[id.index()] = Some(handles);
    }

    pub fn attach_orbiter(&mut self, slot: usize, handles: OrbiterHandles) {
        if let Some(s) = self.orbiters.get_mut(slot) {
            *s = Some(handles);
        } else {
            log::warn!("orbiter slot {slot} out of range");
        }
    }

    /// Flattens the per-frame parameters into a float array for a JS or GPU
    /// consumer. Missing objects pack as zeros; layout is fixed by
    /// [`PACK_LAYOUT`].
    pub fn pack(&self, out: &mut Vec<f32>) {
        out.clear();
        push_vec3(out, self.camera.eye);
        for light in [&self.ambient, &self.directional, &self.cyan] {
            push_light(out, light.as_ref());
        }
        for t in [&self.castle, &self.castle_inner] {
            push_transform(out, t.as_ref());
        }
        for f in &self.fragments {
            push_transform(out, f.as_ref());
        }
        out.push(self.stars.map(|s| s.visible as u8 as f32).unwrap_or(0.0));
        out.push(self.sparkles.map(|m| m.opacity).unwrap_or(0.0));
        for c in &self.clouds {
            out.push(c.map(|m| m.opacity).unwrap_or(0.0));
        }
        for c in &self.crystals {
            let c = c.as_ref();
            push_transform(out, c.map(|c| &c.transform));
            out.push(first_emissive(c.map(|c| c.emissive.as_slice())));
            push_light(out, c.and_then(|c| c.light.as_ref()));
        }
        out.push(self.rain.as_ref().map(|r| r.opacity).unwrap_or(0.0));
    }

    /// Reaction and scale-asset parameters: a fixed [`EFFECTS_HEADER_LEN`]
    /// block followed by one [`ORBITER_STRIDE`] record per roster slot.
    pub fn pack_effects(&self, out: &mut Vec<f32>) {
        out.clear();
        let r = &self.reactions;
        for light in &r.window_lights {
            push_light(out, light.as_ref());
        }
        for (group, meshes) in [
            (&r.aura_group, [&r.aura_outer, &r.aura_inner]),
            (&r.rings_group, [&r.rings[0], &r.rings[1]]),
        ] {
            push_transform(out, group.as_ref());
            for m in meshes {
                push_mesh(out, m.as_ref());
            }
        }
        push_transform(out, r.circuit_group.as_ref());
        out.push(r.circuit.as_ref().map(|c| c.opacity).unwrap_or(0.0));
        for o in &self.orbiters {
            let o = o.as_ref();
            push_transform(out, o.map(|o| &o.transform));
            out.push(first_emissive(o.map(|o| o.emissive.as_slice())));
            out.push(o.and_then(|o| o.light.as_ref()).map(|l| l.intensity).unwrap_or(0.0));
        }
    }
}

/// Named offsets into the output of [`SceneHandles::pack`].
pub const PACK_LAYOUT: &[(&str, usize)] = &[
    ("camera", 0),
    ("ambient", 3),
    ("directional", 11),
    ("cyan", 19),
    ("castle", 27),
    ("castle_inner", 37),
    ("fragments", 47),
    ("stars", 97),
    ("sparkles", 98),
    ("clouds", 99),
    ("crystals", 101),
    ("rain", 196),
];

const LIGHT_STRIDE: usize = 8;
const TRANSFORM_STRIDE: usize = 10;
pub const CRYSTAL_STRIDE: usize = TRANSFORM_STRIDE + 1 + LIGHT_STRIDE;
pub const PACKED_LEN: usize = 197;
const MESH_STRIDE: usize = TRANSFORM_STRIDE + 2;
pub const EFFECTS_HEADER_LEN: usize =
    5 * LIGHT_STRIDE + 2 * (TRANSFORM_STRIDE + 2 * MESH_STRIDE) + TRANSFORM_STRIDE + 1;
pub const ORBITER_STRIDE: usize = TRANSFORM_STRIDE + 2;

fn push_vec3(out: &mut Vec<f32>, v: Vec3) {
    out.extend_from_slice(&v.to_array());
}

fn push_light(out: &mut Vec<f32>, light: Option<&LightHandle>) {
    match light {
        Some(l) => {
            push_vec3(out, l.position);
            push_vec3(out, l.color);
            out.push(l.intensity);
            out.push(l.distance);
        }
        None => out.extend_from_slice(&[0.0; LIGHT_STRIDE]),
    }
}

fn push_mesh(out: &mut Vec<f32>, m: Option<&MeshHandle>) {
    push_transform(out, m.map(|m| &m.transform));
    out.push(m.map(|m| m.material.opacity).unwrap_or(0.0));
    out.push(m.map(|m| m.material.emissive_intensity).unwrap_or(0.0));
}

/// Emissive intensity of the first glowing material, 0 when none are attached.
fn first_emissive(materials: Option<&[MaterialHandle]>) -> f32 {
    materials
        .and_then(|m| m.first())
        .map(|m| m.emissive_intensity)
        .unwrap_or(0.0)
}

fn push_transform(out: &mut Vec<f32>, t: Option<&TransformHandle>) {
    match t {
        Some(t) => {
            push_vec3(out, t.position);
            push_vec3(out, t.rotation);
            push_vec3(out, t.scale);
            out.push(t.visible as u8 as f32);
        }
        None => out.extend_from_slice(&[0.0; TRANSFORM_STRIDE]),
    }
}

/// Model URLs the page preloads, keyed by asset name.
#[derive(Clone, Debug, Default)]
pub struct AssetManifest {
    urls: FnvHashMap<&'static str, &'static str>,
}

impl AssetManifest {
    pub fn standard() -> Self {
        let mut urls = FnvHashMap::default();
        urls.insert("castle", "/3dModels/sky-castle/floating-castle.glb");
        for h in HotspotId::ALL {
            urls.insert(h.as_str(), h.spec().model);
        }
        for spec in crate::orbiters::ORBITER_MODELS {
            urls.insert(spec.0, spec.1);
        }
        Self { urls }
    }

    pub fn url(&self, name: &str) -> Option<&'static str> {
        self.urls.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.urls.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_length_matches_layout() {
        let mut scene = SceneHandles::new(Camera::default(), 0);
        let mut out = Vec::new();
        scene.pack(&mut out);
        assert_eq!(out.len(), PACKED_LEN);
        scene.attach_lights();
        scene.attach_castle();
        scene.pack(&mut out);
        assert_eq!(out.len(), PACKED_LEN);
        assert_eq!(101 + CRYSTAL_STRIDE * HOTSPOT_COUNT, 196);
    }

    #[test]
    fn effects_pack_has_one_record_per_orbiter() {
        let mut scene = SceneHandles::new(Camera::default(), 3);
        crate::reactions::CastleReactions::attach(&mut scene.reactions);
        let mut out = Vec::new();
        scene.pack_effects(&mut out);
        assert_eq!(EFFECTS_HEADER_LEN, 119);
        assert_eq!(out.len(), EFFECTS_HEADER_LEN + 3 * ORBITER_STRIDE);
    }

    #[test]
    fn crystal_keeps_only_emissive_materials() {
        let glow = MaterialHandle {
            emissive: Vec3::ONE,
            ..MaterialHandle::default()
        };
        let materials = vec![glow, MaterialHandle::default()];
        let h = CrystalHandles::from_materials(HotspotId::AiCube, materials, None);
        assert_eq!(h.emissive.len(), 1);
    }
}
