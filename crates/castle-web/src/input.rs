use castle_core::error::AdapterError;
use castle_core::SceneNotice;
use glam::Vec2;

/// Viewports narrower than this get the reduced asset roster.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[inline]
pub fn is_mobile_width(inner_width: f64) -> bool {
    inner_width < MOBILE_BREAKPOINT_PX
}

/// Page scroll as a fraction of the scrollable height.
#[inline]
pub fn scroll_fraction(scroll_y: f64, scroll_height: f64, viewport_height: f64) -> f32 {
    let range = scroll_height - viewport_height;
    if range <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / range).clamp(0.0, 1.0) as f32
}

/// Primary-button drag on the canvas, reported as pixel deltas.
#[derive(Default, Clone, Copy)]
pub struct DragState {
    pub active: bool,
    pub last: Vec2,
}

impl DragState {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.active = true;
        self.last = Vec2::new(x, y);
    }

    pub fn moved(&mut self, x: f32, y: f32) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        let p = Vec2::new(x, y);
        let d = p - self.last;
        self.last = p;
        (d != Vec2::ZERO).then_some(d)
    }

    pub fn end(&mut self) {
        self.active = false;
    }
}

/// `detail` payload for the DOM event mirroring a notice.
pub fn notice_detail(notice: &SceneNotice) -> Option<&'static str> {
    match notice {
        SceneNotice::HotspotChanged(id) => id.map(|h| h.as_str()),
        SceneNotice::PhaseChanged(p) => Some(p.as_str()),
        SceneNotice::Revealed => None,
    }
}

/// Maps a `GeolocationPositionError.code`.
pub fn geolocation_error(code: Option<f64>) -> AdapterError {
    match code {
        Some(c) if c == 1.0 => AdapterError::Denied,
        Some(c) if c == 3.0 => AdapterError::Timeout,
        _ => AdapterError::Unavailable,
    }
}

/// Floats per material in the arrays exchanged with the page's loader:
/// colour rgb, emissive rgb, opacity.
pub const MATERIAL_STRIDE: usize = 7;

pub fn decode_materials(flat: &[f32]) -> Vec<castle_core::scene::MaterialHandle> {
    flat.chunks_exact(MATERIAL_STRIDE)
        .map(|m| castle_core::scene::MaterialHandle {
            color: glam::Vec3::new(m[0], m[1], m[2]),
            emissive: glam::Vec3::new(m[3], m[4], m[5]),
            opacity: m[6],
            transparent: m[6] < 1.0,
            ..Default::default()
        })
        .collect()
}

pub fn encode_materials(materials: &[castle_core::scene::MaterialHandle]) -> Vec<f32> {
    let mut out = Vec::with_capacity(materials.len() * MATERIAL_STRIDE);
    for m in materials {
        out.extend_from_slice(&m.color.to_array());
        out.extend_from_slice(&m.emissive.to_array());
        out.push(m.opacity);
    }
    out
}
