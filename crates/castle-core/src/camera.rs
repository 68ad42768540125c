//! Camera description and the drivers that position it: the intro reveal
//! dolly, user orbit control, pointer parallax and the story path.

use crate::constants::{
    CAMERA_FOV_DEG, CAMERA_TARGET, ORBIT_CONTROL_DISTANCE, ORBIT_CONTROL_PITCH_LIMIT,
    ORBIT_CONTROL_SENSITIVITY, PARALLAX_GAIN_X, PARALLAX_GAIN_Y, PARALLAX_RATE, REVEAL_END,
    REVEAL_EPSILON, REVEAL_RATE, REVEAL_START, STORY_CAMERA_RATE,
};
use crate::curve::{approach, approach_vec3};
use crate::phase::ScenePhase;
use glam::{Mat4, Vec2, Vec3};

/// Right-handed perspective camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: REVEAL_START,
            target: CAMERA_TARGET,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: 0.1,
            zfar: 200.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Smooths the camera from the far start point to the hero framing once
/// loading completes, then hands off.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealDriver {
    position: Vec3,
    done: bool,
}

impl RevealDriver {
    pub fn new(start: Vec3) -> Self {
        Self {
            position: start,
            done: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns `true` on the frame the reveal finishes.
    pub fn update(&mut self, phase: ScenePhase, end: Vec3) -> bool {
        if self.done || phase == ScenePhase::Loading {
            return false;
        }
        self.position = approach_vec3(self.position, end, REVEAL_RATE);
        if self.position.distance(end) < REVEAL_EPSILON {
            self.position = end;
            self.done = true;
            log::debug!("camera reveal finished");
            return true;
        }
        false
    }
}

/// User drag orbit around the castle at a fixed distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitControl {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitControl {
    fn default() -> Self {
        Self::looking_from(REVEAL_END)
    }
}

impl OrbitControl {
    /// Orbit angles that put the camera on the ray through `eye`.
    pub fn looking_from(eye: Vec3) -> Self {
        let rel = eye - CAMERA_TARGET;
        let len = rel.length().max(f32::EPSILON);
        Self {
            yaw: rel.x.atan2(rel.z),
            pitch: (rel.y / len)
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-ORBIT_CONTROL_PITCH_LIMIT, ORBIT_CONTROL_PITCH_LIMIT),
            distance: ORBIT_CONTROL_DISTANCE,
        }
    }

    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_CONTROL_SENSITIVITY;
        self.pitch = (self.pitch + dy * ORBIT_CONTROL_SENSITIVITY)
            .clamp(-ORBIT_CONTROL_PITCH_LIMIT, ORBIT_CONTROL_PITCH_LIMIT);
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        CAMERA_TARGET + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }
}

/// Pointer-follow offset added to the camera position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParallaxDriver {
    offset: Vec2,
}

impl ParallaxDriver {
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Follows the pointer only while `enabled`; otherwise eases back to rest.
    pub fn update(&mut self, pointer: Vec2, enabled: bool) {
        let target = if enabled {
            Vec2::new(pointer.x * PARALLAX_GAIN_X, -pointer.y * PARALLAX_GAIN_Y)
        } else {
            Vec2::ZERO
        };
        self.offset.x = approach(self.offset.x, target.x, PARALLAX_RATE);
        self.offset.y = approach(self.offset.y, target.y, PARALLAX_RATE);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Reveal,
    Free,
    Story,
}

/// Picks which driver owns the camera each frame. Story always wins; user
/// orbit and parallax are suppressed while it runs.
#[derive(Clone, Debug)]
pub struct CameraRig {
    reveal: RevealDriver,
    reveal_end: Vec3,
    orbit: OrbitControl,
    parallax: ParallaxDriver,
    story_eye: Option<Vec3>,
}

impl CameraRig {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            reveal: RevealDriver::new(start),
            reveal_end: end,
            orbit: OrbitControl::looking_from(end),
            parallax: ParallaxDriver::default(),
            story_eye: None,
        }
    }

    pub fn mode(&self) -> CameraMode {
        if self.story_eye.is_some() {
            CameraMode::Story
        } else if self.reveal.is_done() {
            CameraMode::Free
        } else {
            CameraMode::Reveal
        }
    }

    pub fn parallax_offset(&self) -> Vec2 {
        self.parallax.offset()
    }

    pub fn orbit(&self) -> &OrbitControl {
        &self.orbit
    }

    /// User orbit drag; accepted only once the reveal has handed off, the
    /// scene is ready and no story is running.
    pub fn drag(&mut self, phase: ScenePhase, in_story: bool, dx: f32, dy: f32) -> bool {
        if phase != ScenePhase::Ready || in_story || !self.reveal.is_done() {
            return false;
        }
        self.orbit.drag(dx, dy);
        true
    }

    pub fn update(
        &mut self,
        camera: &mut Camera,
        phase: ScenePhase,
        pointer: Vec2,
        story: Option<Vec3>,
    ) {
        match story {
            Some(target) => {
                let from = self.story_eye.unwrap_or(camera.eye);
                self.story_eye = Some(approach_vec3(from, target, STORY_CAMERA_RATE));
            }
            None => {
                if let Some(last) = self.story_eye.take() {
                    // resume orbit from wherever the story left the camera
                    self.orbit = OrbitControl::looking_from(last);
                }
            }
        }
        self.parallax
            .update(pointer, phase == ScenePhase::Ready && self.story_eye.is_none());
        if self.reveal.update(phase, self.reveal_end) {
            self.orbit = OrbitControl::looking_from(self.reveal_end);
        }

        let offset = self.parallax.offset();
        camera.eye = match self.mode() {
            CameraMode::Story => self.story_eye.unwrap_or(camera.eye),
            CameraMode::Reveal => self.reveal.position() + Vec3::new(offset.x, offset.y, 0.0),
            CameraMode::Free => self.orbit.eye() + Vec3::new(offset.x, offset.y, 0.0),
        };
        camera.target = CAMERA_TARGET;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_round_trips_through_eye() {
        let o = OrbitControl::looking_from(Vec3::new(0.0, 0.0, 3.0));
        assert!(o.eye().distance(Vec3::new(0.0, 0.0, 3.0)) < 1e-4);
    }

    #[test]
    fn reveal_waits_for_loading() {
        let mut r = RevealDriver::new(REVEAL_START);
        assert!(!r.update(ScenePhase::Loading, REVEAL_END));
        assert_eq!(r.position(), REVEAL_START);
    }

    #[test]
    fn reveal_finishes_within_epsilon() {
        let mut r = RevealDriver::new(REVEAL_START);
        let mut frames = 0;
        while !r.update(ScenePhase::Fog, REVEAL_END) {
            frames += 1;
            assert!(frames < 2000);
        }
        assert_eq!(r.position(), REVEAL_END);
    }

    #[test]
    fn drag_rejected_before_ready() {
        let mut rig = CameraRig::new(REVEAL_START, REVEAL_END);
        assert!(!rig.drag(ScenePhase::Fog, false, 10.0, 0.0));
    }
}
