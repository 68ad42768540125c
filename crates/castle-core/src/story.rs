//! Scroll-driven story sequence: camera path and per-block lighting effects.

use crate::constants::{STORY_BLOCK1_CYAN_GAIN, STORY_BLOCK3_CYAN_GAIN, STORY_BURST_GAIN};
use crate::curve::catmull_rom;
use glam::Vec3;
use std::f32::consts::PI;

/// Control points of the story camera path, in order of story progress.
pub const STORY_PATH: [Vec3; 6] = [
    Vec3::new(0.0, 0.6, 3.0),
    Vec3::new(2.2, 0.9, 2.2),
    Vec3::new(3.0, 1.4, 0.0),
    Vec3::new(1.6, 1.8, -2.4),
    Vec3::new(-1.8, 1.2, -2.2),
    Vec3::new(-2.6, 0.7, 0.8),
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StoryState {
    pub active: bool,
    pub progress: f32,
    pub block: u8,
}

impl StoryState {
    pub fn set(&mut self, active: bool, progress: f32, block: u8) {
        let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        if active != self.active {
            log::debug!("story {}", if active { "entered" } else { "left" });
        }
        self.active = active;
        self.progress = progress;
        self.block = block;
    }

    pub fn camera_target(&self) -> Vec3 {
        catmull_rom(&STORY_PATH, self.progress)
    }

    /// Applies the active block's effect to the cyan light intensity.
    pub fn shape_cyan(&self, intensity: f32) -> f32 {
        if !self.active {
            return intensity;
        }
        match self.block {
            1 => intensity * STORY_BLOCK1_CYAN_GAIN,
            3 => intensity * STORY_BLOCK3_CYAN_GAIN,
            4 => intensity + STORY_BURST_GAIN * (0.5 + 0.5 * (3.0 * PI * self.progress).sin()),
            _ => intensity,
        }
    }

    /// Block 3 pulls the ambient colour toward dark cyan.
    pub fn tints_ambient(&self) -> bool {
        self.active && self.block == 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_story_leaves_cyan_untouched() {
        let s = StoryState {
            active: false,
            progress: 0.5,
            block: 4,
        };
        assert_eq!(s.shape_cyan(2.0), 2.0);
    }

    #[test]
    fn block_four_burst_is_additive() {
        let s = StoryState {
            active: true,
            progress: 1.0 / 6.0,
            block: 4,
        };
        // sin(π/2) = 1 → full burst of 3
        assert!((s.shape_cyan(2.0) - 5.0).abs() < 1e-4);
    }
}
