use crate::constants::{
    PARTICLE_SEED, RAIN_COUNT, RAIN_COUNT_MOBILE, REVEAL_END, REVEAL_START, WEATHER_CACHE_TTL_SEC,
};
use glam::Vec3;
use std::time::Duration;

/// Construction-time settings for a [`crate::HeroScene`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Narrow viewport: fewer birds and rain drops, no distant ring.
    pub mobile: bool,
    /// Scroll fraction where the story section ends, if the page has one.
    pub story_end: Option<f32>,
    pub weather_ttl: Duration,
    pub reveal_start: Vec3,
    pub reveal_end: Vec3,
    pub rain_count: usize,
    pub seed: u64,
    /// Start with wall-clock lighting applied.
    pub time_lighting: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mobile: false,
            story_end: None,
            weather_ttl: Duration::from_secs(WEATHER_CACHE_TTL_SEC),
            reveal_start: REVEAL_START,
            reveal_end: REVEAL_END,
            rain_count: RAIN_COUNT,
            seed: PARTICLE_SEED,
            time_lighting: false,
        }
    }
}

impl SceneConfig {
    pub fn mobile() -> Self {
        Self {
            mobile: true,
            rain_count: RAIN_COUNT_MOBILE,
            ..Self::default()
        }
    }
}
