//! Adapters that normalize raw external inputs into scene signals.

use crate::constants::TIME_OF_DAY_INTERVAL_SEC;
use glam::Vec2;

/// Remaps raw page scroll so the story section's own scroll distance is
/// excluded: 0 up to the end of the story, then rescaled to \[0, 1\].
#[inline]
pub fn exclude_story(raw: f32, story_end: Option<f32>) -> f32 {
    let raw = raw.clamp(0.0, 1.0);
    match story_end {
        None => raw,
        Some(end) => {
            let end = end.clamp(0.0, 1.0);
            if raw <= end {
                return 0.0;
            }
            let mut span = 1.0 - end;
            if span == 0.0 {
                span = 1.0;
            }
            ((raw - end) / span).clamp(0.0, 1.0)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSample {
    pub raw: f32,
    /// Scroll with the story range removed; what drivers consume.
    pub adjusted: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ScrollAdapter {
    story_end: Option<f32>,
}

impl ScrollAdapter {
    pub fn new(story_end: Option<f32>) -> Self {
        Self { story_end }
    }

    /// Story end as a fraction of total scroll, measured by the page.
    pub fn set_story_end(&mut self, end: Option<f32>) {
        self.story_end = end;
    }

    pub fn sample(&self, raw: f32) -> ScrollSample {
        let raw = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
        ScrollSample {
            raw,
            adjusted: exclude_story(raw, self.story_end),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            5..=7 => TimeOfDay::Dawn,
            8..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=19 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn ambient(self) -> f32 {
        match self {
            TimeOfDay::Dawn => 0.75,
            TimeOfDay::Morning => 1.0,
            TimeOfDay::Afternoon => 1.05,
            TimeOfDay::Evening => 0.8,
            TimeOfDay::Night => 0.5,
        }
    }

    pub fn cyan(self) -> f32 {
        match self {
            TimeOfDay::Dawn => 1.2,
            TimeOfDay::Morning => 1.0,
            TimeOfDay::Afternoon => 0.9,
            TimeOfDay::Evening => 1.4,
            TimeOfDay::Night => 1.8,
        }
    }
}

/// (ambient, cyan) multipliers from the wall-clock period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeMultipliers {
    pub ambient: f32,
    pub cyan: f32,
}

impl TimeMultipliers {
    pub const NEUTRAL: Self = Self {
        ambient: 1.0,
        cyan: 1.0,
    };
}

/// Buckets the wall-clock hour, re-evaluated on a coarse interval rather
/// than every frame.
#[derive(Clone, Debug)]
pub struct TimeOfDayAdapter {
    interval_sec: f32,
    since_eval: f32,
    period: Option<TimeOfDay>,
}

impl Default for TimeOfDayAdapter {
    fn default() -> Self {
        Self::new(TIME_OF_DAY_INTERVAL_SEC)
    }
}

impl TimeOfDayAdapter {
    pub fn new(interval_sec: f32) -> Self {
        Self {
            interval_sec,
            since_eval: 0.0,
            period: None,
        }
    }

    pub fn period(&self) -> Option<TimeOfDay> {
        self.period
    }

    pub fn update(&mut self, dt_sec: f32, hour: u32) -> TimeOfDay {
        self.since_eval += dt_sec;
        match self.period {
            Some(p) if self.since_eval < self.interval_sec => p,
            _ => {
                self.since_eval = 0.0;
                let p = TimeOfDay::from_hour(hour);
                if self.period != Some(p) {
                    log::info!("time of day: {p:?} (hour {hour})");
                }
                self.period = Some(p);
                p
            }
        }
    }

    pub fn multipliers(&self, enabled: bool) -> TimeMultipliers {
        match (enabled, self.period) {
            (true, Some(p)) => TimeMultipliers {
                ambient: p.ambient(),
                cyan: p.cyan(),
            },
            _ => TimeMultipliers::NEUTRAL,
        }
    }
}

/// Pointer position normalized to \[-0.5, 0.5\]² over a viewport.
#[inline]
pub fn normalize_pointer(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (x / width - 0.5).clamp(-0.5, 0.5),
        (y / height - 0.5).clamp(-0.5, 0.5),
    )
}
