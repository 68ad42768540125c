//! Per-frame driver state. Each driver reads the frame's external signals and
//! its own previous value; nothing here touches scene handles.

use crate::constants::{
    DATABASE_BOOST, DATABASE_BOOST_RATE, HOTSPOT_FADE_PER_SEC, HOTSPOT_PULSE_FREQ,
    HOTSPOT_PULSE_SCROLL_GAIN, SCROLL_VELOCITY_RATE, SCROLL_VELOCITY_SCALE, STORY_TINT_RATE,
    WEATHER_RATE,
};
use crate::curve::{approach, dt_rate, wrap_angle, Curve, Key};
use crate::hotspot::{HotspotId, HOTSPOT_COUNT};
use crate::weather::WeatherMultipliers;

/// Scroll progress → emissive gain for scale assets and the cyan light.
pub const CYAN_BOOST: Curve<f32> = Curve::new(&[
    Key::new(0.00, 0.2),
    Key::new(0.25, 0.2),
    Key::new(0.50, 0.4),
    Key::new(0.75, 0.8),
    Key::new(1.00, 1.0),
]);

/// Smoothed weather multipliers. Targets are neutral when weather is off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherDrivers {
    pub ambient: f32,
    pub directional: f32,
    pub cyan: f32,
    pub cloud_opacity: f32,
    pub rain: f32,
}

impl Default for WeatherDrivers {
    fn default() -> Self {
        let n = WeatherMultipliers::NEUTRAL;
        Self {
            ambient: n.ambient,
            directional: n.directional,
            cyan: n.cyan,
            cloud_opacity: n.cloud_opacity,
            rain: n.rain,
        }
    }
}

impl WeatherDrivers {
    pub fn update(&mut self, target: Option<&WeatherMultipliers>) {
        let t = target.copied().unwrap_or(WeatherMultipliers::NEUTRAL);
        self.ambient = approach(self.ambient, t.ambient, WEATHER_RATE);
        self.directional = approach(self.directional, t.directional, WEATHER_RATE);
        self.cyan = approach(self.cyan, t.cyan, WEATHER_RATE);
        self.cloud_opacity = approach(self.cloud_opacity, t.cloud_opacity, WEATHER_RATE);
        self.rain = approach(self.rain, t.rain, WEATHER_RATE);
    }
}

/// Smoothed absolute scroll delta. Never negative; decays when scrolling stops.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollVelocity {
    prev: Option<f32>,
    value: f32,
}

impl ScrollVelocity {
    pub fn update(&mut self, scroll: f32) -> f32 {
        let raw = match self.prev {
            Some(p) => (scroll - p).abs() * SCROLL_VELOCITY_SCALE,
            None => 0.0,
        };
        self.prev = Some(scroll);
        self.value = approach(self.value, raw, SCROLL_VELOCITY_RATE).max(0.0);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drivers {
    /// Per-hotspot intensity, 0 → 1 while selected (~0.5 s, `dt`-scaled).
    pub hotspot: [f32; HOTSPOT_COUNT],
    pub weather: WeatherDrivers,
    /// Taken straight from the curve, not smoothed.
    pub cyan_boost: f32,
    pub scroll_velocity: ScrollVelocity,
    pub database_boost: f32,
    /// Crystal pulse phase in [0, 2π); runs faster while scrolling.
    pub pulse_phase: f32,
    /// 0 → 1 blend of the ambient colour toward the story tint.
    pub story_tint: f32,
}

/// Signals the drivers consume this frame, already sampled by the adapters.
#[derive(Clone, Copy, Debug)]
pub struct DriverInputs<'a> {
    pub dt_sec: f32,
    pub scroll: f32,
    pub active: Option<HotspotId>,
    pub weather: Option<&'a WeatherMultipliers>,
    pub story_tint: bool,
}

impl Drivers {
    pub fn new() -> Self {
        Self {
            database_boost: 1.0,
            cyan_boost: CYAN_BOOST.sample(0.0),
            ..Self::default()
        }
    }

    pub fn update(&mut self, input: DriverInputs<'_>) {
        let fade = dt_rate(HOTSPOT_FADE_PER_SEC, input.dt_sec);
        for id in HotspotId::ALL {
            let target = if input.active == Some(id) { 1.0 } else { 0.0 };
            let v = &mut self.hotspot[id.index()];
            *v = approach(*v, target, fade);
        }

        self.weather.update(input.weather);
        self.cyan_boost = CYAN_BOOST.sample(input.scroll);
        let velocity = self.scroll_velocity.update(input.scroll);

        let db_target = if input.active == Some(HotspotId::Database) {
            DATABASE_BOOST
        } else {
            1.0
        };
        self.database_boost = approach(self.database_boost, db_target, DATABASE_BOOST_RATE);

        let pulse_step =
            input.dt_sec * HOTSPOT_PULSE_FREQ * (1.0 + velocity * HOTSPOT_PULSE_SCROLL_GAIN);
        self.pulse_phase = wrap_angle(self.pulse_phase + pulse_step);

        let tint_target = if input.story_tint { 1.0 } else { 0.0 };
        self.story_tint = approach(self.story_tint, tint_target, STORY_TINT_RATE);
    }

    pub fn hotspot_intensity(&self, id: HotspotId) -> f32 {
        self.hotspot[id.index()]
    }
}
