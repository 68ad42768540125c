//! Weather categories, their lighting multipliers, and the fetch/caching
//! state machine that turns forecast readings into the scene's weather signal.
//!
//! The service never performs I/O itself. [`WeatherService::request`] either
//! answers from the cache or hands back a [`FetchTicket`]; the front end
//! performs the fetch off the frame loop and reports back through
//! [`WeatherService::complete`]. Only the most recently issued ticket is
//! applied, so a slow response for an old location cannot overwrite a newer one.

use crate::clock::Clock;
use crate::constants::WEATHER_CACHE_TTL_SEC;
use crate::error::AdapterError;
use crate::sources::ForecastReading;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Fog,
    Rain,
    Thunderstorm,
    Snow,
}

/// Per-category scaling applied to lights and weather effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherMultipliers {
    pub ambient: f32,
    pub directional: f32,
    pub cyan: f32,
    pub cloud_opacity: f32,
    pub rain: f32,
}

impl WeatherMultipliers {
    /// Used while weather is disabled or unknown.
    pub const NEUTRAL: Self = Self {
        ambient: 1.0,
        directional: 1.0,
        cyan: 1.0,
        cloud_opacity: 0.0,
        rain: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeatherDisplay {
    pub icon: &'static str,
    pub label: &'static str,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 6] = [
        WeatherCategory::Clear,
        WeatherCategory::Clouds,
        WeatherCategory::Fog,
        WeatherCategory::Rain,
        WeatherCategory::Thunderstorm,
        WeatherCategory::Snow,
    ];

    /// Categories offered as manual previews in the weather panel.
    pub const PREVIEW: [WeatherCategory; 4] = [
        WeatherCategory::Clear,
        WeatherCategory::Clouds,
        WeatherCategory::Rain,
        WeatherCategory::Fog,
    ];

    /// WMO weather interpretation code to category.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | 1 => WeatherCategory::Clear,
            2 | 3 => WeatherCategory::Clouds,
            45..=48 => WeatherCategory::Fog,
            51..=67 => WeatherCategory::Rain,
            71..=77 => WeatherCategory::Snow,
            80..=82 => WeatherCategory::Rain,
            85..=86 => WeatherCategory::Snow,
            95..=99 => WeatherCategory::Thunderstorm,
            _ => WeatherCategory::Clear,
        }
    }

    /// A code that maps back to this category; used when synthesizing an override.
    pub fn representative_code(self) -> i32 {
        match self {
            WeatherCategory::Clear => 0,
            WeatherCategory::Clouds => 3,
            WeatherCategory::Fog => 45,
            WeatherCategory::Rain => 61,
            WeatherCategory::Thunderstorm => 95,
            WeatherCategory::Snow => 71,
        }
    }

    pub fn multipliers(self) -> WeatherMultipliers {
        let (ambient, directional, cyan, cloud_opacity, rain) = match self {
            WeatherCategory::Clear => (1.1, 1.0, 1.0, 0.00, 0.0),
            WeatherCategory::Clouds => (0.85, 0.7, 0.95, 0.08, 0.0),
            WeatherCategory::Fog => (0.75, 0.5, 0.9, 0.12, 0.0),
            WeatherCategory::Rain => (0.65, 0.4, 0.85, 0.15, 1.0),
            WeatherCategory::Thunderstorm => (0.5, 0.25, 0.7, 0.20, 1.0),
            WeatherCategory::Snow => (0.8, 0.6, 1.1, 0.10, 0.0),
        };
        WeatherMultipliers {
            ambient,
            directional,
            cyan,
            cloud_opacity,
            rain,
        }
    }

    pub fn display(self) -> WeatherDisplay {
        let (icon, label) = match self {
            WeatherCategory::Clear => ("\u{2600}\u{FE0F}", "\u{5FEB}\u{6674}"),
            WeatherCategory::Clouds => ("\u{2601}\u{FE0F}", "\u{66C7}\u{308A}"),
            WeatherCategory::Fog => ("\u{1F32B}\u{FE0F}", "\u{9727}"),
            WeatherCategory::Rain => ("\u{1F327}\u{FE0F}", "\u{96E8}"),
            WeatherCategory::Thunderstorm => ("\u{26C8}\u{FE0F}", "\u{96F7}\u{96E8}"),
            WeatherCategory::Snow => ("\u{2744}\u{FE0F}", "\u{96EA}"),
        };
        WeatherDisplay { icon, label }
    }

    /// Short button label for the preview picker.
    pub fn short_label(self) -> &'static str {
        match self {
            WeatherCategory::Clear => "Clear",
            WeatherCategory::Clouds => "Clouds",
            WeatherCategory::Fog => "Fog",
            WeatherCategory::Rain => "Rain",
            WeatherCategory::Thunderstorm => "Storm",
            WeatherCategory::Snow => "Snow",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCategory::Clear => "clear",
            WeatherCategory::Clouds => "clouds",
            WeatherCategory::Fog => "fog",
            WeatherCategory::Rain => "rain",
            WeatherCategory::Thunderstorm => "thunderstorm",
            WeatherCategory::Snow => "snow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Rounded to 4 decimal places (about 11 m), the precision used for
    /// cache keys and for published device locations.
    pub fn rounded(self) -> Self {
        Self {
            lat: (self.lat * 10_000.0).round() / 10_000.0,
            lon: (self.lon * 10_000.0).round() / 10_000.0,
        }
    }

    fn key(self) -> (i64, i64) {
        (
            (self.lat * 10_000.0).round() as i64,
            (self.lon * 10_000.0).round() as i64,
        )
    }

    pub fn same_place(self, other: Coordinate) -> bool {
        self.key() == other.key()
    }
}

/// Weather as seen by the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherSnapshot {
    pub category: WeatherCategory,
    pub multipliers: WeatherMultipliers,
    pub display: WeatherDisplay,
    pub temperature: f32,
    pub wind_speed: f32,
    pub code: i32,
}

impl WeatherSnapshot {
    pub fn from_reading(reading: ForecastReading) -> Self {
        let category = WeatherCategory::from_code(reading.code);
        Self {
            category,
            multipliers: category.multipliers(),
            display: category.display(),
            temperature: reading.temperature,
            wind_speed: reading.wind_speed,
            code: reading.code,
        }
    }

    /// Builds a manual preview for `category`, keeping the live temperature
    /// and wind when available.
    pub fn synthesized(category: WeatherCategory, live: Option<&WeatherSnapshot>) -> Self {
        Self {
            category,
            multipliers: category.multipliers(),
            display: category.display(),
            temperature: live.map(|w| w.temperature).unwrap_or(0.0),
            wind_speed: live.map(|w| w.wind_speed).unwrap_or(5.0),
            code: category.representative_code(),
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    coord: Coordinate,
    stored_at: Duration,
    snapshot: WeatherSnapshot,
}

/// Single-entry weather cache with a freshness window.
pub struct WeatherCache<C: Clock> {
    clock: C,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl<C: Clock> WeatherCache<C> {
    pub fn new(clock: C) -> Self {
        Self::with_ttl(clock, Duration::from_secs(WEATHER_CACHE_TTL_SEC))
    }

    pub fn with_ttl(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entry: None,
        }
    }

    pub fn get(&self, coord: Coordinate) -> Option<&WeatherSnapshot> {
        let entry = self.entry.as_ref()?;
        let age = self.clock.now().saturating_sub(entry.stored_at);
        (entry.coord.same_place(coord) && age < self.ttl).then_some(&entry.snapshot)
    }

    pub fn put(&mut self, coord: Coordinate, snapshot: WeatherSnapshot) {
        self.entry = Some(CacheEntry {
            coord,
            stored_at: self.clock.now(),
            snapshot,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Request for the front end to fetch a forecast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchTicket {
    pub token: u64,
    pub coord: Coordinate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeatherRequest {
    /// Weather is switched off; nothing to do.
    Disabled,
    /// Answered from the cache; the live weather is already updated.
    Cached,
    Fetch(FetchTicket),
}

pub struct WeatherService<C: Clock> {
    cache: WeatherCache<C>,
    enabled: bool,
    override_category: Option<WeatherCategory>,
    live: Option<WeatherSnapshot>,
    latest_token: u64,
    loading: bool,
    error: Option<AdapterError>,
}

impl<C: Clock> WeatherService<C> {
    pub fn new(cache: WeatherCache<C>) -> Self {
        Self {
            cache,
            enabled: false,
            override_category: None,
            live: None,
            latest_token: 0,
            loading: false,
            error: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switching weather on does not fetch by itself; follow with [`Self::request`].
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            // Outstanding responses are no longer wanted.
            self.latest_token += 1;
            self.loading = false;
        }
    }

    pub fn set_override(&mut self, category: Option<WeatherCategory>) {
        self.override_category = category;
    }

    pub fn override_category(&self) -> Option<WeatherCategory> {
        self.override_category
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&AdapterError> {
        self.error.as_ref()
    }

    /// Last applied forecast, ignoring the override.
    pub fn live(&self) -> Option<&WeatherSnapshot> {
        self.live.as_ref()
    }

    /// Asks for weather at `coord`. Every call supersedes earlier tickets,
    /// including when it is answered from the cache.
    pub fn request(&mut self, coord: Coordinate) -> WeatherRequest {
        if !self.enabled {
            return WeatherRequest::Disabled;
        }
        self.latest_token += 1;
        if let Some(hit) = self.cache.get(coord) {
            log::debug!("weather cache hit for {:.4},{:.4}", coord.lat, coord.lon);
            self.live = Some(hit.clone());
            self.error = None;
            self.loading = false;
            return WeatherRequest::Cached;
        }
        self.loading = true;
        self.error = None;
        let ticket = FetchTicket {
            token: self.latest_token,
            coord,
        };
        log::info!(
            "weather fetch #{} for {:.4},{:.4}",
            ticket.token,
            coord.lat,
            coord.lon
        );
        WeatherRequest::Fetch(ticket)
    }

    /// Drops the cache entry and requests again.
    pub fn refetch(&mut self, coord: Coordinate) -> WeatherRequest {
        self.cache.invalidate();
        self.request(coord)
    }

    /// Applies a fetch result. Returns `false` when the ticket was superseded
    /// and the result was discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<ForecastReading, AdapterError>,
    ) -> bool {
        if ticket.token != self.latest_token {
            log::debug!(
                "dropping stale weather response #{} (latest #{})",
                ticket.token,
                self.latest_token
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(reading) => {
                let snapshot = WeatherSnapshot::from_reading(reading);
                log::info!(
                    "weather #{}: {:?} {:.1}C wind {:.1}",
                    ticket.token,
                    snapshot.category,
                    snapshot.temperature,
                    snapshot.wind_speed
                );
                self.cache.put(ticket.coord, snapshot.clone());
                self.live = Some(snapshot);
                self.error = None;
            }
            Err(e) => {
                log::warn!("weather fetch #{} failed: {e}", ticket.token);
                self.error = Some(e);
            }
        }
        true
    }

    /// Weather the scene should use: `None` while disabled or unknown, the
    /// synthesized preview while an override is set, otherwise the live data.
    pub fn effective(&self) -> Option<WeatherSnapshot> {
        if !self.enabled {
            return None;
        }
        match self.override_category {
            Some(category) => Some(WeatherSnapshot::synthesized(category, self.live.as_ref())),
            None => self.live.clone(),
        }
    }

    pub fn cache(&self) -> &WeatherCache<C> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_code_that_maps_back() {
        for c in WeatherCategory::ALL {
            assert_eq!(WeatherCategory::from_code(c.representative_code()), c);
        }
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            WeatherCategory::from_name(" Rain"),
            Some(WeatherCategory::Rain)
        );
        assert_eq!(WeatherCategory::from_name("hail"), None);
    }
}
