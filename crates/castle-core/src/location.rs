//! Which place the weather is fetched for.
//!
//! The default location is Tokyo. A device fix is published immediately with
//! a placeholder name, then renamed once reverse geocoding answers. Only
//! successfully named, non-default locations are persisted.

use crate::error::AdapterError;
use crate::weather::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const STORAGE_KEY: &str = "sp-weather-location";
pub const DEFAULT_NAME: &str = "Tokyo";
pub const DEFAULT_COORD: Coordinate = Coordinate::new(35.6762, 139.6503);
pub const PLACEHOLDER_NAME: &str = "...";
pub const FALLBACK_NAME: &str = "My Location";
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl Location {
    pub fn default_location() -> Self {
        Self {
            lat: DEFAULT_COORD.lat,
            lon: DEFAULT_COORD.lon,
            name: DEFAULT_NAME.to_string(),
        }
    }

    pub fn coord(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn is_default(&self) -> bool {
        self.coord().same_place(DEFAULT_COORD) && self.name == DEFAULT_NAME
    }
}

/// Key/value persistence for the last resolved location.
pub trait LocationStore {
    fn read(&self) -> Result<Option<String>, AdapterError>;
    fn write(&mut self, value: &str) -> Result<(), AdapterError>;
    fn remove(&mut self) -> Result<(), AdapterError>;
}

/// In-memory store, used by tests and as a no-persistence fallback.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub value: Option<String>,
}

impl LocationStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, AdapterError> {
        Ok(self.value.clone())
    }

    fn write(&mut self, value: &str) -> Result<(), AdapterError> {
        self.value = Some(value.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), AdapterError> {
        self.value = None;
        Ok(())
    }
}

/// Parses a stored record; anything unreadable or naming the default is ignored.
pub fn decode_stored(raw: &str) -> Option<Location> {
    let loc: Location = serde_json::from_str(raw).ok()?;
    (loc.name != DEFAULT_NAME && loc.lat.is_finite() && loc.lon.is_finite()).then_some(loc)
}

/// Handle for one geolocation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeoTicket {
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum GeoState {
    Idle,
    AwaitingFix { ticket: GeoTicket, deadline: Duration },
    Resolving { ticket: GeoTicket, coord: Coordinate },
}

pub struct LocationController<S: LocationStore> {
    store: S,
    current: Location,
    state: GeoState,
    generation: u64,
}

impl<S: LocationStore> LocationController<S> {
    /// Starts from the persisted location when one is stored.
    pub fn new(store: S) -> Self {
        let current = match store.read() {
            Ok(Some(raw)) => decode_stored(&raw),
            Ok(None) => None,
            Err(e) => {
                log::warn!("could not read stored location: {e}");
                None
            }
        }
        .unwrap_or_else(Location::default_location);
        log::info!("location: {} ({:.4},{:.4})", current.name, current.lat, current.lon);
        Self {
            store,
            current,
            state: GeoState::Idle,
            generation: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    pub fn is_geolocating(&self) -> bool {
        self.state != GeoState::Idle
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switches to the default location, forgets the stored one and
    /// abandons any geolocation in flight.
    pub fn select_default(&mut self) -> Coordinate {
        self.generation += 1;
        self.state = GeoState::Idle;
        self.current = Location::default_location();
        if let Err(e) = self.store.remove() {
            log::warn!("could not clear stored location: {e}");
        }
        self.current.coord()
    }

    /// Starts a device geolocation attempt. Returns `None` while one is
    /// already in flight.
    pub fn begin_geolocation(&mut self, now: Duration) -> Option<GeoTicket> {
        if self.is_geolocating() {
            log::debug!("geolocation already in flight");
            return None;
        }
        self.generation += 1;
        let ticket = GeoTicket {
            generation: self.generation,
        };
        self.state = GeoState::AwaitingFix {
            ticket,
            deadline: now + GEOLOCATION_TIMEOUT,
        };
        Some(ticket)
    }

    /// Publishes a device fix under the placeholder name. Returns the
    /// rounded coordinate to reverse-geocode and fetch weather for.
    pub fn fix_acquired(&mut self, ticket: GeoTicket, lat: f64, lon: f64) -> Option<Coordinate> {
        match self.state {
            GeoState::AwaitingFix { ticket: t, .. } if t == ticket => {}
            _ => return None,
        }
        let coord = Coordinate::new(lat, lon).rounded();
        self.current = Location {
            lat: coord.lat,
            lon: coord.lon,
            name: PLACEHOLDER_NAME.to_string(),
        };
        self.state = GeoState::Resolving { ticket, coord };
        Some(coord)
    }

    /// Denial, timeout or missing capability: fall back to the default location.
    /// Returns `true` when the failure applied to the attempt in flight.
    pub fn fix_failed(&mut self, ticket: GeoTicket, error: AdapterError) -> bool {
        match self.state {
            GeoState::AwaitingFix { ticket: t, .. } if t == ticket => {}
            _ => return false,
        }
        log::warn!("geolocation failed: {error}; using {DEFAULT_NAME}");
        self.state = GeoState::Idle;
        self.current = Location::default_location();
        true
    }

    /// Fails an attempt that has waited past its deadline.
    pub fn poll_timeout(&mut self, now: Duration) -> bool {
        match self.state {
            GeoState::AwaitingFix { ticket, deadline } if now >= deadline => {
                self.fix_failed(ticket, AdapterError::Timeout)
            }
            _ => false,
        }
    }

    /// Applies the reverse-geocoding outcome. The name replaces the
    /// placeholder only while the coordinate is still current; a failed
    /// lookup uses the generic fallback label and is not persisted.
    pub fn name_resolved(
        &mut self,
        ticket: GeoTicket,
        result: Result<String, AdapterError>,
    ) -> bool {
        let coord = match self.state {
            GeoState::Resolving { ticket: t, coord } if t == ticket => coord,
            _ => return false,
        };
        self.state = GeoState::Idle;
        if !self.current.coord().same_place(coord) {
            return false;
        }
        match result {
            Ok(name) => {
                self.current.name = name;
                match serde_json::to_string(&self.current) {
                    Ok(raw) => {
                        if let Err(e) = self.store.write(&raw) {
                            log::warn!("could not persist location: {e}");
                        }
                    }
                    Err(e) => log::warn!("could not encode location: {e}"),
                }
            }
            Err(e) => {
                log::warn!("reverse geocoding failed: {e}");
                self.current.name = FALLBACK_NAME.to_string();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_default_is_ignored() {
        let raw = r#"{"lat":35.6762,"lon":139.6503,"name":"Tokyo"}"#;
        assert!(decode_stored(raw).is_none());
        assert!(decode_stored("not json").is_none());
    }

    #[test]
    fn stored_location_is_loaded() {
        let store = MemoryStore {
            value: Some(r#"{"lat":34.6937,"lon":135.5023,"name":"Osaka"}"#.into()),
        };
        let ctl = LocationController::new(store);
        assert_eq!(ctl.current().name, "Osaka");
    }
}
