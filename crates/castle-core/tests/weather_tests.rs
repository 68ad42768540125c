use castle_core::sources::ForecastReading;
use castle_core::weather::WeatherMultipliers;
use castle_core::{
    AdapterError, Coordinate, ManualClock, WeatherCache, WeatherCategory, WeatherRequest,
    WeatherService,
};
use std::time::Duration;

const TOKYO: Coordinate = Coordinate::new(35.6762, 139.6503);
const OSAKA: Coordinate = Coordinate::new(34.6937, 135.5023);

fn service() -> (ManualClock, WeatherService<ManualClock>) {
    let clock = ManualClock::new();
    let mut svc = WeatherService::new(WeatherCache::new(clock.clone()));
    svc.set_enabled(true);
    (clock, svc)
}

fn reading(code: i32) -> ForecastReading {
    ForecastReading {
        code,
        temperature: 21.0,
        wind_speed: 12.0,
    }
}

fn ticket(req: WeatherRequest) -> castle_core::FetchTicket {
    match req {
        WeatherRequest::Fetch(t) => t,
        other => panic!("expected a fetch, got {other:?}"),
    }
}

#[test]
fn code_mapping() {
    use WeatherCategory::*;
    let cases = [
        (0, Clear),
        (1, Clear),
        (3, Clouds),
        (45, Fog),
        (48, Fog),
        (51, Rain),
        (61, Rain),
        (67, Rain),
        (71, Snow),
        (77, Snow),
        (81, Rain),
        (86, Snow),
        (95, Thunderstorm),
        (99, Thunderstorm),
        (4, Clear),
        (-1, Clear),
    ];
    for (code, cat) in cases {
        assert_eq!(WeatherCategory::from_code(code), cat, "code {code}");
    }
}

#[test]
fn disabled_service_does_not_fetch() {
    let clock = ManualClock::new();
    let mut svc = WeatherService::new(WeatherCache::new(clock));
    assert_eq!(svc.request(TOKYO), WeatherRequest::Disabled);
    assert!(svc.effective().is_none());
}

#[test]
fn cache_hit_within_ttl() {
    let (clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    assert!(svc.complete(t, Ok(reading(61))));
    clock.advance(Duration::from_secs(29 * 60));
    assert_eq!(svc.request(Coordinate::new(35.67621, 139.65031)), WeatherRequest::Cached);
    assert_eq!(svc.live().map(|w| w.category), Some(WeatherCategory::Rain));
}

#[test]
fn cache_expires_after_ttl() {
    let (clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.complete(t, Ok(reading(0)));
    clock.advance(Duration::from_secs(30 * 60));
    assert!(matches!(svc.request(TOKYO), WeatherRequest::Fetch(_)));
}

#[test]
fn different_place_misses_cache() {
    let (_clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.complete(t, Ok(reading(0)));
    assert!(matches!(svc.request(OSAKA), WeatherRequest::Fetch(_)));
}

#[test]
fn refetch_bypasses_cache() {
    let (_clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.complete(t, Ok(reading(0)));
    assert!(matches!(svc.refetch(TOKYO), WeatherRequest::Fetch(_)));
}

#[test]
fn stale_response_is_discarded() {
    let (_clock, mut svc) = service();
    let a = ticket(svc.request(TOKYO));
    let b = ticket(svc.request(OSAKA));
    assert!(svc.complete(b, Ok(reading(71))));
    assert!(!svc.complete(a, Ok(reading(95))));
    let w = svc.effective().unwrap();
    assert_eq!(w.category, WeatherCategory::Snow);
    // the stale result must not be cached either
    assert!(svc.cache().get(TOKYO).is_none());
}

#[test]
fn failure_keeps_previous_weather() {
    let (_clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.complete(t, Ok(reading(3)));
    let t = ticket(svc.refetch(TOKYO));
    assert!(svc.is_loading());
    svc.complete(t, Err(AdapterError::Status(503)));
    assert!(!svc.is_loading());
    assert_eq!(svc.error(), Some(&AdapterError::Status(503)));
    assert_eq!(svc.effective().map(|w| w.category), Some(WeatherCategory::Clouds));
}

#[test]
fn override_synthesizes_without_fetching() {
    let (_clock, mut svc) = service();
    svc.set_override(Some(WeatherCategory::Rain));
    let w = svc.effective().unwrap();
    assert_eq!(w.category, WeatherCategory::Rain);
    assert_eq!(w.code, 61);
    assert_eq!(w.temperature, 0.0);
    assert_eq!(w.wind_speed, 5.0);
    assert_eq!(w.multipliers, WeatherCategory::Rain.multipliers());
}

#[test]
fn override_keeps_live_readings() {
    let (_clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.complete(t, Ok(reading(0)));
    svc.set_override(Some(WeatherCategory::Fog));
    let w = svc.effective().unwrap();
    assert_eq!(w.category, WeatherCategory::Fog);
    assert_eq!(w.temperature, 21.0);
    assert_eq!(w.wind_speed, 12.0);
}

#[test]
fn disabling_drops_in_flight_fetch() {
    let (_clock, mut svc) = service();
    let t = ticket(svc.request(TOKYO));
    svc.set_enabled(false);
    assert!(!svc.complete(t, Ok(reading(0))));
    assert!(svc.effective().is_none());
}

#[test]
fn rain_multipliers_drive_rain() {
    assert_ne!(WeatherCategory::Rain.multipliers(), WeatherMultipliers::NEUTRAL);
    assert!(WeatherCategory::Rain.multipliers().rain > 0.0);
}
