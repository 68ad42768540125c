//! Wire contracts for the external data providers (Open-Meteo forecasts and
//! Nominatim reverse geocoding) plus the bounded retry used around them.
//! Transport lives in the front ends; this module only builds URLs and
//! parses bodies.

use crate::error::AdapterError;
use crate::weather::Coordinate;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub const USER_AGENT: &str = "castle-hero/0.1";
pub const GEOCODE_RETRIES: u32 = 1;
pub const GEOCODE_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Current conditions as reported by the forecast provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForecastReading {
    pub code: i32,
    pub temperature: f32,
    pub wind_speed: f32,
}

#[derive(Deserialize)]
struct ForecastBody {
    current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f32,
    windspeed: f32,
    weathercode: f64,
}

pub fn forecast_url(coord: Coordinate) -> String {
    format!(
        "https://api.open-meteo.com/v1/forecast?latitude={}&longitude={}&current_weather=true",
        coord.lat, coord.lon
    )
}

pub fn parse_forecast(body: &str) -> Result<ForecastReading, AdapterError> {
    let parsed: ForecastBody = serde_json::from_str(body)?;
    let cw = parsed
        .current_weather
        .ok_or_else(|| AdapterError::Malformed("missing current_weather".into()))?;
    Ok(ForecastReading {
        code: cw.weathercode.round() as i32,
        temperature: cw.temperature,
        wind_speed: cw.windspeed,
    })
}

#[derive(Deserialize)]
struct ReverseBody {
    address: Option<Address>,
}

#[derive(Deserialize, Default)]
struct Address {
    city: Option<String>,
    city_district: Option<String>,
    municipality: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
}

pub fn reverse_geocode_url(coord: Coordinate) -> String {
    format!(
        "https://nominatim.openstreetmap.org/reverse?lat={}&lon={}&format=json&accept-language=ja&zoom=10",
        coord.lat, coord.lon
    )
}

/// Picks the most specific place name: city, city district, municipality,
/// town, village, county, then state.
pub fn parse_place_name(body: &str) -> Result<String, AdapterError> {
    let parsed: ReverseBody = serde_json::from_str(body)?;
    let addr = parsed.address.unwrap_or_default();
    [
        addr.city,
        addr.city_district,
        addr.municipality,
        addr.town,
        addr.village,
        addr.county,
        addr.state,
    ]
    .into_iter()
    .flatten()
    .find(|name| !name.trim().is_empty())
    .ok_or(AdapterError::NoPlaceName)
}

/// Runs `op`, retrying up to `retries` more times with `delay` between
/// attempts. `sleep` is supplied by the caller so this works on any executor.
pub async fn with_retry<T, Op, OpFut, Sleep, SleepFut>(
    retries: u32,
    delay: Duration,
    mut op: Op,
    mut sleep: Sleep,
) -> Result<T, AdapterError>
where
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T, AdapterError>>,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let mut left = retries;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if left > 0 => {
                log::debug!("retrying after error: {e}");
                left -= 1;
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_body_parses() {
        let body = r#"{"latitude":35.68,"current_weather":{"temperature":18.4,"windspeed":7.2,"winddirection":90,"weathercode":61,"time":"2024-05-01T12:00"}}"#;
        let r = parse_forecast(body).unwrap();
        assert_eq!(r.code, 61);
        assert!((r.temperature - 18.4).abs() < 1e-4);
        assert!((r.wind_speed - 7.2).abs() < 1e-4);
    }

    #[test]
    fn forecast_without_current_block_is_malformed() {
        assert!(matches!(
            parse_forecast(r#"{"latitude":1.0}"#),
            Err(AdapterError::Malformed(_))
        ));
    }

    #[test]
    fn place_name_prefers_city_then_district() {
        let body = r#"{"address":{"city_district":"Shibuya","state":"Tokyo"}}"#;
        assert_eq!(parse_place_name(body).unwrap(), "Shibuya");
        let body = r#"{"address":{"city":"Osaka","town":"x"}}"#;
        assert_eq!(parse_place_name(body).unwrap(), "Osaka");
    }

    #[test]
    fn missing_address_is_no_place_name() {
        assert_eq!(
            parse_place_name(r#"{"error":"Unable to geocode"}"#),
            Err(AdapterError::NoPlaceName)
        );
    }
}
