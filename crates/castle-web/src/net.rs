//! Browser I/O for the adapters: forecast and geocoding over `fetch`,
//! device geolocation and a `setTimeout` sleep. Results are mapped onto
//! [`AdapterError`] and handed back to the core state machines.

use castle_core::error::AdapterError;
use castle_core::sources::{self, ForecastReading, GEOCODE_RETRIES, GEOCODE_RETRY_DELAY};
use castle_core::Coordinate;
use gloo_net::http::Request;
use js_sys::{Promise, Reflect};
use std::time::Duration;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn get_text(url: &str) -> Result<String, AdapterError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| AdapterError::Transport(e.to_string()))?;
    if !resp.ok() {
        return Err(AdapterError::Status(resp.status()));
    }
    resp.text()
        .await
        .map_err(|e| AdapterError::Transport(e.to_string()))
}

pub async fn fetch_forecast(coord: Coordinate) -> Result<ForecastReading, AdapterError> {
    let body = get_text(&sources::forecast_url(coord)).await?;
    sources::parse_forecast(&body)
}

/// Place name for `coord`, with one delayed retry.
pub async fn reverse_geocode(coord: Coordinate) -> Result<String, AdapterError> {
    let url = sources::reverse_geocode_url(coord);
    sources::with_retry(
        GEOCODE_RETRIES,
        GEOCODE_RETRY_DELAY,
        || {
            let url = url.clone();
            async move { sources::parse_place_name(&get_text(&url).await?) }
        },
        sleep,
    )
    .await
}

pub async fn sleep(d: Duration) {
    let Some(w) = web::window() else { return };
    let ms = d.as_millis().min(i32::MAX as u128) as i32;
    let promise = Promise::new(&mut |resolve, _reject| {
        if let Err(e) = w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms) {
            log::warn!("setTimeout failed: {e:?}");
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// One-shot device position as `(lat, lon)`. The deadline is enforced by
/// the location controller, not here.
pub async fn current_position() -> Result<(f64, f64), AdapterError> {
    let geo = web::window()
        .ok_or(AdapterError::Unavailable)?
        .navigator()
        .geolocation()
        .map_err(|_| AdapterError::Unavailable)?;
    let mut started = Ok(());
    let promise = Promise::new(&mut |resolve, reject| {
        started = geo.get_current_position_with_error_callback(&resolve, Some(&reject));
    });
    if started.is_err() {
        return Err(AdapterError::Unavailable);
    }
    let pos = JsFuture::from(promise).await.map_err(|err| {
        let code = Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|c| c.as_f64());
        crate::input::geolocation_error(code)
    })?;
    let coords = Reflect::get(&pos, &JsValue::from_str("coords"))
        .map_err(|_| AdapterError::Unavailable)?;
    let read = |key: &str| {
        Reflect::get(&coords, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_f64())
            .ok_or(AdapterError::Unavailable)
    };
    Ok((read("latitude")?, read("longitude")?))
}

