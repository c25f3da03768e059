//! Weather proxy with a small in-memory cache.
//!
//! Fronts the Open-Meteo forecast API and reshapes its response into an
//! OpenWeatherMap-like structure the blog widget already understands.
//! Responses are cached per (lat, lon, units) for a short TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub units: Option<String>,
}

#[derive(Clone)]
pub struct WeatherService {
    client: Client,
    base_url: String,
    cache: Arc<Mutex<HashMap<String, (Instant, Value)>>>,
    ttl: Duration,
}

impl WeatherService {
    pub fn new(ttl: Duration) -> Self {
        Self::with_base_url("https://api.open-meteo.com", ttl)
    }

    pub fn with_base_url(base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
            cache: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn handle(&self, query: WeatherQuery) -> Response {
        let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "lat and lon query parameters are required (e.g. /api/weather?lat=38.9&lon=-77.0)."
                })),
            )
                .into_response();
        };

        let units = query.units.unwrap_or_else(|| "imperial".to_string()).to_lowercase();
        if units != "imperial" && units != "metric" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "units must be 'imperial' or 'metric'." })),
            )
                .into_response();
        }

        let cache_key = format!("weather:{lat}:{lon}:{units}");
        if let Some(cached) = self.cache_get(&cache_key) {
            return Json(cached).into_response();
        }

        let upstream = match self.fetch(lat, lon, &units).await {
            Ok(data) => data,
            Err(e) => {
                warn!("upstream weather request failed: {e}");
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Upstream weather API error", "detail": e.to_string() })),
                )
                    .into_response();
            }
        };

        let transformed = transform(lat, lon, &upstream);
        self.cache_put(cache_key, transformed.clone());
        Json(transformed).into_response()
    }

    fn cache_get(&self, key: &str) -> Option<Value> {
        let cache = self.cache.lock();
        cache
            .get(key)
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    /// Insert sweeps expired entries first; coordinates are
    /// client-chosen, so the map must not grow with every distinct
    /// (lat, lon, units) seen over the process lifetime.
    fn cache_put(&self, key: String, value: Value) {
        let mut cache = self.cache.lock();
        cache.retain(|_, (at, _)| at.elapsed() < self.ttl);
        cache.insert(key, (Instant::now(), value));
    }

    async fn fetch(&self, lat: f64, lon: f64, units: &str) -> Result<Value, reqwest::Error> {
        let temperature_unit = if units == "imperial" { "fahrenheit" } else { "celsius" };
        let windspeed_unit = if units == "imperial" { "mph" } else { "kmh" };
        let url = format!(
            "{}/v1/forecast?latitude={lat}&longitude={lon}\
             &current=temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m\
             &temperature_unit={temperature_unit}&wind_speed_unit={windspeed_unit}&timezone=auto",
            self.base_url
        );
        let resp = self.client.get(&url).send().await?;
        resp.error_for_status()?.json().await
    }
}

/// Reshape an Open-Meteo payload into the widget's expected structure.
fn transform(lat: f64, lon: f64, upstream: &Value) -> Value {
    let current = &upstream["current"];
    let code = current["weather_code"].as_i64().unwrap_or(-1) as i32;
    let (main, description) = describe_weather_code(code);

    json!({
        "coord": { "lat": lat, "lon": lon },
        "weather": [{
            "id": code,
            "main": main,
            "description": description,
            "icon": weather_icon(code),
        }],
        "main": {
            "temp": current["temperature_2m"],
            "feels_like": current["apparent_temperature"],
            "humidity": current["relative_humidity_2m"],
        },
        "wind": { "speed": current["wind_speed_10m"] },
        // Open-Meteo carries no place name; the client reverse-geocodes.
        "name": "Location",
    })
}

/// WMO weather interpretation codes.
fn describe_weather_code(code: i32) -> (&'static str, &'static str) {
    match code {
        0 => ("Clear", "Clear sky"),
        1..=3 => ("Clouds", "Partly cloudy"),
        45 | 48 => ("Fog", "Foggy"),
        51 | 53 | 55 => ("Drizzle", "Light drizzle"),
        56 | 57 => ("Drizzle", "Freezing drizzle"),
        61 | 63 | 65 => ("Rain", "Rain"),
        66 | 67 => ("Rain", "Freezing rain"),
        71 | 73 | 75 => ("Snow", "Snow"),
        77 => ("Snow", "Snow grains"),
        80..=82 => ("Rain", "Rain showers"),
        85 | 86 => ("Snow", "Snow showers"),
        95 => ("Thunderstorm", "Thunderstorm"),
        96 | 99 => ("Thunderstorm", "Thunderstorm with hail"),
        _ => ("Unknown", "Unknown conditions"),
    }
}

fn weather_icon(code: i32) -> &'static str {
    match code {
        0 => "01d",
        1 | 2 => "02d",
        3 => "03d",
        45 | 48 => "50d",
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80..=82 => "10d",
        71 | 73 | 75 | 77 | 85 | 86 => "13d",
        95 | 96 | 99 => "11d",
        _ => "01d",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_wmo_codes() {
        assert_eq!(describe_weather_code(0), ("Clear", "Clear sky"));
        assert_eq!(describe_weather_code(2), ("Clouds", "Partly cloudy"));
        assert_eq!(describe_weather_code(95), ("Thunderstorm", "Thunderstorm"));
        assert_eq!(describe_weather_code(1234), ("Unknown", "Unknown conditions"));

        assert_eq!(weather_icon(0), "01d");
        assert_eq!(weather_icon(81), "10d");
        assert_eq!(weather_icon(1234), "01d");
    }

    #[test]
    fn expired_entries_are_swept_on_insert() {
        // Zero TTL: everything already cached is expired by the time the
        // next insert runs.
        let svc = WeatherService::new(Duration::ZERO);
        svc.cache_put("weather:1:1:imperial".to_string(), json!({"a": 1}));
        svc.cache_put("weather:2:2:imperial".to_string(), json!({"b": 2}));

        assert_eq!(svc.cache.lock().len(), 1);
        assert!(svc.cache_get("weather:1:1:imperial").is_none());
        assert!(svc.cache_get("weather:2:2:imperial").is_none());
    }

    #[test]
    fn live_entries_survive_the_sweep_and_serve_hits() {
        let svc = WeatherService::new(Duration::from_secs(60));
        svc.cache_put("weather:1:1:imperial".to_string(), json!({"a": 1}));
        svc.cache_put("weather:2:2:metric".to_string(), json!({"b": 2}));

        assert_eq!(svc.cache.lock().len(), 2);
        assert_eq!(svc.cache_get("weather:1:1:imperial"), Some(json!({"a": 1})));
    }

    #[test]
    fn transform_keeps_current_readings() {
        let upstream = json!({
            "current": {
                "weather_code": 61,
                "temperature_2m": 54.3,
                "apparent_temperature": 51.0,
                "relative_humidity_2m": 88,
                "wind_speed_10m": 12.5,
            }
        });
        let out = transform(38.9, -77.0, &upstream);
        assert_eq!(out["weather"][0]["main"], "Rain");
        assert_eq!(out["main"]["temp"], 54.3);
        assert_eq!(out["main"]["humidity"], 88);
        assert_eq!(out["wind"]["speed"], 12.5);
        assert_eq!(out["coord"]["lat"], 38.9);
    }
}
