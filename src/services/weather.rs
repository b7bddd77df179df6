use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CURRENT_FIELDS: &str = "temperature_2m,rain,weather_code";

/// Shown instead of the weather line when the lookup fails.
pub const WEATHER_UNAVAILABLE: &str = "No se pudo cargar el clima actual";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("forecast API returned {status}")]
    Server { status: u16 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CurrentWeather {
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i32>,
}

impl CurrentWeather {
    pub fn is_raining(&self) -> bool {
        self.rain.unwrap_or(0.0) > 0.0
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentWeather>,
}

/// One-line summary for the home screen, e.g. `🌦️ 29.1°C · lluvia 0.4 mm`.
pub fn weather_text(current: Option<&CurrentWeather>) -> String {
    let temperature = current
        .and_then(|c| c.temperature_2m)
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--".to_string());
    let rain = current.and_then(|c| c.rain).unwrap_or(0.0);
    format!("🌦️ {temperature}°C · lluvia {rain} mm")
}

/// Client for the Open-Meteo current-conditions endpoint.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions at a point. `Ok(None)` when the body has no
    /// `current` block.
    pub async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<CurrentWeather>, WeatherError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "weather lookup failed");
            return Err(WeatherError::Server {
                status: status.as_u16(),
            });
        }

        let body: ForecastResponse = resp.json().await?;
        tracing::debug!(latitude, longitude, current = ?body.current, "weather fetched");
        Ok(body.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/forecast")
    }

    #[tokio::test]
    async fn test_fetch_current_sends_expected_query() {
        let app = Router::new().route(
            "/v1/forecast",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("latitude").map(String::as_str), Some("18.4861"));
                assert_eq!(params.get("longitude").map(String::as_str), Some("-69.9312"));
                assert_eq!(
                    params.get("current").map(String::as_str),
                    Some("temperature_2m,rain,weather_code")
                );
                Json(serde_json::json!({
                    "current": { "temperature_2m": 29.5, "rain": 1.2, "weather_code": 61 }
                }))
            }),
        );
        let url = serve(app).await;

        let client = WeatherClient::new(&url, Duration::from_secs(5)).unwrap();
        let current = client.fetch_current(18.4861, -69.9312).await.unwrap().unwrap();
        assert_eq!(current.temperature_2m, Some(29.5));
        assert_eq!(current.weather_code, Some(61));
        assert!(current.is_raining());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let app = Router::new().route(
            "/v1/forecast",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let url = serve(app).await;

        let client = WeatherClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.fetch_current(18.0, -70.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Server { status: 503 }));
    }

    #[tokio::test]
    async fn test_missing_current_block() {
        let app = Router::new().route(
            "/v1/forecast",
            get(|| async { Json(serde_json::json!({ "latitude": 18.0 })) }),
        );
        let url = serve(app).await;

        let client = WeatherClient::new(&url, Duration::from_secs(5)).unwrap();
        assert!(client.fetch_current(18.0, -70.0).await.unwrap().is_none());
    }

    #[test]
    fn test_weather_text() {
        let current = CurrentWeather {
            temperature_2m: Some(27.3),
            rain: Some(0.0),
            weather_code: Some(3),
        };
        assert_eq!(weather_text(Some(&current)), "🌦️ 27.3°C · lluvia 0 mm");
        assert!(!current.is_raining());
        assert_eq!(weather_text(None), "🌦️ --°C · lluvia 0 mm");
    }
}
