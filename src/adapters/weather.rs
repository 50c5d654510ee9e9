use crate::config::AppConfig;
use crate::domain::model::{Conditions, Coordinate};
use crate::domain::ports::WeatherProvider;
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

/// Client for a Dark Sky compatible forecast API
/// (`{base_url}/{key}/{lat},{lng},{unix_time}`).
#[derive(Debug, Clone)]
pub struct DarkSkyWeather {
    client: Client,
    api_key: String,
    base_url: String,
    units: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    currently: Option<serde_json::Value>,
}

impl DarkSkyWeather {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            api_key: config.weather_api_key().to_string(),
            base_url: config.weather_url().trim_end_matches('/').to_string(),
            units: config.units().to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for DarkSkyWeather {
    async fn forecast(&self, location: Coordinate, at: DateTime<Utc>) -> Result<Conditions> {
        let url = format!(
            "{}/{}/{},{},{}",
            self.base_url,
            self.api_key,
            location.latitude,
            location.longitude,
            at.timestamp()
        );

        tracing::debug!("Requesting forecast for {} at {}", location, at);
        // the key is part of the path, keep it out of error messages
        let response = self
            .client
            .get(&url)
            .query(&[
                ("units", self.units.as_str()),
                ("exclude", "minutely,hourly,daily,alerts,flags"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.without_url())?;

        let body: ForecastResponse = response.json().await.map_err(|e| e.without_url())?;
        body.currently
            .map(Conditions)
            .ok_or_else(|| ForecastError::ValidationError {
                message: format!("forecast for {} has no 'currently' block", location),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn weather_for(server: &MockServer) -> DarkSkyWeather {
        let config = AppConfig::from_toml_str(&format!(
            r#"
[weather]
api_key = "weather-key"
base_url = "{}/"
units = "si"
"#,
            server.url("/forecast")
        ))
        .unwrap();
        DarkSkyWeather::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_forecast_requests_time_machine_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/forecast/weather-key/41.5,-87.25,1704099600")
                .query_param("units", "si");
            then.status(200).json_body(json!({
                "latitude": 41.5,
                "longitude": -87.25,
                "currently": {"time": 1704099600, "summary": "Snow", "temperature": -3.5}
            }));
        });

        let at = DateTime::from_timestamp(1_704_099_600, 0).unwrap();
        let conditions = weather_for(&server)
            .forecast(Coordinate::new(41.5, -87.25), at)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(conditions.summary(), Some("Snow"));
        assert_eq!(conditions.temperature(), Some(-3.5));
    }

    #[tokio::test]
    async fn test_forecast_http_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("/forecast/");
            then.status(403).body("Forbidden");
        });

        let result = weather_for(&server)
            .forecast(Coordinate::new(1.0, 2.0), Utc::now())
            .await;
        assert!(matches!(result, Err(ForecastError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_forecast_without_currently_block_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("/forecast/");
            then.status(200).json_body(json!({"latitude": 1.0, "longitude": 2.0}));
        });

        let result = weather_for(&server)
            .forecast(Coordinate::new(1.0, 2.0), Utc::now())
            .await;
        assert!(matches!(result, Err(ForecastError::ValidationError { .. })));
    }
}
