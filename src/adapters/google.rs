//! Google Maps web services: geocoding, directions and time zone.
//!
//! All three endpoints answer HTTP 200 with a `status` field in the body, so
//! both the HTTP status and the body status are checked.

use crate::config::AppConfig;
use crate::domain::model::{Coordinate, Place, RouteLeg};
use crate::domain::ports::{Directions, DirectionsProvider, Geocoder, TimeZoneProvider};
use crate::utils::error::ResolutionError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

type ResolveResult<T> = std::result::Result<T, ResolutionError>;

#[derive(Debug, Clone)]
pub struct GoogleMaps {
    client: Client,
    maps_api_key: String,
    time_zone_api_key: String,
    geocode_url: String,
    directions_url: String,
    time_zone_url: String,
}

impl GoogleMaps {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            maps_api_key: config.maps_api_key().to_string(),
            time_zone_api_key: config.time_zone_api_key().to_string(),
            geocode_url: config.geocode_url().to_string(),
            directions_url: config.directions_url().to_string(),
            time_zone_url: config.time_zone_url().to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ResolveResult<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        tracing::debug!("API response status: {}", response.status());
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolutionError::ProviderRejected {
                status: status.to_string(),
                message: body,
            });
        }

        let body = response.bytes().await.map_err(|e| e.without_url())?;
        serde_json::from_slice(&body).map_err(|e| ResolutionError::ProviderRejected {
            status: "INVALID_RESPONSE".to_string(),
            message: e.to_string(),
        })
    }
}

fn rejected(status: String, message: Option<String>) -> ResolutionError {
    ResolutionError::ProviderRejected {
        status,
        message: message.unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(p: LatLng) -> Self {
        Coordinate::new(p.lat, p.lng)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[async_trait]
impl Geocoder for GoogleMaps {
    async fn geocode(&self, address: &str) -> ResolveResult<Place> {
        let response: GeocodeResponse = self
            .get_json(
                &self.geocode_url,
                &[
                    ("address", address.to_string()),
                    ("key", self.maps_api_key.clone()),
                ],
            )
            .await?;

        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            _ => return Err(rejected(response.status, response.error_message)),
        }

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::AddressNotFound {
                address: address.to_string(),
            })?;

        tracing::info!("Resolved '{}' to {}", address, first.formatted_address);
        Ok(Place {
            address: first.formatted_address,
            coordinate: first.geometry.location.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RouteDto>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    summary: Option<String>,
    #[serde(default)]
    legs: Vec<LegDto>,
}

#[derive(Debug, Deserialize)]
struct LegDto {
    duration: ValueDto,
    start_location: LatLng,
    end_location: LatLng,
    #[serde(default)]
    steps: Vec<StepDto>,
}

#[derive(Debug, Deserialize)]
struct StepDto {
    duration: ValueDto,
    start_location: LatLng,
    end_location: LatLng,
    html_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueDto {
    value: i64,
}

fn strip_html(html: &str, tags: &Regex) -> String {
    tags.replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn seconds(value: &ValueDto) -> ResolveResult<Duration> {
    Duration::try_seconds(value.value).ok_or_else(|| ResolutionError::ProviderRejected {
        status: "INVALID_RESPONSE".to_string(),
        message: format!("duration of {} seconds is out of range", value.value),
    })
}

/// Flattens a route into its steps. A leg without steps becomes one leg.
fn route_legs(route: RouteDto) -> ResolveResult<Vec<RouteLeg>> {
    let tags = Regex::new(r"<[^>]*>").ok();
    let mut legs = Vec::new();

    for leg in route.legs {
        if leg.steps.is_empty() {
            legs.push(RouteLeg {
                start_point: leg.start_location.into(),
                end_point: leg.end_location.into(),
                duration: seconds(&leg.duration)?,
                instruction: None,
            });
            continue;
        }
        for step in leg.steps {
            let instruction = match (&tags, step.html_instructions) {
                (Some(tags), Some(html)) => Some(strip_html(&html, tags)),
                (None, html) => html,
                (_, None) => None,
            };
            legs.push(RouteLeg {
                start_point: step.start_location.into(),
                end_point: step.end_location.into(),
                duration: seconds(&step.duration)?,
                instruction,
            });
        }
    }
    Ok(legs)
}

#[async_trait]
impl DirectionsProvider for GoogleMaps {
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        departure: Option<DateTime<Utc>>,
    ) -> ResolveResult<Directions> {
        let departure_time = departure
            .map(|t| t.timestamp().to_string())
            .unwrap_or_else(|| "now".to_string());

        let response: DirectionsResponse = self
            .get_json(
                &self.directions_url,
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_string()),
                    ("departure_time", departure_time),
                    ("key", self.maps_api_key.clone()),
                ],
            )
            .await?;

        let no_route = || ResolutionError::NoRoute {
            origin: origin.to_string(),
            destination: destination.to_string(),
        };

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => return Err(no_route()),
            _ => return Err(rejected(response.status, response.error_message)),
        }

        // first route only; alternatives are never requested
        let route = response.routes.into_iter().next().ok_or_else(no_route)?;
        let summary = route.summary.clone().filter(|s| !s.is_empty());
        let legs = route_legs(route)?;
        if legs.is_empty() {
            return Err(no_route());
        }

        tracing::debug!("Directions returned {} legs", legs.len());
        Ok(Directions { summary, legs })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeZoneResponse {
    status: String,
    #[serde(default)]
    raw_offset: i32,
    #[serde(default)]
    dst_offset: i32,
    time_zone_id: Option<String>,
    error_message: Option<String>,
}

#[async_trait]
impl TimeZoneProvider for GoogleMaps {
    async fn offset_at(
        &self,
        location: Coordinate,
        at: DateTime<Utc>,
    ) -> ResolveResult<FixedOffset> {
        let response: TimeZoneResponse = self
            .get_json(
                &self.time_zone_url,
                &[
                    ("location", location.to_string()),
                    ("timestamp", at.timestamp().to_string()),
                    ("key", self.time_zone_api_key.clone()),
                ],
            )
            .await?;

        if response.status != "OK" {
            return Err(rejected(response.status, response.error_message));
        }

        let seconds = response.raw_offset + response.dst_offset;
        tracing::debug!(
            "Time zone at {}: {} ({}s)",
            location,
            response.time_zone_id.as_deref().unwrap_or("unknown"),
            seconds
        );
        FixedOffset::east_opt(seconds).ok_or_else(|| ResolutionError::ProviderRejected {
            status: "INVALID_OFFSET".to_string(),
            message: format!("offset of {} seconds is out of range", seconds),
        })
    }
}
