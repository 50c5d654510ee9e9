use crate::utils::error::ForecastUnavailable;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// `lat,lng`, the form the Google APIs take as a location parameter.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub address: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub start_point: Coordinate,
    pub end_point: Coordinate,
    #[serde(with = "duration_seconds")]
    pub duration: Duration,
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub origin: Place,
    pub destination: Place,
    pub departure: DateTime<Utc>,
    /// Offset of the origin's local time, when the time zone was looked up.
    #[serde(rename = "origin_utc_offset_seconds", serialize_with = "offset_seconds")]
    pub origin_offset: Option<FixedOffset>,
    pub summary: Option<String>,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    /// Sum of the leg durations, `None` if it does not fit in a `Duration`.
    pub fn total_duration(&self) -> Option<Duration> {
        self.legs
            .iter()
            .try_fold(Duration::zero(), |acc, leg| acc.checked_add(&leg.duration))
    }

    pub fn arrival(&self) -> Option<DateTime<Utc>> {
        self.departure.checked_add_signed(self.total_duration()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub location: Coordinate,
    pub estimated_arrival: DateTime<Utc>,
}

/// The provider's `currently` block, kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(pub serde_json::Value);

impl Conditions {
    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(|v| v.as_str())
    }

    pub fn temperature(&self) -> Option<f64> {
        self.0.get("temperature").and_then(|v| v.as_f64())
    }

    pub fn precip_probability(&self) -> Option<f64> {
        self.0.get("precipProbability").and_then(|v| v.as_f64())
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.0.get("windSpeed").and_then(|v| v.as_f64())
    }
}

#[derive(Debug, Clone)]
pub struct ForecastSample {
    pub waypoint: Waypoint,
    pub forecast: Result<Conditions, ForecastUnavailable>,
}

impl ForecastSample {
    pub fn conditions(&self) -> Option<&Conditions> {
        self.forecast.as_ref().ok()
    }
}

impl Serialize for ForecastSample {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ForecastSample", 3)?;
        state.serialize_field("waypoint", &self.waypoint)?;
        match &self.forecast {
            Ok(conditions) => {
                state.serialize_field("conditions", conditions)?;
                state.serialize_field("error", &Option::<String>::None)?;
            }
            Err(unavailable) => {
                state.serialize_field("conditions", &Option::<Conditions>::None)?;
                state.serialize_field("error", &Some(&unavailable.reason))?;
            }
        }
        state.end()
    }
}

/// What the CLI asked for.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    /// Wall-clock departure at the origin. `None` means now.
    pub departure: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripReport {
    pub route: Route,
    pub samples: Vec<ForecastSample>,
}

impl TripReport {
    pub fn unavailable_count(&self) -> usize {
        self.samples.iter().filter(|s| s.forecast.is_err()).count()
    }
}

fn offset_seconds<S: serde::Serializer>(
    offset: &Option<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match offset {
        Some(offset) => serializer.serialize_some(&offset.local_minus_utc()),
        None => serializer.serialize_none(),
    }
}

mod duration_seconds {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }
}
