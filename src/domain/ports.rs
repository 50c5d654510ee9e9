use crate::domain::model::{Conditions, Coordinate, Place, RouteLeg};
use crate::utils::error::{ResolutionError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

/// Directions returned by a provider for one origin/destination pair.
#[derive(Debug, Clone)]
pub struct Directions {
    pub summary: Option<String>,
    pub legs: Vec<RouteLeg>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> std::result::Result<Place, ResolutionError>;
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// `departure` of `None` asks for a route leaving now.
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        departure: Option<DateTime<Utc>>,
    ) -> std::result::Result<Directions, ResolutionError>;
}

#[async_trait]
pub trait TimeZoneProvider: Send + Sync {
    /// UTC offset (DST included) in effect at `location` around `at`.
    async fn offset_at(
        &self,
        location: Coordinate,
        at: DateTime<Utc>,
    ) -> std::result::Result<FixedOffset, ResolutionError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, location: Coordinate, at: DateTime<Utc>) -> Result<Conditions>;
}

/// Source of "now", injectable so departure checks are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
