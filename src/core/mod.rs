pub mod annotator;
pub mod engine;
pub mod report;
pub mod resolver;

pub use crate::domain::model::{ForecastSample, Route, RouteLeg, TripReport, TripRequest, Waypoint};
pub use crate::domain::ports::{DirectionsProvider, Geocoder, TimeZoneProvider, WeatherProvider};
pub use crate::utils::error::Result;
