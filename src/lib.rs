pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, RouteArgs};

pub use adapters::{google::GoogleMaps, weather::DarkSkyWeather};
pub use config::AppConfig;
pub use core::{
    annotator::{estimate_arrivals, WaypointWeatherAnnotator},
    engine::ForecastEngine,
    resolver::RouteResolver,
};
pub use utils::error::{ForecastError, ForecastUnavailable, ResolutionError, Result};
