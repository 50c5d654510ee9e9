#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{AppConfig, DEFAULT_CONFIG_PATH};

#[cfg(feature = "cli")]
use crate::domain::model::TripRequest;
#[cfg(feature = "cli")]
use chrono::NaiveDateTime;
#[cfg(feature = "cli")]
use clap::{Args, Parser};

/// Route arguments shared by the `driving-forecast` and `directions` binaries.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    #[arg(short = 'o', long = "origin", help = "Start address")]
    pub origin: String,

    #[arg(short = 'd', long = "destination", help = "Destination address")]
    pub destination: String,

    /// Also accepted as `-dt`.
    #[arg(
        long = "date_time",
        value_parser = cli::parse_date_time,
        help = "Departure date and time in the future, YYYY-MM-DDThh:mm in 24 hour format"
    )]
    pub date_time: Option<NaiveDateTime>,

    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

#[cfg(feature = "cli")]
impl From<&RouteArgs> for TripRequest {
    fn from(args: &RouteArgs) -> Self {
        TripRequest {
            origin: args.origin.clone(),
            destination: args.destination.clone(),
            departure: args.date_time,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "driving-forecast")]
#[command(about = "Weather forecasts along a driving route, timed to when you get there")]
pub struct CliConfig {
    #[command(flatten)]
    pub route: RouteArgs,

    #[arg(long, help = "Weather queries in flight at once (overrides the config file)")]
    pub concurrent_requests: Option<usize>,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Parses the process arguments, accepting `-dt` for `--date_time`.
    /// Invalid arguments exit 1, `--help` exits 0.
    pub fn parse_args() -> Self {
        cli::parse_or_exit()
    }
}
