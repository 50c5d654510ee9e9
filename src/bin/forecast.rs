use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use driving_forecast::config::cli::{parse_date_time, parse_or_exit};
use driving_forecast::config::DEFAULT_CONFIG_PATH;
use driving_forecast::domain::model::Coordinate;
use driving_forecast::domain::ports::WeatherProvider;
use driving_forecast::utils::logger;
use driving_forecast::{adapters, AppConfig, DarkSkyWeather};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Weather forecast at a specific time and place")]
struct Args {
    /// Also accepted as `-lat`.
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,

    /// Also accepted as `-long`.
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,

    /// Time in UTC, YYYY-MM-DDThh:mm. Defaults to now.
    #[arg(long, value_parser = parse_date_time)]
    at: Option<NaiveDateTime>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = parse_or_exit();
    logger::init_cli_logger(args.verbose);

    let config = AppConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;
    config.validate_weather()?;

    let weather = DarkSkyWeather::new(adapters::http_client(&config)?, &config);
    let at = args.at.map(|t| t.and_utc()).unwrap_or_else(Utc::now);
    let conditions = weather
        .forecast(Coordinate::new(args.latitude, args.longitude), at)
        .await?;

    println!("{}", serde_json::to_string_pretty(&conditions)?);
    Ok(())
}
