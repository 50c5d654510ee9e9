use anyhow::{Context, Result};
use clap::Parser;
use driving_forecast::config::cli::parse_or_exit;
use driving_forecast::core::report;
use driving_forecast::domain::model::TripRequest;
use driving_forecast::utils::logger;
use driving_forecast::{adapters, estimate_arrivals, AppConfig, GoogleMaps, RouteArgs, RouteResolver};

#[derive(Parser)]
#[command(name = "directions")]
#[command(about = "Driving directions and arrival times for given addresses")]
struct Args {
    #[command(flatten)]
    route: RouteArgs,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = parse_or_exit();
    logger::init_cli_logger(args.verbose);

    let config = AppConfig::from_file(&args.route.config)
        .with_context(|| format!("Failed to load config file '{}'", args.route.config))?;
    config.validate_directions()?;

    let maps = GoogleMaps::new(adapters::http_client(&config)?, &config);
    let route = match RouteResolver::new(maps)
        .resolve(&TripRequest::from(&args.route))
        .await
    {
        Ok(route) => route,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let waypoints = estimate_arrivals(&route.legs, route.departure)?;
    print!("{}", report::render_directions(&route, &waypoints));
    Ok(())
}
