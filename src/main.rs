use driving_forecast::core::report;
use driving_forecast::domain::model::TripRequest;
use driving_forecast::utils::{logger, validation::Validate};
use driving_forecast::{
    adapters, AppConfig, CliConfig, DarkSkyWeather, ForecastEngine, ForecastError, GoogleMaps,
    RouteResolver, WaypointWeatherAnnotator,
};

fn exit_with(e: &ForecastError) -> ! {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse_args();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    // 載入並驗證配置
    let mut config = match AppConfig::from_file(&cli.route.config) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if let Some(n) = cli.concurrent_requests {
        config.request.concurrent_requests = Some(n);
    }
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let client = match adapters::http_client(&config) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let resolver = RouteResolver::new(GoogleMaps::new(client.clone(), &config));
    let annotator = WaypointWeatherAnnotator::with_concurrency(
        DarkSkyWeather::new(client, &config),
        config.concurrent_requests(),
    );
    let engine = ForecastEngine::new(resolver, annotator);

    let request = TripRequest::from(&cli.route);
    let trip = match engine.run(&request).await {
        Ok(trip) => trip,
        Err(e) => exit_with(&e),
    };

    if cli.json {
        match report::render_json(&trip) {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with(&e),
        }
    } else {
        print!("{}", report::render_text(&trip));
    }
}
