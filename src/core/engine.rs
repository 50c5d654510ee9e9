use crate::core::annotator::WaypointWeatherAnnotator;
use crate::core::resolver::RouteResolver;
use crate::domain::model::{TripReport, TripRequest};
use crate::domain::ports::{Clock, DirectionsProvider, Geocoder, TimeZoneProvider, WeatherProvider};
use crate::utils::error::Result;

pub struct ForecastEngine<P, W, C>
where
    W: WeatherProvider,
{
    resolver: RouteResolver<P, C>,
    annotator: WaypointWeatherAnnotator<W>,
}

impl<P, W, C> ForecastEngine<P, W, C>
where
    P: Geocoder + DirectionsProvider + TimeZoneProvider,
    W: WeatherProvider,
    C: Clock,
{
    pub fn new(resolver: RouteResolver<P, C>, annotator: WaypointWeatherAnnotator<W>) -> Self {
        Self {
            resolver,
            annotator,
        }
    }

    /// Resolves the route, then annotates every waypoint. Resolution failures
    /// abort the run; weather failures are kept on their samples.
    pub async fn run(&self, request: &TripRequest) -> Result<TripReport> {
        tracing::info!(
            "Planning trip from '{}' to '{}'",
            request.origin,
            request.destination
        );

        let route = self.resolver.resolve(request).await?;
        let samples = self.annotator.annotate(&route.legs, route.departure).await?;

        tracing::info!("Annotated {} waypoints", samples.len());
        Ok(TripReport { route, samples })
    }
}
