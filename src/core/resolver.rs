use crate::domain::model::{Route, TripRequest};
use crate::domain::ports::{Clock, DirectionsProvider, Geocoder, SystemClock, TimeZoneProvider};
use crate::utils::error::ResolutionError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};

/// Turns two addresses and an optional departure into an ordered, non-empty
/// list of legs.
pub struct RouteResolver<P, C = SystemClock> {
    maps: P,
    clock: C,
}

impl<P> RouteResolver<P, SystemClock>
where
    P: Geocoder + DirectionsProvider + TimeZoneProvider,
{
    pub fn new(maps: P) -> Self {
        Self::with_clock(maps, SystemClock)
    }
}

impl<P, C> RouteResolver<P, C>
where
    P: Geocoder + DirectionsProvider + TimeZoneProvider,
    C: Clock,
{
    pub fn with_clock(maps: P, clock: C) -> Self {
        Self { maps, clock }
    }

    pub async fn resolve(&self, request: &TripRequest) -> Result<Route, ResolutionError> {
        let now = self.clock.now();

        let origin = self.maps.geocode(&request.origin).await?;
        let destination = self.maps.geocode(&request.destination).await?;
        tracing::info!("Start location: {}", origin.address);
        tracing::info!("End location: {}", destination.address);

        let (departure, origin_offset) = match request.departure {
            None => (now, None),
            Some(local) => {
                // lookup timestamp is the naive time read as UTC
                let offset = self
                    .maps
                    .offset_at(origin.coordinate, local.and_utc())
                    .await?;
                let departure = local_to_utc(local, offset);
                if departure <= now {
                    return Err(ResolutionError::DepartureInPast { departure, now });
                }
                (departure, Some(offset))
            }
        };

        let requested = request.departure.map(|_| departure);
        let directions = self
            .maps
            .directions(origin.coordinate, destination.coordinate, requested)
            .await?;

        if directions.legs.is_empty() {
            return Err(ResolutionError::NoRoute {
                origin: origin.address,
                destination: destination.address,
            });
        }

        tracing::info!(
            "Route resolved: {} legs, departing {}",
            directions.legs.len(),
            departure
        );
        Ok(Route {
            origin,
            destination,
            departure,
            origin_offset,
            summary: directions.summary,
            legs: directions.legs,
        })
    }
}

pub fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}
