use crate::domain::model::{ForecastSample, RouteLeg, Waypoint};
use crate::domain::ports::WeatherProvider;
use crate::utils::error::{ForecastError, ForecastUnavailable, Result};
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};

/// Estimated arrival at every waypoint of a route.
///
/// The first waypoint is the start of the first leg at `departure`; each
/// following waypoint is a leg's end point at `departure` plus the summed
/// durations of the legs before it. `n` legs give `n + 1` waypoints.
pub fn estimate_arrivals(legs: &[RouteLeg], departure: DateTime<Utc>) -> Result<Vec<Waypoint>> {
    let first = legs.first().ok_or(ForecastError::EmptyRoute)?;

    let mut waypoints = Vec::with_capacity(legs.len() + 1);
    waypoints.push(Waypoint {
        location: first.start_point,
        estimated_arrival: departure,
    });

    let mut elapsed = Duration::zero();
    for (i, leg) in legs.iter().enumerate() {
        if leg.duration < Duration::zero() {
            return Err(ForecastError::ValidationError {
                message: format!("leg {} has a negative duration", i),
            });
        }
        let out_of_range = || ForecastError::ValidationError {
            message: format!("arrival after leg {} is out of range", i),
        };
        elapsed = elapsed.checked_add(&leg.duration).ok_or_else(out_of_range)?;
        let estimated_arrival = departure
            .checked_add_signed(elapsed)
            .ok_or_else(out_of_range)?;
        waypoints.push(Waypoint {
            location: leg.end_point,
            estimated_arrival,
        });
    }

    Ok(waypoints)
}

pub struct WaypointWeatherAnnotator<W: WeatherProvider> {
    weather: W,
    concurrent_requests: usize,
}

impl<W: WeatherProvider> WaypointWeatherAnnotator<W> {
    /// Sequential annotator: one weather query at a time.
    pub fn new(weather: W) -> Self {
        Self::with_concurrency(weather, 1)
    }

    pub fn with_concurrency(weather: W, concurrent_requests: usize) -> Self {
        Self {
            weather,
            concurrent_requests: concurrent_requests.max(1),
        }
    }

    /// One sample per waypoint, in route order. A failed lookup is recorded
    /// on its sample and does not stop the others.
    pub async fn annotate(
        &self,
        legs: &[RouteLeg],
        departure: DateTime<Utc>,
    ) -> Result<Vec<ForecastSample>> {
        let waypoints = estimate_arrivals(legs, departure)?;
        tracing::debug!(
            "Annotating {} waypoints ({} in flight)",
            waypoints.len(),
            self.concurrent_requests
        );

        // buffered() yields in input order regardless of completion order
        let samples: Vec<ForecastSample> = stream::iter(waypoints.into_iter().enumerate())
            .map(|(index, waypoint)| self.sample(index, waypoint))
            .buffered(self.concurrent_requests)
            .collect()
            .await;

        let missing = samples.iter().filter(|s| s.forecast.is_err()).count();
        if missing > 0 {
            tracing::warn!("{} of {} forecasts unavailable", missing, samples.len());
        }
        Ok(samples)
    }

    async fn sample(&self, index: usize, waypoint: Waypoint) -> ForecastSample {
        let forecast = self
            .weather
            .forecast(waypoint.location, waypoint.estimated_arrival)
            .await
            .map_err(|e| {
                tracing::warn!("Forecast for waypoint {} failed: {}", index, e);
                ForecastUnavailable {
                    index,
                    reason: e.to_string(),
                }
            });

        ForecastSample { waypoint, forecast }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Conditions, Coordinate};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Mutex;

    fn nine_am() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn legs(minutes: &[i64]) -> Vec<RouteLeg> {
        minutes
            .iter()
            .enumerate()
            .map(|(i, m)| RouteLeg {
                start_point: Coordinate::new(i as f64, 0.0),
                end_point: Coordinate::new(i as f64 + 1.0, 0.0),
                duration: Duration::minutes(*m),
                instruction: None,
            })
            .collect()
    }

    /// Fails at the configured indexes (by latitude) and records call order.
    #[derive(Default)]
    struct FakeWeather {
        fail_at: Vec<usize>,
        calls: Mutex<Vec<usize>>,
        // later waypoints answer first when set
        reverse_delay: bool,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn forecast(
            &self,
            location: Coordinate,
            at: DateTime<Utc>,
        ) -> Result<Conditions> {
            let index = location.latitude as usize;
            if self.reverse_delay {
                let wait = 40u64.saturating_sub(index as u64 * 10);
                tokio::time::sleep(std::time::Duration::from_millis(wait)).await;
            }
            self.calls.lock().unwrap().push(index);
            if self.fail_at.contains(&index) {
                return Err(ForecastError::ValidationError {
                    message: "provider down".to_string(),
                });
            }
            Ok(Conditions(json!({"time": at.timestamp(), "summary": "Clear"})))
        }
    }

    #[test]
    fn test_arrivals_accumulate_leg_durations() {
        let waypoints = estimate_arrivals(&legs(&[10, 20, 15]), nine_am()).unwrap();

        let times: Vec<String> = waypoints
            .iter()
            .map(|w| w.estimated_arrival.format("%H:%M").to_string())
            .collect();
        assert_eq!(times, vec!["09:00", "09:10", "09:30", "09:45"]);
    }

    #[test]
    fn test_first_and_last_waypoint_edges() {
        let route = legs(&[7, 0, 33, 125]);
        let waypoints = estimate_arrivals(&route, nine_am()).unwrap();

        assert_eq!(waypoints.len(), route.len() + 1);
        assert_eq!(waypoints[0].estimated_arrival, nine_am());
        assert_eq!(waypoints[0].location, route[0].start_point);
        assert_eq!(
            waypoints.last().unwrap().estimated_arrival,
            nine_am() + Duration::minutes(165)
        );
        assert!(waypoints
            .windows(2)
            .all(|w| w[0].estimated_arrival <= w[1].estimated_arrival));
    }

    #[test]
    fn test_empty_route_is_an_error() {
        assert!(matches!(
            estimate_arrivals(&[], nine_am()),
            Err(ForecastError::EmptyRoute)
        ));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let mut route = legs(&[10, 10]);
        route[1].duration = Duration::minutes(-5);
        assert!(estimate_arrivals(&route, nine_am()).is_err());
    }

    #[test]
    fn test_arrival_overflow_is_an_error_not_a_panic() {
        // ~270 million years per leg: a valid Duration, an unrepresentable arrival
        for count in [1, 2] {
            let mut route = legs(&vec![10; count]);
            for leg in &mut route {
                leg.duration = Duration::days(100_000_000_000);
            }
            assert!(matches!(
                estimate_arrivals(&route, nine_am()),
                Err(ForecastError::ValidationError { .. })
            ));
        }
    }

    #[test]
    fn test_empty_route_fails_annotation() {
        let annotator = WaypointWeatherAnnotator::new(FakeWeather::default());
        let result = tokio_test::block_on(annotator.annotate(&[], nine_am()));
        assert!(matches!(result, Err(ForecastError::EmptyRoute)));
    }

    #[tokio::test]
    async fn test_failure_at_one_waypoint_does_not_stop_the_rest() {
        let weather = FakeWeather {
            fail_at: vec![1],
            ..Default::default()
        };
        let annotator = WaypointWeatherAnnotator::new(weather);

        let samples = annotator
            .annotate(&legs(&[10, 20, 15]), nine_am())
            .await
            .unwrap();

        assert_eq!(samples.len(), 4);
        assert!(samples[0].forecast.is_ok());
        let err = samples[1].forecast.as_ref().unwrap_err();
        assert_eq!(err.index, 1);
        assert!(err.reason.contains("provider down"));
        assert!(samples[2].forecast.is_ok());
        assert!(samples[3].forecast.is_ok());
        assert_eq!(*annotator.weather.calls.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_each_waypoint_is_queried_at_its_arrival_time() {
        let annotator = WaypointWeatherAnnotator::new(FakeWeather::default());
        let samples = annotator
            .annotate(&legs(&[10, 20, 15]), nine_am())
            .await
            .unwrap();

        for sample in &samples {
            let queried = sample.conditions().unwrap().0["time"].as_i64().unwrap();
            assert_eq!(queried, sample.waypoint.estimated_arrival.timestamp());
        }
    }

    #[tokio::test]
    async fn test_concurrent_annotation_keeps_route_order() {
        let weather = FakeWeather {
            reverse_delay: true,
            fail_at: vec![2],
            ..Default::default()
        };
        let annotator = WaypointWeatherAnnotator::with_concurrency(weather, 4);

        let samples = annotator
            .annotate(&legs(&[10, 20, 15]), nine_am())
            .await
            .unwrap();

        let latitudes: Vec<f64> = samples.iter().map(|s| s.waypoint.location.latitude).collect();
        assert_eq!(latitudes, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(samples[2].forecast.is_err());
        // completion order differed from route order
        assert_ne!(*annotator.weather.calls.lock().unwrap(), vec![0, 1, 2, 3]);
    }
}
