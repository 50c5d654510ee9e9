//! Plain-text and JSON rendering of a trip.

use crate::domain::model::{ForecastSample, Route, TripReport, Waypoint};
use crate::utils::error::Result;
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M %:z";

fn display_offset(route: &Route) -> FixedOffset {
    route.origin_offset.unwrap_or_else(|| Utc.fix())
}

fn format_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(TIME_FORMAT).to_string()
}

pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn header(route: &Route, out: &mut String) {
    let offset = display_offset(route);
    let _ = writeln!(
        out,
        "Route: {} -> {}{}",
        route.origin.address,
        route.destination.address,
        route
            .summary
            .as_deref()
            .map(|s| format!(" via {}", s))
            .unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "Departure: {}  Arrival: {}  Driving time: {}",
        format_time(route.departure, offset),
        route
            .arrival()
            .map(|at| format_time(at, offset))
            .unwrap_or_else(|| "unknown".to_string()),
        route
            .total_duration()
            .map(format_duration)
            .unwrap_or_else(|| "unknown".to_string())
    );
}

fn forecast_cell(sample: &ForecastSample) -> String {
    match &sample.forecast {
        Ok(conditions) => {
            let mut parts = Vec::new();
            parts.push(conditions.summary().unwrap_or("No summary").to_string());
            if let Some(t) = conditions.temperature() {
                parts.push(format!("{:.0}°", t));
            }
            if let Some(p) = conditions.precip_probability() {
                parts.push(format!("{:.0}% precip", p * 100.0));
            }
            if let Some(w) = conditions.wind_speed() {
                parts.push(format!("wind {:.0}", w));
            }
            parts.join(", ")
        }
        Err(unavailable) => format!("forecast unavailable: {}", unavailable.reason),
    }
}

pub fn render_text(report: &TripReport) -> String {
    let offset = display_offset(&report.route);
    let mut out = String::new();
    header(&report.route, &mut out);
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>4}  {:<23}  {:<22}  Forecast", "#", "Arrival", "Location");

    for (i, sample) in report.samples.iter().enumerate() {
        let location = format!(
            "{:.5},{:.5}",
            sample.waypoint.location.latitude, sample.waypoint.location.longitude
        );
        let _ = writeln!(
            out,
            "{:>4}  {:<23}  {:<22}  {}",
            i,
            format_time(sample.waypoint.estimated_arrival, offset),
            location,
            forecast_cell(sample)
        );
    }

    let missing = report.unavailable_count();
    if missing > 0 {
        let _ = writeln!(
            out,
            "\n{} of {} forecasts unavailable",
            missing,
            report.samples.len()
        );
    }
    out
}

pub fn render_json(report: &TripReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Turn-by-turn listing with the arrival at the end of each leg.
pub fn render_directions(route: &Route, waypoints: &[Waypoint]) -> String {
    let offset = display_offset(route);
    let mut out = String::new();
    header(route, &mut out);
    let _ = writeln!(out);

    for (i, leg) in route.legs.iter().enumerate() {
        let arrival = waypoints
            .get(i + 1)
            .map(|w| format_time(w.estimated_arrival, offset))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>4}  {:<23}  {:>7}  {}",
            i + 1,
            arrival,
            format_duration(leg.duration),
            leg.instruction.as_deref().unwrap_or("Continue")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotator::estimate_arrivals;
    use crate::domain::model::{Conditions, Coordinate, Place, RouteLeg};
    use crate::utils::error::ForecastUnavailable;
    use serde_json::json;

    fn route() -> Route {
        let a = Coordinate::new(39.78, -89.65);
        let b = Coordinate::new(40.0, -89.0);
        let c = Coordinate::new(41.88, -87.63);
        Route {
            origin: Place {
                address: "123 Fake St".to_string(),
                coordinate: a,
            },
            destination: Place {
                address: "456 Main St".to_string(),
                coordinate: c,
            },
            departure: DateTime::parse_from_rfc3339("2024-01-01T15:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            origin_offset: FixedOffset::east_opt(-6 * 3600),
            summary: Some("I-55 N".to_string()),
            legs: vec![
                RouteLeg {
                    start_point: a,
                    end_point: b,
                    duration: Duration::minutes(10),
                    instruction: Some("Head north".to_string()),
                },
                RouteLeg {
                    start_point: b,
                    end_point: c,
                    duration: Duration::minutes(95),
                    instruction: None,
                },
            ],
        }
    }

    fn report() -> TripReport {
        let route = route();
        let waypoints = estimate_arrivals(&route.legs, route.departure).unwrap();
        let samples = waypoints
            .into_iter()
            .enumerate()
            .map(|(i, waypoint)| ForecastSample {
                waypoint,
                forecast: if i == 1 {
                    Err(ForecastUnavailable {
                        index: 1,
                        reason: "timed out".to_string(),
                    })
                } else {
                    Ok(Conditions(json!({
                        "summary": "Overcast",
                        "temperature": 31.6,
                        "precipProbability": 0.25
                    })))
                },
            })
            .collect();
        TripReport { route, samples }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(105)), "1h 45m");
        assert_eq!(format_duration(Duration::minutes(5)), "0h 05m");
    }

    #[test]
    fn test_text_report_uses_origin_local_time() {
        let text = render_text(&report());

        assert!(text.contains("Route: 123 Fake St -> 456 Main St via I-55 N"));
        assert!(text.contains("Departure: 2024-01-01 09:00 -06:00"));
        assert!(text.contains("Arrival: 2024-01-01 10:45 -06:00"));
        assert!(text.contains("2024-01-01 09:10 -06:00"));
        assert!(text.contains("Overcast, 32°, 25% precip"));
        assert!(text.contains("forecast unavailable: timed out"));
        assert!(text.contains("1 of 3 forecasts unavailable"));
    }

    #[test]
    fn test_json_report_keeps_waypoint_order() {
        let value: serde_json::Value = serde_json::from_str(&render_json(&report()).unwrap()).unwrap();

        let samples = value["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0]["conditions"]["summary"], "Overcast");
        assert_eq!(samples[1]["error"], "timed out");
        assert_eq!(value["route"]["legs"][1]["duration"], 95 * 60);
    }

    #[test]
    fn test_directions_listing() {
        let route = route();
        let waypoints = estimate_arrivals(&route.legs, route.departure).unwrap();
        let text = render_directions(&route, &waypoints);

        assert!(text.contains("Head north"));
        assert!(text.contains("Continue"));
        assert!(text.contains("2024-01-01 10:45 -06:00"));
    }
}
