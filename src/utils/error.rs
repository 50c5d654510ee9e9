use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures that make it impossible to compute a route. Always fatal for a run.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Address could not be resolved: {address}")]
    AddressNotFound { address: String },

    #[error("No route found between {origin} and {destination}")]
    NoRoute { origin: String, destination: String },

    #[error("Departure time {departure} is not in the future (now: {now})")]
    DepartureInPast {
        departure: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Provider rejected the request with status {status}: {message}")]
    ProviderRejected { status: String, message: String },

    #[error("Provider unreachable: {0}")]
    ProviderUnreachable(#[from] reqwest::Error),
}

/// A single waypoint's weather lookup failed. The run carries on without it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Forecast unavailable for waypoint {index}: {reason}")]
pub struct ForecastUnavailable {
    pub index: usize,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Route resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Route has no legs")]
    EmptyRoute,
}

impl ForecastError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::Resolution(ResolutionError::AddressNotFound { address }) => {
                format!("Could not find the address '{}'", address)
            }
            ForecastError::Resolution(ResolutionError::NoRoute { .. }) => {
                "No driving route exists between the given addresses".to_string()
            }
            ForecastError::Resolution(ResolutionError::DepartureInPast { .. }) => {
                "The departure time must be in the future".to_string()
            }
            ForecastError::Resolution(e) => format!("Could not get directions: {}", e),
            ForecastError::ApiError(e) => format!("Network request failed: {}", e),
            ForecastError::MissingConfigError { field } => {
                format!("The configuration file is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::Resolution(ResolutionError::AddressNotFound { .. }) => {
                "Check the spelling of the address or add a city and state"
            }
            ForecastError::Resolution(ResolutionError::DepartureInPast { .. }) => {
                "Pass a later --date_time in the format YYYY-MM-DDThh:mm"
            }
            ForecastError::Resolution(ResolutionError::ProviderRejected { .. }) => {
                "Check that the Google API keys are valid and the APIs are enabled"
            }
            ForecastError::Resolution(ResolutionError::ProviderUnreachable(_))
            | ForecastError::ApiError(_) => "Check your network connection and try again",
            ForecastError::ConfigError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::InvalidConfigValueError { .. } => {
                "Copy config.toml into the 'development' directory and fill in the API keys"
            }
            _ => "Run again with --verbose for more detail",
        }
    }

    /// Process exit code for the binaries.
    pub fn exit_code(&self) -> i32 {
        match self {
            ForecastError::ConfigError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::ValidationError { .. } => 1,
            ForecastError::Resolution(_) | ForecastError::EmptyRoute => 2,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let missing = ForecastError::MissingConfigError {
            field: "google.maps_api_key".to_string(),
        };
        assert_eq!(missing.exit_code(), 1);

        let no_route = ForecastError::from(ResolutionError::NoRoute {
            origin: "a".to_string(),
            destination: "b".to_string(),
        });
        assert_eq!(no_route.exit_code(), 2);
        assert_eq!(ForecastError::EmptyRoute.exit_code(), 2);

        let io = ForecastError::from(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_user_friendly_message_names_address() {
        let err = ForecastError::from(ResolutionError::AddressNotFound {
            address: "123 Fake St".to_string(),
        });
        assert!(err.user_friendly_message().contains("123 Fake St"));
    }
}
