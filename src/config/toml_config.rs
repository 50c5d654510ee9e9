use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{
    validate_api_key, validate_non_empty_string, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "development/config.toml";

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_TIME_ZONE_URL: &str = "https://maps.googleapis.com/maps/api/timezone/json";
pub const DEFAULT_WEATHER_URL: &str = "https://api.pirateweather.net/forecast";

const VALID_UNITS: [&str; 5] = ["auto", "ca", "uk2", "us", "si"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub request: RequestConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub maps_api_key: Option<String>,
    /// Falls back to `maps_api_key` when absent.
    pub time_zone_api_key: Option<String>,
    pub geocode_url: Option<String>,
    pub directions_url: Option<String>,
    pub time_zone_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub timeout_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ForecastError::ConfigError {
                message: format!(
                    "Configuration file '{}' not found. Create a 'development' directory, \
                     copy 'config.toml' into it and fill in the values.",
                    path.display()
                ),
            },
            _ => ForecastError::IoError(e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn maps_api_key(&self) -> &str {
        self.google.maps_api_key.as_deref().unwrap_or_default()
    }

    pub fn time_zone_api_key(&self) -> &str {
        self.google
            .time_zone_api_key
            .as_deref()
            .unwrap_or_else(|| self.maps_api_key())
    }

    pub fn weather_api_key(&self) -> &str {
        self.weather.api_key.as_deref().unwrap_or_default()
    }

    pub fn geocode_url(&self) -> &str {
        self.google.geocode_url.as_deref().unwrap_or(DEFAULT_GEOCODE_URL)
    }

    pub fn directions_url(&self) -> &str {
        self.google
            .directions_url
            .as_deref()
            .unwrap_or(DEFAULT_DIRECTIONS_URL)
    }

    pub fn time_zone_url(&self) -> &str {
        self.google
            .time_zone_url
            .as_deref()
            .unwrap_or(DEFAULT_TIME_ZONE_URL)
    }

    pub fn weather_url(&self) -> &str {
        self.weather.base_url.as_deref().unwrap_or(DEFAULT_WEATHER_URL)
    }

    pub fn units(&self) -> &str {
        self.weather.units.as_deref().unwrap_or("us")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request.timeout_seconds.unwrap_or(30))
    }

    pub fn concurrent_requests(&self) -> usize {
        self.request.concurrent_requests.unwrap_or(1)
    }

    /// Only the directions side is needed by the `directions` tool.
    pub fn validate_directions(&self) -> Result<()> {
        let maps_key = validate_required_field("google.maps_api_key", &self.google.maps_api_key)?;
        validate_api_key("google.maps_api_key", maps_key)?;
        if let Some(tz_key) = &self.google.time_zone_api_key {
            validate_api_key("google.time_zone_api_key", tz_key)?;
        }

        validate_url("google.geocode_url", self.geocode_url())?;
        validate_url("google.directions_url", self.directions_url())?;
        validate_url("google.time_zone_url", self.time_zone_url())?;

        if let Some(timeout) = self.request.timeout_seconds {
            validate_range("request.timeout_seconds", timeout, 1, 600)?;
        }
        Ok(())
    }

    pub fn validate_weather(&self) -> Result<()> {
        let weather_key = validate_required_field("weather.api_key", &self.weather.api_key)?;
        validate_api_key("weather.api_key", weather_key)?;
        validate_url("weather.base_url", self.weather_url())?;

        validate_non_empty_string("weather.units", self.units())?;
        if !VALID_UNITS.contains(&self.units()) {
            return Err(ForecastError::InvalidConfigValueError {
                field: "weather.units".to_string(),
                value: self.units().to_string(),
                reason: format!("Unsupported units. Valid units: {}", VALID_UNITS.join(", ")),
            });
        }

        if let Some(concurrent) = self.request.concurrent_requests {
            validate_range("request.concurrent_requests", concurrent, 1, 16)?;
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_directions()?;
        self.validate_weather()
    }
}
