//! Current-weather model and measurement units

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement system passed to the API as `units=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second
    #[default]
    Metric,
    /// Fahrenheit, miles per hour
    Imperial,
    /// Kelvin, metres per second
    Standard,
}

impl Units {
    /// Value of the `units` query parameter
    #[must_use]
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    #[must_use]
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }

    #[must_use]
    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Self::Metric | Self::Standard => "m/s",
            Self::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            "standard" => Ok(Self::Standard),
            other => Err(format!(
                "unknown units '{other}', expected metric, imperial or standard"
            )),
        }
    }
}

/// Response body of `/data/2.5/weather`, reduced to the fields we display
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// City name as the weather API knows it
    #[serde(default)]
    pub name: String,
    pub main: MainReadings,
    /// Condition list; the first entry is the primary one
    pub weather: Vec<Conditions>,
    pub wind: Wind,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MainReadings {
    pub temp: f64,
    /// Relative humidity in percent
    pub humidity: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Conditions {
    pub description: String,
    /// Icon code such as "04d"
    pub icon: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Wind {
    pub speed: f64,
}

impl CurrentWeather {
    /// Primary condition, if the API returned any
    #[must_use]
    pub fn primary_condition(&self) -> Option<&Conditions> {
        self.weather.first()
    }
}

/// Outcome of one successful lookup
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub weather: CurrentWeather,
    /// Name resolved through geocoding; preferred over `weather.name` when set
    pub resolved_name: Option<String>,
    pub units: Units,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReport {
    #[must_use]
    pub fn new(weather: CurrentWeather, resolved_name: Option<String>, units: Units) -> Self {
        Self {
            weather,
            resolved_name,
            units,
            fetched_at: Utc::now(),
        }
    }

    /// Name to show for this report
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.resolved_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.weather.name.as_str())
    }
}
