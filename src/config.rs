//! Configuration management for the `cityweather` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherAppError;
use crate::models::Units;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the OpenWeatherMap credential
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Root configuration structure for the `cityweather` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Chinese-to-Latin query conversion
    pub transliteration: TransliterationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key, shared by the weather and geocoding endpoints
    pub api_key: Option<String>,
    /// Base URL for both endpoints
    pub base_url: String,
    /// Base URL for condition icons
    pub icon_base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures; 0 disables retrying
    pub max_retries: u32,
    /// Measurement system requested from the API
    pub units: Units,
    /// Language for condition descriptions and localized city names
    pub lang: String,
    /// Country code appended when the bare city name is not found
    pub country_code: String,
}

/// Transliteration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransliterationConfig {
    /// Convert Han characters to a Latin query before searching
    pub enabled: bool,
    /// Upper bound for loading the romanization table
    pub load_timeout_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_lang() -> String {
    "zh_cn".to_string()
}

fn default_country_code() -> String {
    "CN".to_string()
}

fn default_load_timeout_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            icon_base_url: default_icon_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: 0,
            units: Units::default(),
            lang: default_lang(),
            country_code: default_country_code(),
        }
    }
}

impl Default for TransliterationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// HTTP client timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Key into geocoding `local_names` for the configured language ("zh_cn" -> "zh")
    #[must_use]
    pub fn local_name_key(&self) -> &str {
        self.lang
            .split(['_', '-'])
            .next()
            .unwrap_or(self.lang.as_str())
    }

    /// The credential, if one is configured and non-blank
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl TransliterationConfig {
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from `config_path`, or from the default location
    /// when none is given. A named file must exist; the default is optional.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path)
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                let default_file = Self::get_config_path()
                    .unwrap_or_else(|| PathBuf::from("config.toml"));
                builder = builder.add_source(
                    File::from(default_file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        // CITYWEATHER_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("CITYWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.weather.api_key().is_none() {
            config.weather.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cityweather").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.icon_base_url.is_empty() {
            self.weather.icon_base_url = default_icon_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.lang.is_empty() {
            self.weather.lang = default_lang();
        }
        if self.transliteration.load_timeout_ms == 0 {
            self.transliteration.load_timeout_ms = default_load_timeout_ms();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Blank means "no key", which is reported at lookup time.
        if self.weather.api_key().is_none() {
            self.weather.api_key = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherAppError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(WeatherAppError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.transliteration.load_timeout_ms > 60_000 {
            return Err(WeatherAppError::config(
                "Transliteration load timeout cannot exceed 60000 ms",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherAppError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherAppError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.weather.base_url, &self.weather.icon_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherAppError::config(format!(
                    "'{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        let country = self.weather.country_code.trim();
        if country.is_empty() || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(WeatherAppError::config(format!(
                "Invalid country code '{}'. Expected letters such as 'CN'",
                self.weather.country_code
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.weather.api_key = Some("valid_api_key_123".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(config.weather.units, Units::Metric);
        assert_eq!(config.weather.lang, "zh_cn");
        assert_eq!(config.weather.country_code, "CN");
        assert!(config.transliteration.enabled);
        assert_eq!(config.transliteration.load_timeout_ms, 3000);
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_missing_api_key_is_not_a_config_error() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let mut config = AppConfig::default();
        config.weather.api_key = Some("   ".to_string());
        assert!(config.weather.api_key().is_none());
        config.apply_defaults();
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_any_non_blank_api_key_accepted() {
        let mut config = AppConfig::default();
        config.weather.api_key = Some("abc".to_string());
        assert!(config.validate().is_ok());
        config.weather.api_key = Some("k".repeat(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_named_config_file_must_exist() {
        let path = std::env::temp_dir()
            .join(format!("cityweather-missing-{}", std::process::id()))
            .join("config.toml");
        assert!(AppConfig::load_from_path(Some(path)).is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = config_with_key();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = config_with_key();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_country_code() {
        let mut config = config_with_key();
        config.weather.country_code = "C1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_name_key() {
        let mut config = AppConfig::default();
        assert_eq!(config.weather.local_name_key(), "zh");
        config.weather.lang = "en".to_string();
        assert_eq!(config.weather.local_name_key(), "en");
        config.weather.lang = "pt-BR".to_string();
        assert_eq!(config.weather.local_name_key(), "pt");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("cityweather-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[weather]\napi_key = \"file_api_key_123\"\nunits = \"imperial\"\nlang = \"en\"\ncountry_code = \"US\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.weather.api_key(), Some("file_api_key_123"));
        assert_eq!(config.weather.units, Units::Imperial);
        assert_eq!(config.weather.country_code, "US");
        assert_eq!(config.logging.level, "debug");
        // untouched sections keep their defaults
        assert_eq!(config.weather.timeout_seconds, 30);
        assert!(config.transliteration.enabled);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_path_generation() {
        let path = AppConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("cityweather"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
