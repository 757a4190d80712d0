//! Error types and handling for the `cityweather` application

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Machine-readable classification of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No API credential configured
    ConfigMissingApiKey,
    /// Configuration value out of range or malformed
    ConfigInvalid,
    /// HTTP 401 from the weather service
    ApiUnauthorized,
    /// HTTP 404 from the weather service
    ApiLocationNotFound,
    /// HTTP 429 from the weather service
    ApiRateLimit,
    /// Any other non-success HTTP status
    ApiHttpError,
    /// Response body could not be parsed
    ApiInvalidResponse,
    /// Transport failure (DNS, connect, timeout, ...)
    ApiNetworkError,
    /// Neither the weather nor the geocoding API knew the city
    CityNotFound,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::ConfigMissingApiKey => "CONFIG_MISSING_API_KEY",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiLocationNotFound => "API_LOCATION_NOT_FOUND",
            Self::ApiRateLimit => "API_RATE_LIMIT",
            Self::ApiHttpError => "API_HTTP_ERROR",
            Self::ApiInvalidResponse => "API_INVALID_RESPONSE",
            Self::ApiNetworkError => "API_NETWORK_ERROR",
            Self::CityNotFound => "CITY_NOT_FOUND",
        };
        f.write_str(code)
    }
}

/// Main error type for the `cityweather` application
#[derive(Error, Debug)]
pub enum WeatherAppError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String, code: ErrorCode },

    /// API communication errors
    #[error("{message}")]
    Api {
        message: String,
        code: ErrorCode,
        context: HashMap<String, String>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl WeatherAppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            code: ErrorCode::ConfigInvalid,
        }
    }

    /// The credential is absent; no request was made
    pub fn missing_api_key() -> Self {
        Self::Config {
            message: "No API key configured: set OPENWEATHER_API_KEY (or weather.api_key in the \
                      config file) to your OpenWeatherMap API key."
                .to_string(),
            code: ErrorCode::ConfigMissingApiKey,
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S, code: ErrorCode) -> Self {
        Self::api_with_context(message, code, HashMap::new())
    }

    /// Create a new API error carrying key/value diagnostics
    pub fn api_with_context<S: Into<String>>(
        message: S,
        code: ErrorCode,
        context: HashMap<String, String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            code,
            context,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Error classification, when one applies
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Config { code, .. } | Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for a 404 from the weather endpoint
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::ApiLocationNotFound)
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherAppError::Config {
                code: ErrorCode::ConfigMissingApiKey,
                message,
            } => message.clone(),
            WeatherAppError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherAppError::Api { message, .. } => {
                format!("Failed to fetch weather data: {message}")
            }
            WeatherAppError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WeatherAppError::General { message } => {
                format!("Failed to fetch weather data: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = WeatherAppError::config("bad timeout");
        assert!(matches!(config_err, WeatherAppError::Config { .. }));
        assert_eq!(config_err.code(), Some(ErrorCode::ConfigInvalid));

        let api_err = WeatherAppError::api("HTTP 500", ErrorCode::ApiHttpError);
        assert!(matches!(api_err, WeatherAppError::Api { .. }));

        let validation_err = WeatherAppError::validation("empty city");
        assert!(matches!(validation_err, WeatherAppError::Validation { .. }));
        assert_eq!(validation_err.code(), None);
    }

    #[test]
    fn test_not_found_detection() {
        let err = WeatherAppError::api("city not found", ErrorCode::ApiLocationNotFound);
        assert!(err.is_not_found());
        let err = WeatherAppError::api("bad key", ErrorCode::ApiUnauthorized);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_user_messages() {
        let missing = WeatherAppError::missing_api_key();
        assert!(missing.user_message().contains("OPENWEATHER_API_KEY"));
        assert!(!missing.user_message().starts_with("Failed to fetch"));

        let api_err = WeatherAppError::api("HTTP 500 - boom", ErrorCode::ApiHttpError);
        assert_eq!(
            api_err.user_message(),
            "Failed to fetch weather data: HTTP 500 - boom"
        );

        let validation_err = WeatherAppError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ApiUnauthorized.to_string(), "API_UNAUTHORIZED");
        assert_eq!(ErrorCode::CityNotFound.to_string(), "CITY_NOT_FOUND");
    }
}
