//! `cityweather` - current weather for a city name
//!
//! This library resolves a user-entered city (including Chinese input) against
//! the OpenWeatherMap API, falling back to geocoding when the name alone is not
//! recognised, and renders the result as a fixed set of output fields.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod transliterate;
pub mod view;

// Re-export core types for public API
pub use api::WeatherApiClient;
pub use app::App;
pub use config::AppConfig;
pub use error::{ErrorCode, WeatherAppError};
pub use lookup::WeatherLookup;
pub use models::{CurrentWeather, GeocodingResult, Units, WeatherReport};
pub use transliterate::{Romanizer, Transliterator};
pub use view::{ViewState, WeatherPanel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherAppError>;
