//! Data models for the cityweather application
//!
//! This module contains the records exchanged with the weather service:
//! - Location: geocoding results and localized names
//! - Weather: current conditions, measurement units and the lookup report

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::GeocodingResult;
pub use weather::{Conditions, CurrentWeather, MainReadings, Units, WeatherReport, Wind};
