//! Geocoding record returned by the OpenWeatherMap direct geocoding endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One match from `/geo/1.0/direct`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeocodingResult {
    /// Standard location name
    pub name: String,
    /// Names keyed by language code ("zh", "en", ...)
    #[serde(default)]
    pub local_names: Option<HashMap<String, String>>,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Country code
    #[serde(default)]
    pub country: String,
    /// State or province, when the API provides one
    #[serde(default)]
    pub state: Option<String>,
}

impl GeocodingResult {
    /// Name in the given language, falling back to the standard name
    #[must_use]
    pub fn preferred_name(&self, lang: &str) -> &str {
        self.local_names
            .as_ref()
            .and_then(|names| names.get(lang))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}
