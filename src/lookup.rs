//! City weather lookup
//!
//! Resolves a user-entered city name through a short fallback chain:
//! direct query, country-suffixed query, geocoding, then a query by the
//! geocoded coordinates. Requests are issued one at a time.

use std::sync::Arc;

use crate::api::WeatherApiClient;
use crate::config::AppConfig;
use crate::models::{GeocodingResult, WeatherReport};
use crate::transliterate::{Romanizer, Transliterator, contains_han};
use crate::{ErrorCode, Result, WeatherAppError};
use tracing::{debug, error, info, warn};

/// Runs the lookup chain against one API client
pub struct WeatherLookup {
    client: WeatherApiClient,
    romanizer: Arc<dyn Romanizer>,
    country_code: String,
    local_name_key: String,
}

impl WeatherLookup {
    pub fn new(
        client: WeatherApiClient,
        romanizer: Arc<dyn Romanizer>,
        country_code: impl Into<String>,
        local_name_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            romanizer,
            country_code: country_code.into(),
            local_name_key: local_name_key.into(),
        }
    }

    /// Build the client and romanizer described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = WeatherApiClient::new(&config.weather)?;
        let romanizer = Arc::new(Transliterator::from_config(&config.transliteration));
        Ok(Self::new(
            client,
            romanizer,
            config.weather.country_code.trim(),
            config.weather.local_name_key(),
        ))
    }

    fn with_country(&self, query: &str) -> String {
        format!("{},{}", query, self.country_code)
    }

    /// Query string actually sent: romanized when the input is Han script
    /// and a romanization is available, the raw input otherwise.
    pub async fn search_query(&self, city_query: &str) -> String {
        if !contains_han(city_query) {
            return city_query.to_string();
        }

        match self.romanizer.romanize(city_query).await {
            Some(latin) => {
                info!("Chinese input '{}' converted to '{}'", city_query, latin);
                latin
            }
            None => {
                debug!("No romanization available, searching with the original name");
                city_query.to_string()
            }
        }
    }

    /// Look up current weather for `city_query`
    pub async fn get_weather(&self, city_query: &str) -> Result<WeatherReport> {
        let city_query = city_query.trim();
        if city_query.is_empty() {
            return Err(WeatherAppError::validation("City name cannot be empty"));
        }

        let search_city = self.search_query(city_query).await;

        if !self.client.has_api_key() {
            error!("OpenWeatherMap API key is not configured");
            return Err(WeatherAppError::missing_api_key());
        }

        let units = self.client.units();
        match self.client.weather_by_city(&search_city).await {
            Ok(weather) => Ok(WeatherReport::new(weather, None, units)),
            Err(e) if e.is_not_found() => {
                debug!("Looking up '{}' through fallbacks", search_city);
                debug!("1/3: direct query found nothing");

                let with_country = self.with_country(&search_city);
                debug!("2/3: trying with country code: {}", with_country);
                match self.client.weather_by_city(&with_country).await {
                    Ok(weather) => {
                        info!("Found '{}' using the country code", with_country);
                        return Ok(WeatherReport::new(weather, None, units));
                    }
                    Err(e) => debug!("Country-suffixed query failed: {}", e),
                }

                debug!("3/3: trying geocoding");
                let Some(place) = self.geocode_city(&search_city).await else {
                    return Err(WeatherAppError::api(
                        "404 Not Found: city not found (geocoding returned no results either). \
                         Check the spelling or try the English or pinyin name.",
                        ErrorCode::CityNotFound,
                    ));
                };

                info!(
                    "Geocoding found '{}' at {}",
                    place.name,
                    place.format_coordinates()
                );
                let weather = self
                    .client
                    .weather_by_coordinates(place.lat, place.lon)
                    .await?;
                let city_name = place.preferred_name(&self.local_name_key).to_string();
                info!("Weather lookup finished for {}", city_name);
                Ok(WeatherReport::new(weather, Some(city_name), units))
            }
            Err(e) => Err(e),
        }
    }

    /// Try several forms of `city` against the geocoding endpoint; the first
    /// non-empty answer wins. Failing attempts are logged and skipped.
    pub async fn geocode_city(&self, city: &str) -> Option<GeocodingResult> {
        let mut attempts = vec![city.to_string(), self.with_country(city)];

        if contains_han(city) {
            if let Some(latin) = self.romanizer.romanize(city).await {
                if latin != city {
                    let latin_with_country = self.with_country(&latin);
                    attempts.push(latin);
                    attempts.push(latin_with_country);
                }
            }
        }

        for query in &attempts {
            match self.client.geocode(query, 1).await {
                Ok(results) => match results.into_iter().next() {
                    Some(place) => {
                        debug!("Geocoding hit for '{}': {:?}", query, place);
                        return Some(place);
                    }
                    None => warn!("Geocoding attempt '{}' returned no results", query),
                },
                Err(e) => warn!("Geocoding attempt '{}' failed: {}", query, e),
            }
        }

        None
    }
}
