//! Weather API client for OpenWeatherMap
//!
//! Wraps the current-weather endpoint (by city name or by coordinates) and
//! the direct geocoding endpoint. Both are keyed by the same credential.
//! Status codes are classified into [`ErrorCode`]s so the lookup chain can
//! decide which failures to fall back from.

use crate::config::WeatherConfig;
use crate::models::{CurrentWeather, GeocodingResult, Units};
use crate::{ErrorCode, Result, WeatherAppError};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const WEATHER_PATH: &str = "/data/2.5/weather";
const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// HTTP client for the weather and geocoding endpoints
#[derive(Clone)]
pub struct WeatherApiClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    units: Units,
    lang: String,
}

impl WeatherApiClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherAppError::general(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            units: config.units,
            lang: config.lang.clone(),
        })
    }

    /// Whether a credential is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn units(&self) -> Units {
        self.units
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(WeatherAppError::missing_api_key)
    }

    /// Current weather for a city query such as `beijing` or `shaoxing,CN`
    #[instrument(skip(self))]
    pub async fn weather_by_city(&self, query: &str) -> Result<CurrentWeather> {
        let url = format!(
            "{}{}?q={}&appid={}&units={}&lang={}",
            self.base_url,
            WEATHER_PATH,
            urlencoding::encode(query),
            urlencoding::encode(self.api_key()?),
            self.units.as_query(),
            urlencoding::encode(&self.lang),
        );

        let (status, body) = self.make_request(&url).await?;
        check_status(status, &body)?;
        parse_body(&body, "weather")
    }

    /// Current weather at the given coordinates
    #[instrument(skip(self))]
    pub async fn weather_by_coordinates(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let url = format!(
            "{}{}?lat={}&lon={}&appid={}&units={}&lang={}",
            self.base_url,
            WEATHER_PATH,
            lat,
            lon,
            urlencoding::encode(self.api_key()?),
            self.units.as_query(),
            urlencoding::encode(&self.lang),
        );

        let (status, body) = self.make_request(&url).await?;
        if !status.is_success() {
            return Err(WeatherAppError::api_with_context(
                format!("Weather request by coordinates failed: HTTP {} - {}", status.as_u16(), body),
                classify(status),
                HashMap::from([("coordinates".to_string(), format!("{lat:.4},{lon:.4}"))]),
            ));
        }
        parse_body(&body, "weather")
    }

    /// Geocode a place name; returns at most `limit` matches.
    ///
    /// A body that is not a JSON array is treated as "no matches".
    #[instrument(skip(self))]
    pub async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeocodingResult>> {
        let url = format!(
            "{}{}?q={}&limit={}&appid={}",
            self.base_url,
            GEOCODING_PATH,
            urlencoding::encode(query),
            limit,
            urlencoding::encode(self.api_key()?),
        );

        let (status, body) = self.make_request(&url).await?;
        check_status(status, &body)?;

        match serde_json::from_str::<Vec<GeocodingResult>>(&body) {
            Ok(results) => {
                debug!(
                    "Geocoding results: {:?}",
                    results
                        .iter()
                        .map(|r| format!("{} ({:.4}, {:.4})", r.name, r.lat, r.lon))
                        .collect::<Vec<_>>()
                );
                Ok(results)
            }
            Err(e) => {
                warn!("Unparsable geocoding response for '{}': {}", query, e);
                Ok(Vec::new())
            }
        }
    }

    /// Issue a GET and return status plus body text
    async fn make_request(&self, url: &str) -> Result<(StatusCode, String)> {
        let start_time = Instant::now();
        let redacted = redact_api_key(url);
        debug!("GET {}", redacted);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Network error for {}: {}", redacted, e);
            WeatherAppError::api_with_context(
                format!("Network error: {e}"),
                ErrorCode::ApiNetworkError,
                HashMap::from([("url".to_string(), redacted.clone())]),
            )
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let elapsed = start_time.elapsed();
        info!(
            "HTTP {} from {} in {:.3}s",
            status.as_u16(),
            redacted,
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
        }

        Ok((status, body))
    }
}

fn classify(status: StatusCode) -> ErrorCode {
    match status.as_u16() {
        401 => ErrorCode::ApiUnauthorized,
        404 => ErrorCode::ApiLocationNotFound,
        429 => ErrorCode::ApiRateLimit,
        _ => ErrorCode::ApiHttpError,
    }
}

/// Map a non-success status to an error carrying the response body
fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let context = HashMap::from([
        ("status_code".to_string(), status.as_u16().to_string()),
        ("body".to_string(), body.to_string()),
    ]);
    let code = classify(status);
    let message = match code {
        ErrorCode::ApiUnauthorized => {
            "401 Unauthorized: API key is invalid or not yet activated (check your OpenWeatherMap API key)"
                .to_string()
        }
        ErrorCode::ApiLocationNotFound => format!("404 Not Found - {body}"),
        ErrorCode::ApiRateLimit => format!("429 Too Many Requests - {body}"),
        _ => format!("HTTP {} - {}", status.as_u16(), body),
    };

    Err(WeatherAppError::api_with_context(message, code, context))
}

fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse {} response: {}", what, e);
        WeatherAppError::api(
            format!("Failed to parse {what} response: {e} - {body}"),
            ErrorCode::ApiInvalidResponse,
        )
    })
}

/// Replace the `appid` value so credentials never reach the logs
fn redact_api_key(url: &str) -> String {
    match url.split_once("appid=") {
        Some((head, tail)) => {
            let rest = tail.find('&').map_or("", |i| &tail[i..]);
            format!("{head}appid=***{rest}")
        }
        None => url.to_string(),
    }
}
