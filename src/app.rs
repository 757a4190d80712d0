//! Search handler wiring input, lookup and view together

use crate::config::AppConfig;
use crate::lookup::WeatherLookup;
use crate::view::{ViewState, WeatherPanel};
use crate::Result;
use tracing::debug;

pub struct App {
    lookup: WeatherLookup,
    view: ViewState,
    icon_base_url: String,
}

impl App {
    pub fn new(lookup: WeatherLookup, icon_base_url: impl Into<String>) -> Self {
        Self {
            lookup,
            view: ViewState::new(),
            icon_base_url: icon_base_url.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            WeatherLookup::from_config(config)?,
            config.weather.icon_base_url.clone(),
        ))
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Handle one submitted input. Blank input is ignored and returns `false`.
    pub async fn handle_search(&mut self, input: &str) -> bool {
        let city = input.trim();
        if city.is_empty() {
            return false;
        }

        self.view.begin_search();
        match self.lookup.get_weather(city).await {
            Ok(report) => {
                let panel = WeatherPanel::from_report(&report, &self.icon_base_url);
                self.view.show_results(panel);
            }
            Err(e) => {
                debug!("Lookup failed: {}", e);
                self.view.show_error(e.user_message());
            }
        }
        true
    }
}
