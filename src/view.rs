//! Result panel and error banner
//!
//! The widget has a fixed set of labelled output fields plus one error
//! banner. A search hides both; exactly one of them is shown afterwards.

use std::fmt;

use crate::models::WeatherReport;

/// The labelled output fields of one successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPanel {
    pub city_name: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind_speed: String,
    pub icon_url: Option<String>,
    pub icon_alt: String,
    /// Fetch time, `HH:MM UTC`
    pub updated: String,
}

impl WeatherPanel {
    /// Fill the output fields from a report
    #[must_use]
    pub fn from_report(report: &WeatherReport, icon_base_url: &str) -> Self {
        let weather = &report.weather;
        let condition = weather.primary_condition();
        let description = condition
            .map(|c| c.description.clone())
            .unwrap_or_default();

        Self {
            city_name: report.display_name().to_string(),
            temperature: format!(
                "{}{}",
                weather.main.temp.round() as i64,
                report.units.temperature_symbol()
            ),
            humidity: format!("{}%", weather.main.humidity),
            wind_speed: format!(
                "{:.1} {}",
                weather.wind.speed,
                report.units.wind_speed_unit()
            ),
            icon_url: condition.map(|c| icon_url(icon_base_url, &c.icon)),
            icon_alt: description.clone(),
            description,
            updated: report.fetched_at.format("%H:%M UTC").to_string(),
        }
    }
}

/// `<base>/<icon>@2x.png`
#[must_use]
pub fn icon_url(base: &str, icon: &str) -> String {
    format!("{}/{}@2x.png", base.trim_end_matches('/'), icon)
}

impl fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.city_name)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Conditions:  {}", self.description)?;
        writeln!(f, "  Humidity:    {}", self.humidity)?;
        writeln!(f, "  Wind:        {}", self.wind_speed)?;
        if let Some(url) = &self.icon_url {
            writeln!(f, "  Icon:        {} ({})", url, self.icon_alt)?;
        }
        writeln!(f, "  Updated:     {}", self.updated)?;
        Ok(())
    }
}

/// Visibility of the result panel and the error banner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    results: Option<WeatherPanel>,
    error: Option<String>,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide results and error before a new search
    pub fn begin_search(&mut self) {
        self.results = None;
        self.error = None;
    }

    pub fn show_results(&mut self, panel: WeatherPanel) {
        self.error = None;
        self.results = Some(panel);
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.results = None;
        self.error = Some(message.into());
    }

    /// Visible result panel, if any
    #[must_use]
    pub fn results(&self) -> Option<&WeatherPanel> {
        self.results.as_ref()
    }

    /// Visible error banner text, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn results_hidden(&self) -> bool {
        self.results.is_none()
    }

    #[must_use]
    pub fn error_hidden(&self) -> bool {
        self.error.is_none()
    }

    /// Write whichever element is visible: the panel to `out`, the banner to `err`
    pub fn render(
        &self,
        out: &mut impl std::io::Write,
        err: &mut impl std::io::Write,
    ) -> std::io::Result<()> {
        if let Some(panel) = &self.results {
            write!(out, "{panel}")?;
        }
        if let Some(message) = &self.error {
            writeln!(err, "{message}")?;
        }
        Ok(())
    }
}
