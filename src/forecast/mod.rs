//! Synthetic weather forecast

use axum::response::Json;
use chrono::{Days, Local, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of days covered by a forecast, starting tomorrow
pub const FORECAST_DAYS: u64 = 5;

/// Inclusive lower bound for generated temperatures (Celsius)
pub const MIN_TEMPERATURE_C: i32 = -20;

/// Exclusive upper bound for generated temperatures (Celsius)
pub const MAX_TEMPERATURE_C: i32 = 55;

pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: String,
}

impl ForecastEntry {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: &str) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: celsius_to_fahrenheit(temperature_c),
            summary: summary.to_string(),
        }
    }
}

/// `32 + C / 0.5556`, truncated toward zero
pub fn celsius_to_fahrenheit(celsius: i32) -> i32 {
    32 + (celsius as f64 / 0.5556) as i32
}

/// Build a forecast for the [`FORECAST_DAYS`] days following `today`.
pub fn generate_forecast<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<ForecastEntry> {
    (1..=FORECAST_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            let temperature_c = rng.gen_range(MIN_TEMPERATURE_C..MAX_TEMPERATURE_C);
            let summary = SUMMARIES.choose(&mut *rng).copied().unwrap_or(SUMMARIES[0]);
            ForecastEntry::new(date, temperature_c, summary)
        })
        .collect()
}

/// GET /weatherforecast
pub async fn weather_forecast() -> Json<Vec<ForecastEntry>> {
    let today = Local::now().date_naive();
    let forecast = generate_forecast(today, &mut rand::thread_rng());
    debug!(days = forecast.len(), "Weather forecast generated");
    Json(forecast)
}
