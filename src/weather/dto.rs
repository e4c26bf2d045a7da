use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::weather::repo_types::WeatherSnapshot;

/// `GET /weather?city=` or `GET /weather?lat=&lng=`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<WeatherSnapshot> for WeatherResponse {
    fn from(s: WeatherSnapshot) -> Self {
        Self {
            city: s.city,
            country: s.country,
            temperature: s.temperature,
            feels_like: s.feels_like,
            humidity: s.humidity,
            wind_speed: s.wind_speed,
            description: s.description,
            icon: s.icon,
            created_at: s.created_at,
        }
    }
}
