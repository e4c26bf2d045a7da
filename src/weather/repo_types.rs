use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Point-in-time copy of the remote weather for one city.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WeatherSnapshot {
    pub id: Uuid,
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWeatherSnapshot {
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
}
