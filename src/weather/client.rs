use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{config::ExternalApiConfig, error::AppError, weather::repo_types::NewWeatherSnapshot};

#[derive(Debug, Clone, Copy)]
pub enum WeatherQuery<'a> {
    City(&'a str),
    Coordinates { lat: f64, lng: f64 },
}

/// Current conditions as reported upstream, already reduced to the fields we keep.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Location name resolved by the API.
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl WeatherReport {
    pub fn into_snapshot(self, city: String) -> NewWeatherSnapshot {
        NewWeatherSnapshot {
            city,
            country: self.country,
            temperature: self.temperature,
            feels_like: self.feels_like,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            description: self.description,
            icon: self.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    sys: Option<SysBlock>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct SysBlock {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl CurrentWeatherResponse {
    fn into_report(self) -> Option<WeatherReport> {
        let main = self.main?;
        let first = self.weather.into_iter().next();
        Some(WeatherReport {
            city: self.name.filter(|n| !n.trim().is_empty()),
            country: self.sys.and_then(|s| s.country),
            temperature: main.temp,
            feels_like: main.feels_like,
            humidity: main.humidity,
            wind_speed: self.wind.map(|w| w.speed).unwrap_or_default(),
            description: first.as_ref().and_then(|c| c.description.clone()),
            icon: first.and_then(|c| c.icon),
        })
    }
}

/// Remote source of current weather.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Fails with [`AppError::Configuration`] when the API cannot be called.
    fn ensure_configured(&self) -> Result<(), AppError>;
    async fn current(&self, query: WeatherQuery<'_>) -> Result<WeatherReport, AppError>;
}

#[derive(Clone)]
pub struct WeatherApiClient {
    http: reqwest::Client,
    config: ExternalApiConfig,
}

impl WeatherApiClient {
    pub fn new(http: reqwest::Client, config: ExternalApiConfig) -> Self {
        Self { http, config }
    }

    fn credentials(&self) -> Result<(&str, &str), AppError> {
        self.config.credentials().ok_or_else(|| {
            AppError::Configuration(
                "Weather API not configured: set WEATHER_API_BASE_URL and a valid WEATHER_API_KEY"
                    .into(),
            )
        })
    }
}

#[async_trait]
impl WeatherApi for WeatherApiClient {
    fn ensure_configured(&self) -> Result<(), AppError> {
        self.credentials().map(|_| ())
    }

    async fn current(&self, query: WeatherQuery<'_>) -> Result<WeatherReport, AppError> {
        let (base_url, api_key) = self.credentials()?;

        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::City(city) => vec![("q", city.to_string())],
            WeatherQuery::Coordinates { lat, lng } => {
                vec![("lat", lat.to_string()), ("lon", lng.to_string())]
            }
        };
        params.push(("appid", api_key.to_string()));
        params.push(("units", "metric".to_string()));

        debug!(?query, "requesting current weather");
        let resp = self
            .http
            .get(format!("{base_url}/weather"))
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "weather api request failed");
                AppError::Upstream("Weather API request failed".into())
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("Weather API returned {status}")));
        }

        let body: CurrentWeatherResponse = resp.json().await.map_err(|e| {
            error!(error = %e, "weather api response not decodable");
            AppError::Upstream("Weather API returned a malformed response".into())
        })?;

        body.into_report().ok_or_else(|| {
            AppError::Upstream(match query {
                WeatherQuery::City(city) => format!("Failed to fetch weather data for city: {city}"),
                WeatherQuery::Coordinates { lat, lng } => {
                    format!("Failed to fetch weather data for coordinates: {lat}, {lng}")
                }
            })
        })
    }
}
