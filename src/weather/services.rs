use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::{
    error::AppError,
    state::AppState,
    weather::{client::WeatherQuery, repo_types::WeatherSnapshot},
};

/// How long a stored snapshot is served before the API is asked again.
pub const FRESHNESS_WINDOW: Duration = Duration::minutes(30);

/// Returns the cached snapshot for `city` if it is younger than
/// [`FRESHNESS_WINDOW`], otherwise fetches, stores and returns a new one.
pub async fn weather_by_city(st: &AppState, city: &str) -> Result<WeatherSnapshot, AppError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::BadRequest("city must not be empty".into()));
    }
    st.weather_api.ensure_configured()?;

    let since = OffsetDateTime::now_utc() - FRESHNESS_WINDOW;
    if let Some(snapshot) = st.weather.latest_since(city, since).await? {
        debug!(city, snapshot_id = %snapshot.id, "weather cache hit");
        return Ok(snapshot);
    }

    let report = st.weather_api.current(WeatherQuery::City(city)).await?;
    let snapshot = st.weather.insert(report.into_snapshot(city.to_string())).await?;
    info!(city, snapshot_id = %snapshot.id, "weather snapshot stored");
    Ok(snapshot)
}

/// Always fetches; the location name returned upstream becomes the cache key.
pub async fn weather_by_coordinates(
    st: &AppState,
    lat: f64,
    lng: f64,
) -> Result<WeatherSnapshot, AppError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::BadRequest("lat/lng out of range".into()));
    }

    let report = st
        .weather_api
        .current(WeatherQuery::Coordinates { lat, lng })
        .await?;
    let city = report.city.clone().ok_or_else(|| {
        AppError::Upstream(format!(
            "Weather API returned no location name for coordinates: {lat}, {lng}"
        ))
    })?;

    let snapshot = st.weather.insert(report.into_snapshot(city)).await?;
    info!(city = %snapshot.city, lat, lng, "weather snapshot stored");
    Ok(snapshot)
}
