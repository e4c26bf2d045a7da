use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    extract::{Json, Query},
    state::AppState,
    weather::{
        dto::{WeatherParams, WeatherResponse},
        services,
    },
};

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(get_weather))
}

/// Coordinates win when both `lat` and `lng` are given; otherwise `city` is required.
#[instrument(skip(state))]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherResponse>, AppError> {
    let snapshot = match params {
        WeatherParams {
            lat: Some(lat),
            lng: Some(lng),
            ..
        } => services::weather_by_coordinates(&state, lat, lng).await?,
        WeatherParams {
            city: Some(city), ..
        } if !city.trim().is_empty() => services::weather_by_city(&state, &city).await?,
        _ => {
            return Err(AppError::BadRequest(
                "Provide either city or both lat and lng".into(),
            ))
        }
    };
    Ok(Json(snapshot.into()))
}
