use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, CheckEmailQuery, EmailAvailability, LoginRequest, PublicUser,
            RefreshRequest, RegisterRequest, UpdateEmailRequest,
        },
        extractors::AuthUser,
        services,
    },
    error::AppError,
    extract::{Json, Query},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/update-email", put(update_email))
        .route("/auth/check-email", get(check_email))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = services::register(&state, payload).await?;
    Ok(Json(services::issue_tokens(&state, user, "Registration successful")?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = services::login(&state, payload).await?;
    Ok(Json(services::issue_tokens(&state, user, "Login successful")?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = services::refresh(&state, &payload.refresh_token).await?;
    Ok(Json(services::issue_tokens(&state, user, "Token refreshed")?))
}

#[instrument(skip(state, payload))]
pub async fn update_email(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateEmailRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = services::migrate_email(&state, user_id, &payload.new_email).await?;
    Ok(Json(services::issue_tokens(
        &state,
        user,
        "Email updated successfully",
    )?))
}

#[instrument(skip(state))]
pub async fn check_email(
    State(state): State<AppState>,
    Query(q): Query<CheckEmailQuery>,
) -> Result<Json<EmailAvailability>, AppError> {
    let available = services::is_email_available(&state, &q.email).await?;
    Ok(Json(EmailAvailability { available }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::current_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn public_user_serialization_has_no_secrets() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: "test".to_string(),
            created_at: time::macros::datetime!(2024-01-01 0:00 UTC),
            updated_at: time::macros::datetime!(2024-02-01 0:00 UTC),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"name\""));
        assert!(!json.contains("password"));
        assert!(json.contains("\"created_at\":\"2024-01-01T00:00:00Z\""));
        assert!(json.contains("\"updated_at\":\"2024-02-01T00:00:00Z\""));
    }
}
