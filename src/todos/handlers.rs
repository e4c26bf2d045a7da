use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::{Json, Path, Query},
    state::AppState,
    todos::{
        dto::{TodoListQuery, TodoRequest, TodoResponse},
        services,
    },
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/:id/toggle", patch(toggle_todo))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<TodoListQuery>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let todos = services::list_todos(&state, user_id, q.into()).await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = services::get_todo(&state, user_id, id).await?;
    Ok(Json(todo.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    let todo = services::create_todo(&state, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TodoRequest>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = services::update_todo(&state, user_id, id, payload).await?;
    Ok(Json(todo.into()))
}

#[instrument(skip(state))]
pub async fn toggle_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = services::toggle_todo(&state, user_id, id).await?;
    Ok(Json(todo.into()))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_todo(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
