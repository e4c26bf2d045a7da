use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    state::AppState,
    todos::{
        dto::TodoRequest,
        repo_types::{Todo, TodoFields, TodoFilter},
    },
};

const MAX_TITLE_LEN: usize = 255;

fn validate(req: TodoRequest) -> Result<TodoFields, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(TodoFields {
        title: title.to_string(),
        description,
        priority: req.priority,
    })
}

async fn ensure_user(st: &AppState, user_id: Uuid) -> Result<(), AppError> {
    match st.users.find_by_id(user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Loads a todo and checks it belongs to `user_id`.
async fn load_owned(st: &AppState, user_id: Uuid, todo_id: Uuid) -> Result<Todo, AppError> {
    let todo = st
        .todos
        .find_by_id(todo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
    if todo.owner_id != user_id {
        warn!(%user_id, %todo_id, "todo owned by another user");
        return Err(AppError::Unauthorized("Unauthorized access to todo".into()));
    }
    Ok(todo)
}

pub async fn list_todos(
    st: &AppState,
    user_id: Uuid,
    filter: TodoFilter,
) -> Result<Vec<Todo>, AppError> {
    ensure_user(st, user_id).await?;
    let todos = st.todos.list_by_owner(user_id, filter).await?;
    debug!(%user_id, count = todos.len(), "todos listed");
    Ok(todos)
}

pub async fn get_todo(st: &AppState, user_id: Uuid, todo_id: Uuid) -> Result<Todo, AppError> {
    load_owned(st, user_id, todo_id).await
}

pub async fn create_todo(
    st: &AppState,
    user_id: Uuid,
    req: TodoRequest,
) -> Result<Todo, AppError> {
    let fields = validate(req)?;
    ensure_user(st, user_id).await?;
    let todo = st.todos.insert(user_id, fields).await?;
    info!(%user_id, todo_id = %todo.id, "todo created");
    Ok(todo)
}

pub async fn update_todo(
    st: &AppState,
    user_id: Uuid,
    todo_id: Uuid,
    req: TodoRequest,
) -> Result<Todo, AppError> {
    let fields = validate(req)?;
    load_owned(st, user_id, todo_id).await?;
    st.todos
        .update(todo_id, fields)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
}

pub async fn toggle_todo(st: &AppState, user_id: Uuid, todo_id: Uuid) -> Result<Todo, AppError> {
    load_owned(st, user_id, todo_id).await?;
    st.todos
        .toggle(todo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
}

pub async fn delete_todo(st: &AppState, user_id: Uuid, todo_id: Uuid) -> Result<(), AppError> {
    load_owned(st, user_id, todo_id).await?;
    if !st.todos.delete(todo_id).await? {
        return Err(AppError::NotFound("Todo not found".into()));
    }
    info!(%user_id, %todo_id, "todo deleted");
    Ok(())
}
