use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::todos::repo_types::{Priority, Todo, TodoFilter};

/// Body of `POST /todos` and `PUT /todos/:id`.
#[derive(Debug, Deserialize)]
pub struct TodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoListQuery {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl From<TodoListQuery> for TodoFilter {
    fn from(q: TodoListQuery) -> Self {
        Self {
            completed: q.completed,
            priority: q.priority,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Todo> for TodoResponse {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            priority: t.priority,
            completed: t.completed,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
