use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::todos::repo_types::{Todo, TodoFields, TodoFilter, TodoRow};

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Todos of `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid, filter: TodoFilter) -> anyhow::Result<Vec<Todo>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>>;
    async fn insert(&self, owner_id: Uuid, fields: TodoFields) -> anyhow::Result<Todo>;
    async fn update(&self, id: Uuid, fields: TodoFields) -> anyhow::Result<Option<Todo>>;
    /// Flips `completed` in a single statement.
    async fn toggle(&self, id: Uuid) -> anyhow::Result<Option<Todo>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const TODO_COLUMNS: &str =
    "id, owner_id, title, description, priority, completed, created_at, updated_at";

fn convert(row: Option<TodoRow>) -> anyhow::Result<Option<Todo>> {
    row.map(Todo::try_from).transpose()
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list_by_owner(&self, owner_id: Uuid, filter: TodoFilter) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
              FROM todos
             WHERE owner_id = $1
               AND ($2::BOOLEAN IS NULL OR completed = $2)
               AND ($3::TEXT IS NULL OR priority = $3)
             ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .bind(filter.completed)
        .bind(filter.priority.map(|p| p.as_str()))
        .fetch_all(&self.db)
        .await
        .context("list todos by owner")?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find todo")?;
        convert(row)
    }

    async fn insert(&self, owner_id: Uuid, fields: TodoFields) -> anyhow::Result<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            INSERT INTO todos (id, owner_id, title, description, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.priority.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert todo")?;
        Todo::try_from(row)
    }

    async fn update(&self, id: Uuid, fields: TodoFields) -> anyhow::Result<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            UPDATE todos
               SET title = $2, description = $3, priority = $4, updated_at = now()
             WHERE id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.priority.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update todo")?;
        convert(row)
    }

    async fn toggle(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            UPDATE todos
               SET completed = NOT completed, updated_at = now()
             WHERE id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("toggle todo")?;
        convert(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete todo")?;
        Ok(res.rows_affected() > 0)
    }
}
