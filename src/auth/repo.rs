use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::repo_types::{EmailChange, NewUser, User},
    db::is_unique_violation,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Inserts a user; `Ok(None)` when the email is already registered.
    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<User>>;
    /// Replaces the login email of `id` in place. Owned records keep
    /// pointing at the same `id`.
    async fn change_email(&self, id: Uuid, new_email: &str) -> anyhow::Result<EmailChange>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<User>> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(u) => Ok(Some(u)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("insert user"),
        }
    }

    async fn change_email(&self, id: Uuid, new_email: &str) -> anyhow::Result<EmailChange> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let current = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock user")?;

        let Some(current) = current else {
            return Ok(EmailChange::UserMissing);
        };
        if current.email == new_email {
            return Ok(EmailChange::SameEmail);
        }

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(new_email)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("check email owner")?;
        if taken {
            return Ok(EmailChange::EmailTaken);
        }

        // The unique index still guards against a concurrent writer.
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email = $2, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(new_email)
        .fetch_one(&mut *tx)
        .await;

        let user = match updated {
            Ok(u) => u,
            Err(e) if is_unique_violation(&e) => return Ok(EmailChange::EmailTaken),
            Err(e) => return Err(e).context("update user email"),
        };

        tx.commit().await.context("commit tx")?;
        debug!(user_id = %id, "email changed");
        Ok(EmailChange::Changed(user))
    }
}
