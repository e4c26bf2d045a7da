use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. `id` is the stable key; `email` is the
/// login identity and may change over the account's lifetime.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 hash, never leaves the service layer
    pub name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
}

/// Outcome of an email change, decided inside a single transaction.
#[derive(Debug)]
pub enum EmailChange {
    Changed(User),
    UserMissing,
    SameEmail,
    EmailTaken,
}
