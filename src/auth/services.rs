use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{check_strength, hash_password, verify_password},
        repo_types::{EmailChange, NewUser, User},
    },
    error::AppError,
    state::AppState,
};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases `raw`, rejecting anything that is not an email.
fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    Ok(email)
}

/// Signs a fresh token pair for `user` and builds the auth response.
pub fn issue_tokens(st: &AppState, user: User, message: &str) -> Result<AuthResponse, AppError> {
    let pair = JwtKeys::from_ref(st).sign_pair(user.id)?;
    Ok(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: user.into(),
        message: message.to_string(),
    })
}

pub async fn register(st: &AppState, req: RegisterRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email)?;
    check_strength(&req.password)?;

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    let hash = hash_password(&req.password)?;

    let user = st
        .users
        .create(NewUser {
            email: &email,
            password_hash: &hash,
            name: &name,
        })
        .await?
        .ok_or_else(|| AppError::Conflict("Email already registered".into()))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(st: &AppState, req: LoginRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email)?;
    let invalid = || AppError::Unauthenticated("Invalid credentials".into());

    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };
    if !verify_password(&req.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(user)
}

/// Validates a refresh token and returns the user it was issued to.
pub async fn refresh(st: &AppState, refresh_token: &str) -> Result<User, AppError> {
    let claims = JwtKeys::from_ref(st)
        .verify_refresh(refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            AppError::Unauthenticated("Invalid refresh token".into())
        })?;
    current_user(st, claims.sub).await
}

pub async fn current_user(st: &AppState, user_id: Uuid) -> Result<User, AppError> {
    st.users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".into()))
}

/// Changes the login email of `user_id`. The user keeps its id, so every
/// todo stays attached; afterwards only `new_email` resolves to the account.
pub async fn migrate_email(
    st: &AppState,
    user_id: Uuid,
    new_email: &str,
) -> Result<User, AppError> {
    let new_email = normalize_email(new_email)?;

    match st.users.change_email(user_id, &new_email).await? {
        EmailChange::Changed(user) => {
            info!(user_id = %user.id, email = %user.email, "email changed");
            Ok(user)
        }
        EmailChange::UserMissing => Err(AppError::NotFound("User not found".into())),
        EmailChange::SameEmail => Err(AppError::BadRequest(
            "New email is the same as current email".into(),
        )),
        EmailChange::EmailTaken => {
            warn!(%user_id, email = %new_email, "email change to a taken address");
            Err(AppError::Conflict("User with this email already exists".into()))
        }
    }
}

/// `false` for anything that could not be registered, malformed input included.
pub async fn is_email_available(st: &AppState, email: &str) -> Result<bool, AppError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Ok(false);
    }
    Ok(st.users.find_by_email(&email).await?.is_none())
}
