// src/services/user.rs

use crate::{
    errors::{AppError, AppResult, Violations},
    models::RegisterRequest,
};
use bcrypt::{DEFAULT_COST, hash};
use sqlx::PgPool;
use tracing::info;
use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_registration(body: &RegisterRequest) -> AppResult<()> {
    Violations::new()
        .require_text(&body.username, "username")
        .check(
            body.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "must be at least 6 characters",
        )
        .require_text(&body.full_name, "full_name")
        .check(
            body.email.trim().to_string().validate_email(),
            "email",
            "must be a valid email address",
        )
        .finish()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))
}

/// Creates the bootstrap admin, or resets its password if it already exists.
///
/// A new admin gets `email`, or `<username>@localhost` when none is set. An
/// existing admin keeps the email it has.
pub async fn ensure_admin(
    db: &PgPool,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> AppResult<()> {
    let password_hash = hash_password(password)?;
    let email = email.map_or_else(|| format!("{username}@localhost"), str::to_string);

    let created = sqlx::query_scalar::<_, bool>(
        r#"INSERT INTO users (username, password_hash, full_name, email, role)
           VALUES ($1, $2, 'System Administrator', $3, 'admin')
           ON CONFLICT (username) DO UPDATE
           SET password_hash = EXCLUDED.password_hash, role = 'admin'
           RETURNING (xmax = 0)"#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(&email)
    .fetch_one(db)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(format!(
            "Email {email} already belongs to another user; set ADMIN_EMAIL to a free address"
        )),
        other => other,
    })?;

    if created {
        info!("Bootstrap admin '{}' created", username);
    } else {
        info!("Bootstrap admin '{}' password reset", username);
    }

    Ok(())
}
