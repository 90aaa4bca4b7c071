// src/handlers/user.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    extract::AppJson,
    models::{AuthResponse, LoginRequest, RegisterRequest, User, UserPublic},
    services::user::{hash_password, validate_registration},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use bcrypt::verify;
use tracing::info;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid registration details"),
        (status = 409, description = "Username or email already exists"),
    ),
    tag = "Auth"
)]
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_registration(&body)?;

    let username = body.username.trim();
    let email = body.email.trim();

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM users WHERE username = $1 OR email = $2",
    )
    .bind(username)
    .bind(email)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&body.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (username, password_hash, full_name, email, role)
           VALUES ($1, $2, $3, $4, 'user')
           RETURNING *"#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(body.full_name.trim())
    .bind(email)
    .fetch_one(&state.db)
    .await?;

    let token = state.keys.issue(user.id, &user.username, user.role)?;

    info!("User '{}' registered", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(body.username.trim())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = state.keys.issue(user.id, &user.username, user.role)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "User profile", body = UserPublic),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn get_current_user(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserPublic>> {
    let user = sqlx::query_as::<_, UserPublic>(
        "SELECT id, username, full_name, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(auth.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
