use anyhow::{Context, Result, ensure};
use axum::http::HeaderValue;
use dotenvy::dotenv;
use std::{env, str::FromStr};
use validator::ValidateEmail;

/// Tokens live at most a year.
pub const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub cors_origin: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let cors_origin = optional("CORS_ORIGIN");
        if let Some(origin) = &cors_origin {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("CORS_ORIGIN is not a valid origin: {origin:?}"))?;
        }

        let admin_email = optional("ADMIN_EMAIL").map(|email| email.trim().to_string());
        if let Some(email) = &admin_email {
            ensure!(
                email.validate_email(),
                "ADMIN_EMAIL is not a valid email address: {email:?}"
            );
        }

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parsed("SERVER_PORT", 3000)?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 20)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_hours: expiry_hours(parsed("JWT_EXPIRY_HOURS", 24)?)?,
            cors_origin,
            admin_username: optional("ADMIN_USERNAME"),
            admin_password: optional("ADMIN_PASSWORD"),
            admin_email,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn expiry_hours(hours: i64) -> Result<i64> {
    ensure!(
        (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours),
        "JWT_EXPIRY_HOURS must be between 1 and {MAX_JWT_EXPIRY_HOURS}, got {hours}"
    );
    Ok(hours)
}
