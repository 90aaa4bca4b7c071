use crate::{auth::JwtKeys, config::Config};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared per-request context: the pool, the config and the token keys.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let keys = JwtKeys::new(&config.jwt_secret, config.jwt_expiry_hours);
        Self {
            db,
            config: Arc::new(config),
            keys: Arc::new(keys),
        }
    }
}
