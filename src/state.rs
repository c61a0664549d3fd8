use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::users::{PgUserRepo, UserRepo};
use anyhow::Context;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub keys: JwtKeys,
}

impl AppState {
    /// Connects to Postgres and wires the production store. The pool is
    /// returned too so the caller can run migrations on it.
    pub async fn init(config: &AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let users = Arc::new(PgUserRepo::new(db.clone())) as Arc<dyn UserRepo>;
        Ok((Self::from_parts(users, config), db))
    }

    pub fn from_parts(users: Arc<dyn UserRepo>, config: &AppConfig) -> Self {
        Self {
            users,
            keys: JwtKeys::new(&config.jwt),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
