// src/state.rs

use crate::{config::Config, questions::QuestionSupplier};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub supplier: QuestionSupplier,
}

impl AppState {
    /// Builds the state, wiring the question supplier from the AI settings.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let supplier = QuestionSupplier::from_config(&config.ai);
        Self {
            pool,
            config,
            supplier,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuestionSupplier {
    fn from_ref(state: &AppState) -> Self {
        state.supplier.clone()
    }
}
