// src/handlers/practice.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    analytics::practice::PracticeState,
    error::AppError,
    models::analytics::PracticeResponse,
    store::attempts,
    utils::jwt::Claims,
};

/// Practice entry point: first-timers go to the static quiz, returning users to
/// their recommendations. Evaluated fresh on every request.
pub async fn practice_entry(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let state = PracticeState::from_history(attempts::has_attempts(&pool, user_id).await?);
    let route = state.route();

    Ok(Json(PracticeResponse {
        state,
        route,
        next: route.next_endpoint(),
    }))
}
