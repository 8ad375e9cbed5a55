// src/handlers/attempts.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError, models::attempt::AttemptListParams, store::attempts, utils::jwt::Claims,
};

/// Lists the current user's attempt history, oldest first.
pub async fn list_my_attempts(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<AttemptListParams>,
) -> Result<impl IntoResponse, AppError> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.user_id()?;

    let list = attempts::list_attempts(&pool, user_id, params.topic.as_deref(), params.limit).await?;

    Ok(Json(list))
}
