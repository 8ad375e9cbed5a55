// src/handlers/analytics.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    analytics::{analyze, build_report, dashboard::build_dashboard},
    config::Config,
    error::AppError,
    models::analytics::WeakAreasResponse,
    store::{attempts, sessions},
    utils::jwt::Claims,
};

const TREND_SESSIONS: i64 = 10;
const RECENT_SESSIONS: i64 = 5;

/// Ranked weak-area analysis with grouped recommendations.
pub async fn weak_areas(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let history = attempts::list_attempts(&pool, user_id, None, None).await?;

    let analysis = analyze(&history, &config.analytics);

    Ok(Json(WeakAreasResponse {
        topics: analysis.records,
        recommendations: build_report(analysis.recommendations),
    }))
}

/// Personalised recommendations, grouped by priority tier.
pub async fn recommendations(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let history = attempts::list_attempts(&pool, user_id, None, None).await?;

    let analysis = analyze(&history, &config.analytics);

    Ok(Json(build_report(analysis.recommendations)))
}

/// Overall statistics, per-topic accuracy and session trend.
///
/// All three reads share one transaction so they see the same snapshot.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;
    let history = attempts::list_attempts(&mut *tx, user_id, None, None).await?;
    let trend = sessions::list_session_trend(&mut *tx, user_id, TREND_SESSIONS).await?;
    let recent = sessions::list_recent_sessions(&mut *tx, user_id, RECENT_SESSIONS).await?;
    tx.commit().await?;

    let analysis = analyze(&history, &config.analytics);

    Ok(Json(build_dashboard(&history, &analysis.records, &trend, recent)))
}
