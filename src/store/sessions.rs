// src/store/sessions.rs

use sqlx::{Executor, Sqlite};

use crate::{
    error::AppError,
    models::session::{NewSessionSummary, SessionSummary},
};

const SESSION_COLUMNS: &str = "id, user_id, run_id, mode, total_questions, correct_count, \
     accuracy, total_time, completed_at";

/// Stores the summary of a run. Each run gets at most one summary.
pub async fn record_session<'e, E>(
    executor: E,
    session: NewSessionSummary,
) -> Result<SessionSummary, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SessionSummary>(&format!(
        r#"
        INSERT INTO quiz_sessions (
            user_id, run_id, mode, total_questions, correct_count, accuracy, total_time,
            completed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SESSION_COLUMNS
    ))
    .bind(session.user_id)
    .bind(&session.run_id)
    .bind(session.mode)
    .bind(session.total_questions)
    .bind(session.correct_count)
    .bind(session.accuracy())
    .bind(session.total_time)
    .bind(session.completed_at)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            AppError::Conflict("Quiz run already has a summary".to_string())
        } else {
            tracing::error!("Failed to record quiz session: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(row)
}

/// Most recent sessions, newest first.
pub async fn list_recent_sessions<'e, E>(
    executor: E,
    user_id: i64,
    limit: i64,
) -> Result<Vec<SessionSummary>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sessions = sqlx::query_as::<_, SessionSummary>(&format!(
        r#"
        SELECT {}
        FROM quiz_sessions
        WHERE user_id = ?
        ORDER BY completed_at DESC, id DESC
        LIMIT ?
        "#,
        SESSION_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

/// The last `limit` sessions in chronological order, for trend charts.
pub async fn list_session_trend<'e, E>(
    executor: E,
    user_id: i64,
    limit: i64,
) -> Result<Vec<SessionSummary>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut sessions = list_recent_sessions(executor, user_id, limit).await?;
    sessions.reverse();
    Ok(sessions)
}
