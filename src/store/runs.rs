// src/store/runs.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::{
        question::Question,
        quiz::{QuizMode, QuizRun},
    },
    questions::FallbackReason,
};

#[derive(FromRow)]
struct RunRow {
    id: String,
    user_id: i64,
    mode: QuizMode,
    questions: Json<Vec<Question>>,
    fallback: Option<Json<FallbackReason>>,
    finished_at: Option<DateTime<Utc>>,
}

impl From<RunRow> for QuizRun {
    fn from(row: RunRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            mode: row.mode,
            questions: row.questions.0,
            fallback: row.fallback.map(|f| f.0),
            finished: row.finished_at.is_some(),
        }
    }
}

/// What was actually recorded for a run, independent of any client token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RunTally {
    pub answered: i64,
    pub correct: i64,
    pub total_time: i64,
}

pub async fn create_run(pool: &SqlitePool, run: &QuizRun) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_runs (id, user_id, mode, questions, fallback, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&run.id)
    .bind(run.user_id)
    .bind(run.mode)
    .bind(Json(&run.questions))
    .bind(run.fallback.as_ref().map(Json))
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store quiz run: {:?}", e);
        AppError::from(e)
    })?;

    Ok(())
}

/// Loads a run owned by `user_id`.
pub async fn find_run(pool: &SqlitePool, run_id: &str, user_id: i64) -> Result<QuizRun, AppError> {
    let row = sqlx::query_as::<_, RunRow>(
        r#"
        SELECT id, user_id, mode, questions, fallback, finished_at
        FROM quiz_runs
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(run_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Quiz run '{}' not found", run_id)))?;

    Ok(row.into())
}

/// Marks a run finished. A run can be finished once; later calls are a conflict.
pub async fn mark_finished<'e, E>(executor: E, run_id: &str) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE quiz_runs SET finished_at = ? WHERE id = ? AND finished_at IS NULL",
    )
    .bind(Utc::now())
    .bind(run_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Quiz run is already finished".to_string(),
        ));
    }
    Ok(())
}

/// Counts the attempts stored for a run.
pub async fn tally<'e, E>(executor: E, run_id: &str) -> Result<RunTally, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let tally = sqlx::query_as::<_, RunTally>(
        r#"
        SELECT
            COUNT(*) AS answered,
            COALESCE(SUM(is_correct), 0) AS correct,
            COALESCE(SUM(time_taken), 0) AS total_time
        FROM attempts
        WHERE run_id = ?
        "#,
    )
    .bind(run_id)
    .fetch_one(executor)
    .await?;

    Ok(tally)
}
