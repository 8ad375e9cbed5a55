// src/store/attempts.rs

use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{Attempt, NewAttempt},
};

const ATTEMPT_COLUMNS: &str = "id, user_id, question_id, topic, difficulty, selected_option, \
     correct_option, is_correct, time_taken, attempted_at";

/// Appends one attempt. Correctness is derived from the two option indices.
///
/// Invalid attempts (negative or absurd time, empty topic) are rejected here so the
/// analytics never see them. A question position can be answered once per run;
/// a second answer is a conflict.
pub async fn record_attempt(pool: &SqlitePool, attempt: NewAttempt) -> Result<Attempt, AppError> {
    attempt
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let row = sqlx::query_as::<_, Attempt>(&format!(
        r#"
        INSERT INTO attempts (
            user_id, run_id, question_index, question_id, topic, difficulty,
            selected_option, correct_option, is_correct, time_taken, attempted_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        ATTEMPT_COLUMNS
    ))
    .bind(attempt.user_id)
    .bind(&attempt.run_id)
    .bind(attempt.question_index)
    .bind(&attempt.question_id)
    .bind(&attempt.topic)
    .bind(attempt.difficulty)
    .bind(attempt.selected_option)
    .bind(attempt.correct_option)
    .bind(attempt.is_correct())
    .bind(attempt.time_taken)
    .bind(attempt.attempted_at)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            AppError::Conflict(format!(
                "Question {} of this run was already answered",
                attempt.question_index + 1
            ))
        } else {
            tracing::error!("Failed to record attempt: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(row)
}

/// Lists a user's attempts, oldest first.
///
/// * `topic` restricts the result to one topic.
/// * `limit` keeps only the most recent `limit` attempts (still returned oldest first).
pub async fn list_attempts<'e, E>(
    executor: E,
    user_id: i64,
    topic: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Attempt>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM attempts WHERE user_id = ",
        ATTEMPT_COLUMNS
    ));
    query_builder.push_bind(user_id);

    if let Some(topic) = topic {
        query_builder.push(" AND topic = ").push_bind(topic.to_string());
    }

    query_builder.push(" ORDER BY attempted_at DESC, id DESC");

    if let Some(limit) = limit {
        query_builder.push(" LIMIT ").push_bind(limit.max(0));
    }

    let mut attempts: Vec<Attempt> = query_builder
        .build_query_as()
        .fetch_all(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attempts: {:?}", e);
            AppError::from(e)
        })?;

    attempts.reverse();
    Ok(attempts)
}

pub async fn has_attempts(pool: &SqlitePool, user_id: i64) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM attempts WHERE user_id = ?)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
