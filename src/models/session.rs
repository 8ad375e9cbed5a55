// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::quiz::QuizMode;

/// Represents the 'quiz_sessions' table in the database.
/// Written once when a quiz run completes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub user_id: i64,
    pub run_id: String,
    pub mode: QuizMode,
    pub total_questions: i64,
    pub correct_count: i64,

    /// Percentage in [0, 100].
    pub accuracy: f64,

    /// Seconds. Always zero for adaptive runs when time tracking is disabled.
    pub total_time: i64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSessionSummary {
    pub user_id: i64,
    pub run_id: String,
    pub mode: QuizMode,
    pub total_questions: i64,
    pub correct_count: i64,
    pub total_time: i64,
    pub completed_at: DateTime<Utc>,
}

impl NewSessionSummary {
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.correct_count as f64 * 100.0 / self.total_questions as f64
    }
}
