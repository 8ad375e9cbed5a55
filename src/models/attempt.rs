// src/models/attempt.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Ordinal difficulty of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Capitalised label used in prompts ("Easy", "Medium", "Hard").
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Represents the 'attempts' table in the database.
/// One answered question; rows are never updated once written.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,

    /// Static bank ids are numeric strings, generated questions carry `ai_<topic>_<n>`.
    pub question_id: String,

    pub topic: String,
    pub difficulty: Difficulty,
    pub selected_option: i64,
    pub correct_option: i64,
    pub is_correct: bool,

    /// Seconds spent on the question. Zero is a valid (instant) answer.
    pub time_taken: i64,

    pub attempted_at: DateTime<Utc>,
}

/// Write-side shape of an attempt. Correctness is derived, never supplied.
#[derive(Debug, Clone, Validate)]
pub struct NewAttempt {
    pub user_id: i64,
    #[validate(length(min = 1, max = 64))]
    pub run_id: String,
    /// Position of the question within its run; unique per run.
    #[validate(range(min = 0))]
    pub question_index: i64,
    #[validate(length(min = 1, max = 200))]
    pub question_id: String,
    #[validate(length(min = 1, max = 100))]
    pub topic: String,
    pub difficulty: Difficulty,
    #[validate(range(min = 0))]
    pub selected_option: i64,
    #[validate(range(min = 0))]
    pub correct_option: i64,
    #[validate(range(min = 0, max = 86400))]
    pub time_taken: i64,
    pub attempted_at: DateTime<Utc>,
}

impl NewAttempt {
    pub fn is_correct(&self) -> bool {
        self.selected_option == self.correct_option
    }
}

/// Query parameters for listing attempt history.
#[derive(Debug, Deserialize, Validate)]
pub struct AttemptListParams {
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}
