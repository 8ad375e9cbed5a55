// src/models/question.rs

use serde::{Deserialize, Serialize};

use crate::models::attempt::Difficulty;

/// Where a question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// The built-in question bank used by the static quiz.
    StaticBank,
    /// The static bank, served because AI generation was unavailable.
    StaticFallback,
    /// Produced by the AI generator.
    Generated,
}

/// A multiple-choice question, whatever its origin.
/// Static and generated questions share this exact shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub topic: String,
    pub difficulty: Difficulty,

    /// The text content of the question.
    pub text: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_option: usize,

    /// Explanation of the correct answer.
    pub explanation: String,

    pub source: QuestionSource,
}

/// DTO for sending question to client (excludes answer and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            topic: q.topic.clone(),
            difficulty: q.difficulty,
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}
