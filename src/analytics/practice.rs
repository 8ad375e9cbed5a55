// src/analytics/practice.rs

use serde::Serialize;

/// Whether the user has answered anything yet. Re-derived on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeState {
    NoHistory,
    HasHistory,
}

/// Where the practice entry point sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeRoute {
    StaticQuiz,
    Recommendations,
}

impl PracticeState {
    pub fn from_history(has_attempts: bool) -> Self {
        if has_attempts {
            PracticeState::HasHistory
        } else {
            PracticeState::NoHistory
        }
    }

    pub fn route(self) -> PracticeRoute {
        match self {
            PracticeState::NoHistory => PracticeRoute::StaticQuiz,
            PracticeState::HasHistory => PracticeRoute::Recommendations,
        }
    }
}

impl PracticeRoute {
    /// API endpoint the client should call next.
    pub fn next_endpoint(self) -> &'static str {
        match self {
            PracticeRoute::StaticQuiz => "/api/quiz/start",
            PracticeRoute::Recommendations => "/api/analytics/recommendations",
        }
    }
}
