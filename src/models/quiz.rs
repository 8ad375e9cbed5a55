// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{PublicQuestion, Question, QuestionSource},
        session::SessionSummary,
    },
    questions::supplier::FallbackReason,
};

/// Which quiz flow a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QuizMode {
    /// The shuffled static bank.
    Static,
    /// Questions targeted at the user's weak areas.
    Adaptive,
}

/// A started quiz run, kept server-side.
///
/// The question set (answer key included) never leaves the server; clients only
/// hold a [`QuizContext`] token that points at the run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRun {
    pub id: String,
    pub user_id: i64,
    pub mode: QuizMode,
    pub questions: Vec<Question>,
    /// Set when the question set was served from the static bank instead of the generator.
    pub fallback: Option<FallbackReason>,
    pub finished: bool,
}

impl QuizRun {
    pub fn new(
        user_id: i64,
        mode: QuizMode,
        questions: Vec<Question>,
        fallback: Option<FallbackReason>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            mode,
            questions,
            fallback,
            finished: false,
        }
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// Progress through one quiz run.
///
/// A context is never modified in place: answering consumes it and yields the
/// next one. Between requests it travels as a signed token (see `utils::jwt`),
/// so it carries only the run id and counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizContext {
    pub run_id: String,
    pub user_id: i64,
    pub mode: QuizMode,
    pub total_questions: usize,
    pub current_index: usize,
    pub correct_count: usize,
    pub total_time: i64,
}

/// Result of answering the current question of a context.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub question: Question,
    pub question_index: usize,
    pub selected_option: usize,
    pub is_correct: bool,
    pub time_taken: i64,
}

impl QuizContext {
    pub fn new(run: &QuizRun) -> Self {
        Self {
            run_id: run.id.clone(),
            user_id: run.user_id,
            mode: run.mode,
            total_questions: run.questions.len(),
            current_index: 0,
            correct_count: 0,
            total_time: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.total_questions
    }

    /// Number of questions answered so far.
    pub fn answered(&self) -> usize {
        self.current_index.min(self.total_questions)
    }

    /// Answers the current question of `run` and returns the advanced context.
    ///
    /// `question_id` must name the current question.
    pub fn answer(
        self,
        run: &QuizRun,
        question_id: &str,
        selected_option: usize,
        time_taken: i64,
    ) -> Result<(QuizContext, AnswerOutcome), AppError> {
        if run.id != self.run_id {
            return Err(AppError::BadRequest(
                "Quiz context does not belong to this run".to_string(),
            ));
        }

        let question = run
            .question(self.current_index)
            .cloned()
            .ok_or_else(|| AppError::BadRequest("Quiz is already complete".to_string()))?;

        if question.id != question_id {
            return Err(AppError::BadRequest(format!(
                "Question '{}' is not the current question",
                question_id
            )));
        }
        if selected_option >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "Option {} does not exist for question '{}'",
                selected_option, question_id
            )));
        }
        if time_taken < 0 {
            return Err(AppError::BadRequest(
                "Time taken cannot be negative".to_string(),
            ));
        }

        let is_correct = selected_option == question.correct_option;
        let question_index = self.current_index;
        let next = QuizContext {
            current_index: self.current_index + 1,
            correct_count: self.correct_count + usize::from(is_correct),
            total_time: self.total_time + time_taken,
            ..self
        };

        Ok((
            next,
            AnswerOutcome {
                question,
                question_index,
                selected_option,
                is_correct,
                time_taken,
            },
        ))
    }
}

/// DTO for starting a quiz run.
#[derive(Debug, Deserialize, Validate)]
pub struct StartQuizRequest {
    pub mode: QuizMode,

    /// Adaptive only: practice this topic instead of the detected weakest one.
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
}

/// Returned when a run starts: the token to send back plus the first question.
#[derive(Debug, Serialize)]
pub struct QuizStepResponse {
    pub context_token: String,
    pub mode: QuizMode,
    pub current_question_num: usize,
    pub total_questions: usize,
    pub question: Option<PublicQuestion>,
    pub source: Option<QuestionSource>,
    pub fallback_reason: Option<FallbackReason>,
    pub expires_in: u64, // seconds
}

/// DTO for answering the current question.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1))]
    pub context_token: String,
    #[validate(length(min = 1, max = 200))]
    pub question_id: String,
    #[validate(range(min = 0, max = 25))]
    pub selected_option: i64,
    #[validate(range(min = 0, max = 86400))]
    pub time_taken: i64,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub is_correct: bool,
    pub correct_option: usize,
    pub explanation: String,
    pub finished: bool,
    pub context_token: String,
    pub current_question_num: usize,
    pub total_questions: usize,
    pub next_question: Option<PublicQuestion>,
}

/// DTO for closing a run.
#[derive(Debug, Deserialize, Validate)]
pub struct FinishQuizRequest {
    #[validate(length(min = 1))]
    pub context_token: String,
}

#[derive(Debug, Serialize)]
pub struct QuizSummaryResponse {
    pub mode: QuizMode,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub answered: usize,
    /// Percentage in [0, 100].
    pub accuracy: f64,
    pub total_time: i64,
    pub avg_time: f64,
    /// The stored summary; `None` when the run had no answers.
    pub session: Option<SessionSummary>,
}
