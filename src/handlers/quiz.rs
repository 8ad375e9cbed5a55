// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use rand::seq::SliceRandom;
use validator::Validate;

use crate::{
    analytics::{analyze, target::adaptive_target},
    error::AppError,
    models::{
        attempt::{Difficulty, NewAttempt},
        question::{PublicQuestion, Question},
        quiz::{
            AnswerRequest, AnswerResponse, FinishQuizRequest, QuizContext, QuizMode, QuizRun,
            QuizStepResponse, QuizSummaryResponse, StartQuizRequest,
        },
        session::NewSessionSummary,
    },
    questions::{FallbackReason, bank},
    state::AppState,
    store::{attempts, runs, sessions},
    utils::jwt::{Claims, sign_context, verify_context},
};

/// Topics covered by the static bank.
pub async fn list_topics() -> impl IntoResponse {
    Json(bank::topics())
}

/// Starts a quiz run and returns its first question with a context token.
///
/// * Static: the whole bank, shuffled.
/// * Adaptive: questions for the requested topic at Easy, or for the user's
///   weakest topic at a difficulty matched to their accuracy on it.
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.user_id()?;

    let (questions, fallback) = match req.mode {
        QuizMode::Static => (shuffled_bank(), None),
        QuizMode::Adaptive => adaptive_questions(&state, user_id, req.topic.as_deref()).await?,
    };

    if questions.is_empty() {
        return Err(AppError::InternalServerError(
            "No questions available for this quiz".to_string(),
        ));
    }

    let run = QuizRun::new(user_id, req.mode, questions, fallback);
    runs::create_run(&state.pool, &run).await?;

    let ctx = QuizContext::new(&run);
    let ttl = state.config.quiz.context_ttl_secs;
    let context_token = sign_context(&ctx, &state.config.jwt_secret, ttl)?;

    let first = run.question(0);
    tracing::info!(
        "User {} started {:?} quiz run {} with {} questions",
        user_id,
        run.mode,
        run.id,
        ctx.total_questions
    );

    Ok(Json(QuizStepResponse {
        context_token,
        mode: run.mode,
        current_question_num: 1,
        total_questions: ctx.total_questions,
        question: first.map(PublicQuestion::from),
        source: first.map(|q| q.source),
        fallback_reason: run.fallback.clone(),
        expires_in: ttl,
    }))
}

/// Answers the current question of a run.
///
/// Records the attempt and hands back the advanced context token together with
/// the next question, if any. Each question of a run is answered once; sending
/// an already used token again is a conflict, and so is answering a finished run.
pub async fn answer_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.user_id()?;

    let ctx = verify_context(&req.context_token, &state.config.jwt_secret, user_id)?;
    let run = runs::find_run(&state.pool, &ctx.run_id, user_id).await?;
    if run.finished {
        return Err(AppError::Conflict("Quiz run is already finished".to_string()));
    }

    let selected_option = usize::try_from(req.selected_option)
        .map_err(|_| AppError::BadRequest("Option index cannot be negative".to_string()))?;

    let (next, outcome) = ctx.answer(&run, &req.question_id, selected_option, req.time_taken)?;

    attempts::record_attempt(
        &state.pool,
        NewAttempt {
            user_id,
            run_id: run.id.clone(),
            question_index: outcome.question_index as i64,
            question_id: outcome.question.id.clone(),
            topic: outcome.question.topic.clone(),
            difficulty: outcome.question.difficulty,
            selected_option: req.selected_option,
            correct_option: outcome.question.correct_option as i64,
            time_taken: outcome.time_taken,
            attempted_at: Utc::now(),
        },
    )
    .await?;

    let context_token = sign_context(
        &next,
        &state.config.jwt_secret,
        state.config.quiz.context_ttl_secs,
    )?;

    Ok(Json(AnswerResponse {
        is_correct: outcome.is_correct,
        correct_option: outcome.question.correct_option,
        explanation: outcome.question.explanation,
        finished: next.is_finished(),
        context_token,
        current_question_num: (next.current_index + 1).min(next.total_questions),
        total_questions: next.total_questions,
        next_question: run.question(next.current_index).map(PublicQuestion::from),
    }))
}

/// Closes a run and stores its session summary.
///
/// A run may be closed early; the summary then covers the answered questions
/// only. Nothing is stored for a run without answers. Figures come from the
/// attempts stored for the run, not from the token, and a run closes once.
pub async fn finish_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FinishQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.user_id()?;

    let ctx = verify_context(&req.context_token, &state.config.jwt_secret, user_id)?;
    let run = runs::find_run(&state.pool, &ctx.run_id, user_id).await?;

    let mut tx = state.pool.begin().await?;
    runs::mark_finished(&mut *tx, &run.id).await?;
    let tally = runs::tally(&mut *tx, &run.id).await?;

    let total_time = match run.mode {
        QuizMode::Adaptive if !state.config.quiz.adaptive_tracks_time => 0,
        _ => tally.total_time,
    };

    let session = if tally.answered > 0 {
        let summary = sessions::record_session(
            &mut *tx,
            NewSessionSummary {
                user_id,
                run_id: run.id.clone(),
                mode: run.mode,
                total_questions: tally.answered,
                correct_count: tally.correct,
                total_time,
                completed_at: Utc::now(),
            },
        )
        .await?;
        Some(summary)
    } else {
        None
    };
    tx.commit().await?;

    let answered = tally.answered as usize;
    let (accuracy, avg_time) = if answered > 0 {
        (
            tally.correct as f64 * 100.0 / answered as f64,
            total_time as f64 / answered as f64,
        )
    } else {
        (0.0, 0.0)
    };

    tracing::info!(
        "User {} finished quiz run {} ({}/{} answered)",
        user_id,
        run.id,
        answered,
        run.questions.len()
    );

    Ok(Json(QuizSummaryResponse {
        mode: run.mode,
        correct_answers: tally.correct as usize,
        total_questions: run.questions.len(),
        answered,
        accuracy,
        total_time,
        avg_time,
        session,
    }))
}

fn shuffled_bank() -> Vec<Question> {
    let mut questions = bank::all_questions();
    questions.shuffle(&mut rand::thread_rng());
    questions
}

async fn adaptive_questions(
    state: &AppState,
    user_id: i64,
    topic: Option<&str>,
) -> Result<(Vec<Question>, Option<FallbackReason>), AppError> {
    let (topic, difficulty) = match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => (topic.to_string(), Difficulty::Easy),
        None => {
            let history = attempts::list_attempts(&state.pool, user_id, None, None).await?;
            let analysis = analyze(&history, &state.config.analytics);
            let target = adaptive_target(&analysis.records);
            (target.topic, target.difficulty)
        }
    };

    tracing::info!(
        "Adaptive quiz for user {} targets '{}' at {}",
        user_id,
        topic,
        difficulty
    );

    let outcome = state
        .supplier
        .supply(&topic, difficulty, state.config.quiz.adaptive_question_count)
        .await;

    Ok(outcome.into_parts())
}
