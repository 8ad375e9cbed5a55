// src/questions/supplier.rs

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::AiConfig,
    models::{attempt::Difficulty, question::Question},
    questions::{
        bank::static_questions,
        generator::{GenerationError, GenerationRequest, GroqGenerator, QuestionGenerator},
    },
};

const FIRST_ATTEMPT_TEMPERATURE: f64 = 0.7;
const RETRY_TEMPERATURE: f64 = 0.2;

/// Why generated questions were replaced by the static bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    MissingCredentials,
    Timeout,
    RateLimited,
    HttpStatus(u16),
    Network(String),
    Malformed(String),
    Empty,
}

impl From<GenerationError> for FallbackReason {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredentials => FallbackReason::MissingCredentials,
            GenerationError::Timeout(_) => FallbackReason::Timeout,
            GenerationError::RateLimited => FallbackReason::RateLimited,
            GenerationError::Http { status, .. } => FallbackReason::HttpStatus(status),
            GenerationError::Network(msg) => FallbackReason::Network(msg),
            GenerationError::Malformed(msg) => FallbackReason::Malformed(msg),
            GenerationError::Empty => FallbackReason::Empty,
        }
    }
}

/// Questions handed to a quiz, and whether they are the ones that were asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum SupplyOutcome {
    Generated(Vec<Question>),
    Fallback {
        questions: Vec<Question>,
        reason: FallbackReason,
    },
}

impl SupplyOutcome {
    pub fn questions(&self) -> &[Question] {
        match self {
            SupplyOutcome::Generated(questions) => questions,
            SupplyOutcome::Fallback { questions, .. } => questions,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            SupplyOutcome::Generated(_) => None,
            SupplyOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn into_parts(self) -> (Vec<Question>, Option<FallbackReason>) {
        match self {
            SupplyOutcome::Generated(questions) => (questions, None),
            SupplyOutcome::Fallback { questions, reason } => (questions, Some(reason)),
        }
    }
}

/// Serves quiz questions: generated when possible, static otherwise.
///
/// `supply` never fails. Missing credentials, a timeout, an error status or an
/// unusable payload all end in `SupplyOutcome::Fallback`.
#[derive(Clone)]
pub struct QuestionSupplier {
    generator: Option<Arc<dyn QuestionGenerator>>,
    timeout: Duration,
    max_attempts: u32,
}

impl QuestionSupplier {
    pub fn from_config(config: &AiConfig) -> Self {
        let generator = match GroqGenerator::new(config) {
            Ok(generator) => Some(Arc::new(generator) as Arc<dyn QuestionGenerator>),
            Err(GenerationError::MissingCredentials) => {
                tracing::warn!("No AI credentials configured; adaptive quizzes use the static bank");
                None
            }
            Err(e) => {
                tracing::error!("Failed to initialise question generator: {}", e);
                None
            }
        };

        Self {
            generator,
            timeout: config.timeout,
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn with_generator(
        generator: Arc<dyn QuestionGenerator>,
        timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            generator: Some(generator),
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    /// A supplier that always serves the static bank.
    pub fn static_only() -> Self {
        Self {
            generator: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_AI_TIMEOUT_SECS),
            max_attempts: 1,
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn supply(&self, topic: &str, difficulty: Difficulty, count: usize) -> SupplyOutcome {
        let Some(generator) = &self.generator else {
            return fallback(topic, difficulty, count, FallbackReason::MissingCredentials);
        };

        let attempts = self.generate_with_retries(generator.as_ref(), topic, difficulty, count);
        let result = match tokio::time::timeout(self.timeout, attempts).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(questions) => {
                tracing::info!("Generated {} questions for '{}'", questions.len(), topic);
                SupplyOutcome::Generated(questions)
            }
            Err(e) => {
                tracing::warn!(
                    "Question generation for '{}' failed ({}); serving static questions",
                    topic,
                    e
                );
                fallback(topic, difficulty, count, FallbackReason::from(e))
            }
        }
    }

    async fn generate_with_retries(
        &self,
        generator: &dyn QuestionGenerator,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError> {
        let mut last_error = GenerationError::Empty;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tracing::info!("Retrying question generation (attempt {}/{})", attempt, self.max_attempts);
            }
            let request = GenerationRequest {
                topic: topic.to_string(),
                difficulty,
                count,
                temperature: if attempt == 1 {
                    FIRST_ATTEMPT_TEMPERATURE
                } else {
                    RETRY_TEMPERATURE
                },
            };

            match generator.generate(&request).await {
                Ok(questions) if !questions.is_empty() => return Ok(questions),
                Ok(_) => last_error = GenerationError::Empty,
                Err(e) => {
                    tracing::warn!(
                        "{} generation error (attempt {}/{}): {}",
                        generator.name(),
                        attempt,
                        self.max_attempts,
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

fn fallback(topic: &str, difficulty: Difficulty, count: usize, reason: FallbackReason) -> SupplyOutcome {
    SupplyOutcome::Fallback {
        questions: static_questions(topic, difficulty, count),
        reason,
    }
}
