// src/questions/generator.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::{
    config::AiConfig,
    models::{attempt::Difficulty, question::Question},
    questions::parse::{parse_question_array, questions_from_items},
};

const SYSTEM_PROMPT: &str = "You are an expert question generator for analytical aptitude tests. \
Respond with valid JSON array only. No markdown, no commentary, no trailing commas, \
and keep all strings properly escaped.";
const MAX_TOKENS: u32 = 2600;

/// Errors that can occur while asking a model for questions.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key is configured.
    #[error("no credentials configured for question generation")]
    MissingCredentials,

    /// The request did not complete in time.
    #[error("generation timed out after {0}s")]
    Timeout(u64),

    /// The API returned a 429 rate limit response.
    #[error("rate limited by the generation API")]
    RateLimited,

    /// The API returned an error response.
    #[error("generation API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be turned into questions.
    #[error("malformed generation response: {0}")]
    Malformed(String),

    /// The response parsed but held no usable question.
    #[error("generation returned no valid questions")]
    Empty,
}

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: usize,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn prompt(&self) -> String {
        format!(
            r#"Generate {count} multiple-choice questions for a CSE analytics test.

Topic: {topic}
Difficulty: {difficulty}

Requirements:
1. Each question should have exactly 4 options
2. Provide the correct answer as an index (0, 1, 2, or 3)
3. Include a brief explanation
4. Questions should test analytical and problem-solving skills

Return ONLY a valid JSON array in this exact format (no markdown, no extra text):
[
  {{
    "question": "Question text here",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correct_answer": 0,
    "explanation": "Brief explanation here"
  }}
]"#,
            count = self.count,
            topic = self.topic,
            difficulty = self.difficulty.label(),
        )
    }
}

/// A source of freshly generated questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError>;
}

/// Generator backed by an OpenAI-compatible chat completions API (Groq by default).
pub struct GroqGenerator {
    api_key: String,
    endpoint: Url,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GroqGenerator {
    pub fn new(config: &AiConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenerationError::MissingCredentials)?;

        let endpoint = chat_endpoint(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            endpoint,
            model: config.model.clone(),
            timeout_secs: config.timeout.as_secs(),
            client,
        })
    }
}

fn chat_endpoint(base_url: &Url) -> Result<Url, GenerationError> {
    let base = base_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/v1/chat/completions", base))
        .map_err(|e| GenerationError::Network(format!("invalid endpoint: {}", e)))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl QuestionGenerator for GroqGenerator {
    fn name(&self) -> &str {
        "groq"
    }

    #[instrument(skip(self, request), fields(topic = %request.topic, model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        let prompt = request.prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(GenerationError::RateLimited);
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Http { status, message });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(format!("failed to parse response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let items = parse_question_array(&content)?;
        let questions = questions_from_items(items, &request.topic, request.difficulty, request.count);
        if questions.is_empty() {
            return Err(GenerationError::Empty);
        }

        tracing::info!("Generated {} questions using {}", questions.len(), self.name());
        Ok(questions)
    }
}
