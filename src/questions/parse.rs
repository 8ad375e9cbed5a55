// src/questions/parse.rs

//! Tolerant parsing of model output into questions.
//!
//! Models wrap JSON in markdown fences, use typographic quotes and leave trailing
//! commas; each of those is repaired before giving up.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    models::{
        attempt::Difficulty,
        question::{Question, QuestionSource},
    },
    questions::generator::GenerationError,
    utils::html::clean_html,
};

pub const OPTION_COUNT: usize = 4;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("valid fence pattern"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma pattern"));

/// Question as the model is asked to emit it.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    explanation: String,
}

/// Strips markdown fences and normalises typographic quotes.
pub fn clean_response_text(raw: &str) -> String {
    CODE_FENCE
        .replace_all(raw, "")
        .trim()
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Extracts the JSON array from a model response.
pub fn parse_question_array(raw: &str) -> Result<Vec<Value>, GenerationError> {
    let cleaned = clean_response_text(raw);

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(items);
    }

    // First complete JSON value starting at the first '['; trailing prose is ignored.
    if let Some(start) = cleaned.find('[') {
        let mut stream = serde_json::Deserializer::from_str(&cleaned[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            return Ok(items);
        }
    }

    if let (Some(first), Some(last)) = (cleaned.find('['), cleaned.rfind(']')) {
        if last > first {
            let candidate = TRAILING_COMMA.replace_all(&cleaned[first..=last], "$1");
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&candidate) {
                return Ok(items);
            }
        }
    }

    Err(GenerationError::Malformed(
        "unable to parse response as a JSON array".to_string(),
    ))
}

/// Turns parsed items into questions, skipping any that are incomplete.
///
/// An item needs the four expected fields, exactly four options and a correct
/// index in `0..4`. At most `count` questions are returned.
pub fn questions_from_items(
    items: Vec<Value>,
    topic: &str,
    difficulty: Difficulty,
    count: usize,
) -> Vec<Question> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawQuestion>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!("Skipping invalid question payload: {}", e);
                None
            }
        })
        .filter(|raw| {
            let valid = raw.options.len() == OPTION_COUNT
                && (0..OPTION_COUNT as i64).contains(&raw.correct_answer);
            if !valid {
                tracing::warn!("Skipping question with invalid options or answer index");
            }
            valid
        })
        .take(count)
        .enumerate()
        .map(|(i, raw)| Question {
            id: format!("ai_{}_{}", topic, i + 1),
            topic: topic.to_string(),
            difficulty,
            text: clean_html(&raw.question),
            options: raw.options.iter().map(|o| clean_html(o)).collect(),
            correct_option: raw.correct_answer as usize,
            explanation: clean_html(&raw.explanation),
            source: QuestionSource::Generated,
        })
        .collect()
}
