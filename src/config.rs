// src/config.rs

use std::{env, str::FromStr, time::Duration};

use dotenvy::dotenv;
use serde::Serialize;
use url::Url;

use crate::error::AppError;

pub const DEFAULT_CONSISTENCY_WINDOW: usize = 5;
pub const DEFAULT_FAST_THRESHOLD_SECS: f64 = 10.0;
pub const DEFAULT_SLOW_THRESHOLD_SECS: f64 = 60.0;

pub const DEFAULT_AI_BASE_URL: &str = "https://api.groq.com/openai";
pub const DEFAULT_AI_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_AI_MAX_ATTEMPTS: u32 = 3;

pub const DEFAULT_ADAPTIVE_QUESTION_COUNT: usize = 5;
pub const DEFAULT_CONTEXT_TTL_SECS: u64 = 3600;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of login tokens, in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub analytics: AnalyticsConfig,
    pub ai: AiConfig,
    pub quiz: QuizConfig,
}

impl Config {
    /// Loads the configuration from the process environment (and `.env`, if present).
    ///
    /// Any invalid value is reported as `AppError::ConfigError` so startup can abort
    /// before the server accepts a single request.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        let jwt_expiration = parse_or(&lookup, "JWT_EXPIRATION", 86_400u64)?;
        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let weights = ScoreWeights {
            accuracy: parse_or(&lookup, "WEIGHT_ACCURACY", ScoreWeights::default().accuracy)?,
            time: parse_or(&lookup, "WEIGHT_TIME", ScoreWeights::default().time)?,
            consistency: parse_or(
                &lookup,
                "WEIGHT_CONSISTENCY",
                ScoreWeights::default().consistency,
            )?,
        };
        let analytics = AnalyticsConfig::new(
            parse_or(&lookup, "CONSISTENCY_WINDOW", DEFAULT_CONSISTENCY_WINDOW)?,
            parse_or(&lookup, "FAST_THRESHOLD_SECS", DEFAULT_FAST_THRESHOLD_SECS)?,
            parse_or(&lookup, "SLOW_THRESHOLD_SECS", DEFAULT_SLOW_THRESHOLD_SECS)?,
            weights,
        )?;

        let base_url = lookup("AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| AppError::ConfigError(format!("AI_BASE_URL '{}': {}", base_url, e)))?;
        let timeout_secs = parse_or(&lookup, "AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "AI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        let max_attempts = parse_or(&lookup, "AI_MAX_ATTEMPTS", DEFAULT_AI_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(AppError::ConfigError(
                "AI_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let ai = AiConfig {
            api_key: lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty()),
            base_url,
            model: lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_attempts,
        };

        let quiz = QuizConfig {
            adaptive_question_count: parse_or(
                &lookup,
                "ADAPTIVE_QUESTION_COUNT",
                DEFAULT_ADAPTIVE_QUESTION_COUNT,
            )?,
            adaptive_tracks_time: parse_or(&lookup, "ADAPTIVE_TRACK_TIME", true)?,
            context_ttl_secs: parse_or(&lookup, "QUIZ_CONTEXT_TTL_SECS", DEFAULT_CONTEXT_TTL_SECS)?,
        };
        if quiz.adaptive_question_count == 0 {
            return Err(AppError::ConfigError(
                "ADAPTIVE_QUESTION_COUNT must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            analytics,
            ai,
            quiz,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| AppError::ConfigError(format!("{} must be set", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("{} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

/// Relative weight of each weakness factor. The three weights must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub accuracy: f64,
    pub time: f64,
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.5,
            time: 0.3,
            consistency: 0.2,
        }
    }
}

/// Fixed parameter set of the weak-area pipeline.
///
/// Fields are private so that every value in circulation went through [`AnalyticsConfig::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    consistency_window: usize,
    fast_threshold_secs: f64,
    slow_threshold_secs: f64,
    weights: ScoreWeights,
}

impl AnalyticsConfig {
    pub fn new(
        consistency_window: usize,
        fast_threshold_secs: f64,
        slow_threshold_secs: f64,
        weights: ScoreWeights,
    ) -> Result<Self, AppError> {
        if consistency_window == 0 {
            return Err(AppError::ConfigError(
                "consistency window must hold at least one attempt".to_string(),
            ));
        }
        if !fast_threshold_secs.is_finite() || !slow_threshold_secs.is_finite() {
            return Err(AppError::ConfigError(
                "time thresholds must be finite numbers".to_string(),
            ));
        }
        if fast_threshold_secs < 0.0 {
            return Err(AppError::ConfigError(
                "fast threshold cannot be negative".to_string(),
            ));
        }
        if fast_threshold_secs >= slow_threshold_secs {
            return Err(AppError::ConfigError(format!(
                "fast threshold ({}s) must be below slow threshold ({}s)",
                fast_threshold_secs, slow_threshold_secs
            )));
        }

        let parts = [weights.accuracy, weights.time, weights.consistency];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::ConfigError(
                "score weights must be non-negative numbers".to_string(),
            ));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::ConfigError(format!(
                "score weights must sum to 1, got {}",
                sum
            )));
        }

        Ok(Self {
            consistency_window,
            fast_threshold_secs,
            slow_threshold_secs,
            weights,
        })
    }

    pub fn consistency_window(&self) -> usize {
        self.consistency_window
    }

    pub fn fast_threshold_secs(&self) -> f64 {
        self.fast_threshold_secs
    }

    pub fn slow_threshold_secs(&self) -> f64 {
        self.slow_threshold_secs
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            consistency_window: DEFAULT_CONSISTENCY_WINDOW,
            fast_threshold_secs: DEFAULT_FAST_THRESHOLD_SECS,
            slow_threshold_secs: DEFAULT_SLOW_THRESHOLD_SECS,
            weights: ScoreWeights::default(),
        }
    }
}

/// Settings of the AI question generator.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` means no credentials: every request is served from the static bank.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    /// Upper bound for one whole generation call, retries included.
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_AI_BASE_URL).expect("default AI base URL is valid"),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            max_attempts: DEFAULT_AI_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub adaptive_question_count: usize,
    /// Whether adaptive session summaries record the time spent answering.
    pub adaptive_tracks_time: bool,
    /// Lifetime of a quiz context token, in seconds.
    pub context_ttl_secs: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            adaptive_question_count: DEFAULT_ADAPTIVE_QUESTION_COUNT,
            adaptive_tracks_time: true,
            context_ttl_secs: DEFAULT_CONTEXT_TTL_SECS,
        }
    }
}
