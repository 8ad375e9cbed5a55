// src/models/analytics.rs

use serde::Serialize;

use crate::{
    analytics::{
        RecommendationReport, WeaknessRecord,
        practice::{PracticeRoute, PracticeState},
    },
    models::session::SessionSummary,
};

/// Per-topic accuracy row shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicAccuracy {
    pub topic: String,
    pub total: usize,
    pub correct: usize,
    /// Percentage, one decimal.
    pub accuracy: f64,
}

/// One point of the session accuracy trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Completion date, e.g. "Jan 15".
    pub label: String,
    pub accuracy: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_attempted: usize,
    /// Percentage, one decimal.
    pub accuracy: f64,
    /// Seconds, one decimal.
    pub avg_time: f64,
    pub weak_area_count: usize,
    pub topic_stats: Vec<TopicAccuracy>,
    pub accuracy_trend: Vec<TrendPoint>,
    pub recent_sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct WeakAreasResponse {
    pub topics: Vec<WeaknessRecord>,
    pub recommendations: RecommendationReport,
}

#[derive(Debug, Serialize)]
pub struct PracticeResponse {
    pub state: PracticeState,
    pub route: PracticeRoute,
    pub next: &'static str,
}
