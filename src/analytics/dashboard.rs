// src/analytics/dashboard.rs

use crate::{
    analytics::{Classification, WeaknessRecord},
    models::{
        analytics::{DashboardResponse, TopicAccuracy, TrendPoint},
        attempt::Attempt,
        session::SessionSummary,
    },
};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Assembles the dashboard view.
///
/// * `records` are the user's weakness records (any order).
/// * `trend` holds the sessions to chart, oldest first.
/// * `recent` holds the sessions to list, newest first.
pub fn build_dashboard(
    attempts: &[Attempt],
    records: &[WeaknessRecord],
    trend: &[SessionSummary],
    recent: Vec<SessionSummary>,
) -> DashboardResponse {
    let total_attempted = attempts.len();

    let (accuracy, avg_time) = if total_attempted == 0 {
        (0.0, 0.0)
    } else {
        let correct = attempts.iter().filter(|a| a.is_correct).count();
        let time: i64 = attempts.iter().map(|a| a.time_taken).sum();
        (
            correct as f64 / total_attempted as f64 * 100.0,
            time as f64 / total_attempted as f64,
        )
    };

    // Records are re-derived per topic, so their metrics already hold the counts.
    let topic_stats = records
        .iter()
        .map(|r| TopicAccuracy {
            topic: r.topic.clone(),
            total: r.metric.sample_count,
            correct: r.metric.correct_count,
            accuracy: round1(r.metric.accuracy * 100.0),
        })
        .collect();

    let weak_area_count = records
        .iter()
        .filter(|r| r.classification == Classification::Weak)
        .count();

    let accuracy_trend = trend
        .iter()
        .map(|s| TrendPoint {
            label: s.completed_at.format("%b %d").to_string(),
            accuracy: round1(s.accuracy),
        })
        .collect();

    DashboardResponse {
        total_attempted,
        accuracy: round1(accuracy),
        avg_time: round1(avg_time),
        weak_area_count,
        topic_stats,
        accuracy_trend,
        recent_sessions: recent,
    }
}
