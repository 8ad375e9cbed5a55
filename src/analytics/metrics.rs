// src/analytics/metrics.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::{config::AnalyticsConfig, models::attempt::Attempt};

/// Consistency reported when fewer than two recent attempts exist.
pub const NEUTRAL_CONSISTENCY: f64 = 0.5;

/// Largest possible variance of a 0/1 sequence (reached at a 50% hit rate).
const MAX_BINARY_VARIANCE: f64 = 0.25;

/// Per-topic performance, derived from attempts on demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMetric {
    pub topic: String,
    pub sample_count: usize,
    pub correct_count: usize,
    /// Fraction in [0, 1], over every attempt of the topic.
    pub accuracy: f64,
    /// Mean seconds per attempt, over every attempt of the topic.
    pub avg_time: f64,
    /// Stability of correctness over the recent window, in [0, 1].
    pub consistency: f64,
}

/// Computes one metric per distinct topic in `attempts`.
///
/// * `attempts` must be in chronological order (oldest first), which is how the
///   attempt store returns them; the last `consistency_window` attempts of a topic
///   form its recent window.
/// * Topics come out in order of first appearance.
pub fn compute_topic_metrics(attempts: &[Attempt], config: &AnalyticsConfig) -> Vec<TopicMetric> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Attempt>> = HashMap::new();

    for attempt in attempts {
        let group = groups.entry(attempt.topic.as_str()).or_insert_with(|| {
            order.push(attempt.topic.as_str());
            Vec::new()
        });
        group.push(attempt);
    }

    order
        .into_iter()
        .filter_map(|topic| {
            groups
                .get(topic)
                .map(|group| topic_metric(topic, group, config.consistency_window()))
        })
        .collect()
}

fn topic_metric(topic: &str, group: &[&Attempt], window: usize) -> TopicMetric {
    let sample_count = group.len();
    let correct_count = group.iter().filter(|a| a.is_correct).count();
    let total_time: i64 = group.iter().map(|a| a.time_taken.max(0)).sum();

    let recent_start = sample_count.saturating_sub(window);
    let recent: Vec<bool> = group[recent_start..].iter().map(|a| a.is_correct).collect();

    TopicMetric {
        topic: topic.to_string(),
        sample_count,
        correct_count,
        accuracy: correct_count as f64 / sample_count as f64,
        avg_time: total_time as f64 / sample_count as f64,
        consistency: consistency(&recent),
    }
}

/// 1 minus the normalised population variance of a correctness sequence.
pub fn consistency(recent: &[bool]) -> f64 {
    if recent.len() < 2 {
        return NEUTRAL_CONSISTENCY;
    }

    let n = recent.len() as f64;
    let hit_rate = recent.iter().filter(|c| **c).count() as f64 / n;
    let variance = hit_rate * (1.0 - hit_rate);

    (1.0 - variance / MAX_BINARY_VARIANCE).clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::attempt::Difficulty;
    use chrono::{Duration, TimeZone, Utc};

    /// Builds a chronological attempt list from `(topic, correct, seconds)` triples.
    pub(crate) fn attempts(rows: &[(&str, bool, i64)]) -> Vec<Attempt> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, (topic, correct, secs))| Attempt {
                id: i as i64 + 1,
                user_id: 1,
                question_id: format!("{}", i + 1),
                topic: topic.to_string(),
                difficulty: Difficulty::Easy,
                selected_option: if *correct { 1 } else { 0 },
                correct_option: 1,
                is_correct: *correct,
                time_taken: *secs,
                attempted_at: base + Duration::minutes(i as i64),
            })
            .collect()
    }

    #[test]
    fn algebra_scenario_metrics() {
        let input = attempts(&[("Algebra", true, 5), ("Algebra", false, 50)]);
        let metrics = compute_topic_metrics(&input, &AnalyticsConfig::default());

        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.topic, "Algebra");
        assert_eq!(m.sample_count, 2);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.avg_time, 27.5);
        assert_eq!(m.consistency, 0.0);
    }

    #[test]
    fn single_attempt_gets_neutral_consistency() {
        let input = attempts(&[("Geometry", true, 12)]);
        let metrics = compute_topic_metrics(&input, &AnalyticsConfig::default());
        assert_eq!(metrics[0].consistency, 0.5);
    }

    #[test]
    fn empty_history_yields_no_metrics() {
        assert!(compute_topic_metrics(&[], &AnalyticsConfig::default()).is_empty());
    }

    #[test]
    fn every_topic_appears_once_in_first_seen_order() {
        let input = attempts(&[
            ("Logic", true, 10),
            ("Algebra", false, 20),
            ("Logic", false, 30),
            ("Patterns", true, 5),
            ("Algebra", true, 8),
        ]);
        let metrics = compute_topic_metrics(&input, &AnalyticsConfig::default());
        let topics: Vec<&str> = metrics.iter().map(|m| m.topic.as_str()).collect();

        assert_eq!(topics, vec!["Logic", "Algebra", "Patterns"]);
        assert!(metrics.iter().all(|m| (0.0..=1.0).contains(&m.accuracy)));
        assert_eq!(metrics.iter().map(|m| m.sample_count).sum::<usize>(), 5);
    }

    #[test]
    fn accuracy_uses_all_attempts_but_consistency_only_the_window() {
        // Five early misses, then five hits: overall 50%, recent window perfectly stable.
        let mut rows = vec![("Logic", false, 10); 5];
        rows.extend(vec![("Logic", true, 10); 5]);
        let metrics = compute_topic_metrics(&attempts(&rows), &AnalyticsConfig::default());

        assert_eq!(metrics[0].accuracy, 0.5);
        assert_eq!(metrics[0].consistency, 1.0);
    }

    #[test]
    fn zero_time_is_a_valid_fast_answer() {
        let input = attempts(&[("Logic", true, 0), ("Logic", true, 0)]);
        let metrics = compute_topic_metrics(&input, &AnalyticsConfig::default());
        assert_eq!(metrics[0].avg_time, 0.0);
        assert_eq!(metrics[0].consistency, 1.0);
    }

    #[test]
    fn consistency_is_bounded() {
        assert_eq!(consistency(&[true, false, true, false]), 0.0);
        assert_eq!(consistency(&[true, true, true]), 1.0);
        let mixed = consistency(&[true, true, true, false]);
        assert!(mixed > 0.0 && mixed < 1.0);
    }
}
