// src/analytics/weakness.rs

use std::cmp::Ordering;

use serde::Serialize;

use crate::{analytics::metrics::TopicMetric, config::AnalyticsConfig};

/// Lower bound (inclusive) of the Weak band.
pub const WEAK_THRESHOLD: f64 = 0.6;
/// Lower bound (inclusive) of the Moderate band.
pub const MODERATE_THRESHOLD: f64 = 0.3;

/// Reported scores are rounded to four decimal places. Bands use the raw value.
const SCORE_PRECISION: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    Strong,
    Moderate,
    Weak,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        if score >= WEAK_THRESHOLD {
            Classification::Weak
        } else if score >= MODERATE_THRESHOLD {
            Classification::Moderate
        } else {
            Classification::Strong
        }
    }
}

/// The three ingredients of a weakness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessFactor {
    AccuracyDeficit,
    TimePenalty,
    Inconsistency,
}

/// Weighted contribution of each factor; the three terms add up to the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub accuracy_deficit: f64,
    pub time_penalty: f64,
    pub inconsistency: f64,
}

impl FactorBreakdown {
    /// The largest term. Ties resolve accuracy, then time, then consistency.
    pub fn dominant(&self) -> WeaknessFactor {
        let mut dominant = (WeaknessFactor::AccuracyDeficit, self.accuracy_deficit);
        for candidate in [
            (WeaknessFactor::TimePenalty, self.time_penalty),
            (WeaknessFactor::Inconsistency, self.inconsistency),
        ] {
            if candidate.1 > dominant.1 {
                dominant = candidate;
            }
        }
        dominant.0
    }

    /// Unrounded score.
    pub fn total(&self) -> f64 {
        self.accuracy_deficit + self.time_penalty + self.inconsistency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaknessRecord {
    pub topic: String,
    /// In [0, 1], rounded to four decimals; higher is weaker.
    pub score: f64,
    pub classification: Classification,
    pub factors: FactorBreakdown,
    pub metric: TopicMetric,
}

/// Maps an average time onto [0, 1]: `fast` and below is 0, `slow` and above is 1.
pub fn time_penalty(avg_time: f64, config: &AnalyticsConfig) -> f64 {
    let fast = config.fast_threshold_secs();
    let slow = config.slow_threshold_secs();
    ((avg_time - fast) / (slow - fast)).clamp(0.0, 1.0)
}

/// Scores one topic metric:
/// `w_acc * (1 - accuracy) + w_time * time_penalty + w_cons * (1 - consistency)`.
pub fn score_weakness(metric: &TopicMetric, config: &AnalyticsConfig) -> WeaknessRecord {
    let weights = config.weights();
    let factors = FactorBreakdown {
        accuracy_deficit: weights.accuracy * (1.0 - metric.accuracy.clamp(0.0, 1.0)),
        time_penalty: weights.time * time_penalty(metric.avg_time, config),
        inconsistency: weights.consistency * (1.0 - metric.consistency.clamp(0.0, 1.0)),
    };

    let raw = factors.total().clamp(0.0, 1.0);
    let score = (raw * SCORE_PRECISION).round() / SCORE_PRECISION;

    WeaknessRecord {
        topic: metric.topic.clone(),
        score,
        classification: Classification::from_score(raw),
        factors,
        metric: metric.clone(),
    }
}

/// Ranking order: score descending, then topic ascending.
pub fn compare_records(a: &WeaknessRecord, b: &WeaknessRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.topic.cmp(&b.topic))
}

pub fn rank_weaknesses(mut records: Vec<WeaknessRecord>) -> Vec<WeaknessRecord> {
    records.sort_by(compare_records);
    records
}
