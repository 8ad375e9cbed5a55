// src/analytics/mod.rs

//! Weak-area pipeline: attempts -> topic metrics -> weakness records -> recommendations.
//!
//! Everything here is a pure function of the attempt list and an [`AnalyticsConfig`],
//! so results are reproducible and nothing needs caching.

pub mod dashboard;
pub mod metrics;
pub mod practice;
pub mod recommendation;
pub mod target;
pub mod weakness;

use serde::Serialize;

use crate::{config::AnalyticsConfig, models::attempt::Attempt};

pub use metrics::{TopicMetric, compute_topic_metrics};
pub use recommendation::{Recommendation, RecommendationReport, build_report, rank_recommendations};
pub use weakness::{Classification, WeaknessRecord, rank_weaknesses, score_weakness};

/// Ranked weakness records together with their recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeakAreaAnalysis {
    pub records: Vec<WeaknessRecord>,
    pub recommendations: Vec<Recommendation>,
}

/// Runs the whole pipeline over one user's attempts (chronological order).
pub fn analyze(attempts: &[Attempt], config: &AnalyticsConfig) -> WeakAreaAnalysis {
    let records = rank_weaknesses(
        compute_topic_metrics(attempts, config)
            .iter()
            .map(|metric| score_weakness(metric, config))
            .collect(),
    );
    let recommendations = rank_recommendations(&records);

    WeakAreaAnalysis {
        records,
        recommendations,
    }
}
