// src/analytics/recommendation.rs

use serde::Serialize;

use crate::analytics::{
    metrics::TopicMetric,
    weakness::{Classification, WeaknessFactor, WeaknessRecord, compare_records},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriorityTier {
    High,
    Medium,
    Maintain,
}

impl From<Classification> for PriorityTier {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Weak => PriorityTier::High,
            Classification::Moderate => PriorityTier::Medium,
            Classification::Strong => PriorityTier::Maintain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub topic: String,
    pub tier: PriorityTier,
    pub score: f64,
    pub factor: WeaknessFactor,
    pub reason: String,
    pub action: String,
}

/// Recommendations grouped by tier, with a one-line summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub high_priority: Vec<Recommendation>,
    pub medium_priority: Vec<Recommendation>,
    pub maintain: Vec<Recommendation>,
    pub message: String,
}

/// One recommendation per record, in ranking order.
///
/// The input is re-ranked, so callers may pass records in any order.
pub fn rank_recommendations(records: &[WeaknessRecord]) -> Vec<Recommendation> {
    let mut ranked: Vec<&WeaknessRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare_records(a, b));
    ranked.into_iter().map(recommend).collect()
}

fn recommend(record: &WeaknessRecord) -> Recommendation {
    let tier = PriorityTier::from(record.classification);
    let factor = record.factors.dominant();

    Recommendation {
        topic: record.topic.clone(),
        tier,
        score: record.score,
        factor,
        reason: reason(factor, &record.metric),
        action: suggested_action(tier, factor, &record.topic),
    }
}

/// Describes the dominant factor using the metric values behind it.
pub fn reason(factor: WeaknessFactor, metric: &TopicMetric) -> String {
    match factor {
        WeaknessFactor::AccuracyDeficit => format!(
            "Accuracy is {:.1}% ({} of {} correct)",
            metric.accuracy * 100.0,
            metric.correct_count,
            metric.sample_count
        ),
        WeaknessFactor::TimePenalty => {
            format!("Average answer time is {:.1}s per question", metric.avg_time)
        }
        WeaknessFactor::Inconsistency => format!(
            "Recent results are inconsistent (consistency {:.0}%)",
            metric.consistency * 100.0
        ),
    }
}

/// Suggested next step for every (tier, factor) pair.
pub fn suggested_action(tier: PriorityTier, factor: WeaknessFactor, topic: &str) -> String {
    use PriorityTier::*;
    use WeaknessFactor::*;

    match (tier, factor) {
        (High, AccuracyDeficit) => format!(
            "Focus on fundamentals: start with easy {} questions and review every explanation",
            topic
        ),
        (High, TimePenalty) => format!("Practice speed-solving {} questions with a timer", topic),
        (High, Inconsistency) => format!(
            "Practice {} in short daily sets to build consistency",
            topic
        ),
        (Medium, AccuracyDeficit) => format!(
            "Practice medium-level {} questions and revisit the ones you miss",
            topic
        ),
        (Medium, TimePenalty) => format!("Do timed {} drills to bring your average down", topic),
        (Medium, Inconsistency) => format!(
            "Schedule regular {} sessions to steady your results",
            topic
        ),
        (Maintain, AccuracyDeficit) => format!(
            "Maintain with occasional {} practice at a harder level",
            topic
        ),
        (Maintain, TimePenalty) => format!("Keep {} sharp with a quick timed set each week", topic),
        (Maintain, Inconsistency) => format!("Maintain with occasional {} practice", topic),
    }
}

/// Groups ranked recommendations by tier, keeping their order within each tier.
pub fn build_report(recommendations: Vec<Recommendation>) -> RecommendationReport {
    let mut high_priority = Vec::new();
    let mut medium_priority = Vec::new();
    let mut maintain = Vec::new();

    for recommendation in recommendations {
        match recommendation.tier {
            PriorityTier::High => high_priority.push(recommendation),
            PriorityTier::Medium => medium_priority.push(recommendation),
            PriorityTier::Maintain => maintain.push(recommendation),
        }
    }

    let message = if high_priority.is_empty() && medium_priority.is_empty() && maintain.is_empty() {
        "Start practicing to get personalized recommendations!".to_string()
    } else if !high_priority.is_empty() {
        format!(
            "Focus on {} weak area(s) to improve quickly!",
            high_priority.len()
        )
    } else if !medium_priority.is_empty() {
        "Good progress! Work on moderate areas to reach excellence.".to_string()
    } else {
        "Excellent! You're strong in all areas. Keep practicing!".to_string()
    };

    RecommendationReport {
        high_priority,
        medium_priority,
        maintain,
        message,
    }
}
