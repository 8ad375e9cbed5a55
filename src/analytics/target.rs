// src/analytics/target.rs

use serde::Serialize;

use crate::{
    analytics::weakness::{Classification, WeaknessRecord},
    models::attempt::Difficulty,
};

/// Topic practised when there is no history to adapt to.
pub const DEFAULT_PRACTICE_TOPIC: &str = "Logical Reasoning";

/// What an adaptive quiz should ask about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeTarget {
    pub topic: String,
    pub difficulty: Difficulty,
}

/// Picks the adaptive quiz target from ranked weakness records.
///
/// * No records: the default topic at Easy.
/// * Otherwise the first Weak or Moderate record, with difficulty from its accuracy
///   (below 40% Easy, below 70% Medium, else Hard).
/// * When everything is Strong: the top-ranked topic at Medium.
pub fn adaptive_target(ranked: &[WeaknessRecord]) -> PracticeTarget {
    let Some(top) = ranked.first() else {
        return PracticeTarget {
            topic: DEFAULT_PRACTICE_TOPIC.to_string(),
            difficulty: Difficulty::Easy,
        };
    };

    match ranked
        .iter()
        .find(|r| r.classification != Classification::Strong)
    {
        Some(weakest) => PracticeTarget {
            topic: weakest.topic.clone(),
            difficulty: difficulty_for_accuracy(weakest.metric.accuracy),
        },
        None => PracticeTarget {
            topic: top.topic.clone(),
            difficulty: Difficulty::Medium,
        },
    }
}

pub fn difficulty_for_accuracy(accuracy: f64) -> Difficulty {
    if accuracy < 0.4 {
        Difficulty::Easy
    } else if accuracy < 0.7 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
