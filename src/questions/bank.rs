// src/questions/bank.rs

use crate::models::{
    attempt::Difficulty,
    question::{Question, QuestionSource},
};

struct BankEntry {
    id: u32,
    topic: &'static str,
    difficulty: Difficulty,
    text: &'static str,
    options: [&'static str; 4],
    correct_option: usize,
    explanation: &'static str,
}

const BANK: &[BankEntry] = &[
    BankEntry {
        id: 1,
        topic: "Logical Reasoning",
        difficulty: Difficulty::Easy,
        text: "If all roses are flowers and some flowers fade quickly, which statement is definitely true?",
        options: [
            "All roses fade quickly",
            "Some roses are flowers",
            "All flowers are roses",
            "No roses fade quickly",
        ],
        correct_option: 1,
        explanation: "Since all roses are flowers, some roses are certainly flowers. Nothing follows about fading.",
    },
    BankEntry {
        id: 2,
        topic: "Quantitative Aptitude",
        difficulty: Difficulty::Easy,
        text: "A number is increased by 20% and then decreased by 20%. What is the net change?",
        options: ["No change (0%)", "4% decrease", "4% increase", "2% decrease"],
        correct_option: 1,
        explanation: "100 becomes 120, and 20% off 120 is 96: a 4% decrease.",
    },
    BankEntry {
        id: 3,
        topic: "Data Interpretation",
        difficulty: Difficulty::Easy,
        text: "In a class of 50 students, 30 like Math and 25 like Science. If 10 like both, how many like neither?",
        options: ["5 students", "10 students", "15 students", "20 students"],
        correct_option: 0,
        explanation: "At least one subject: 30 + 25 - 10 = 45, so 50 - 45 = 5 like neither.",
    },
    BankEntry {
        id: 4,
        topic: "Logical Reasoning",
        difficulty: Difficulty::Easy,
        text: "If COMPUTER is written as DPNQVUFS in a certain code, how is SCIENCE written?",
        options: ["TDJFODF", "SCJDMBD", "TDJFMDF", "RBHFMBD"],
        correct_option: 0,
        explanation: "Each letter moves one place forward: S->T, C->D, I->J, E->F, N->O, C->D, E->F.",
    },
    BankEntry {
        id: 5,
        topic: "Quantitative Aptitude",
        difficulty: Difficulty::Easy,
        text: "What is the average of the first 10 natural numbers?",
        options: ["5", "5.5", "6", "10"],
        correct_option: 1,
        explanation: "Their sum is 10 x 11 / 2 = 55, and 55 / 10 = 5.5.",
    },
    BankEntry {
        id: 6,
        topic: "Pattern Recognition",
        difficulty: Difficulty::Easy,
        text: "Find the next number in the series: 2, 6, 12, 20, 30, ?",
        options: ["40", "42", "44", "38"],
        correct_option: 1,
        explanation: "Each term is n x (n + 1): 6 x 7 = 42.",
    },
    BankEntry {
        id: 7,
        topic: "Data Interpretation",
        difficulty: Difficulty::Easy,
        text: "If 60% of a number is 120, what is 25% of that number?",
        options: ["30", "40", "50", "60"],
        correct_option: 2,
        explanation: "The number is 120 / 0.6 = 200, and 25% of 200 is 50.",
    },
    BankEntry {
        id: 8,
        topic: "Logical Reasoning",
        difficulty: Difficulty::Easy,
        text: "A is taller than B. C is shorter than B. Who is the shortest?",
        options: ["A", "B", "C", "Cannot be determined"],
        correct_option: 2,
        explanation: "A > B > C, so C is the shortest.",
    },
    BankEntry {
        id: 9,
        topic: "Quantitative Aptitude",
        difficulty: Difficulty::Easy,
        text: "The ratio of boys to girls in a class is 3:2 and there are 15 boys. How many girls are there?",
        options: ["8", "10", "12", "15"],
        correct_option: 1,
        explanation: "3 parts are 15 boys, so one part is 5 and 2 parts are 10 girls.",
    },
    BankEntry {
        id: 10,
        topic: "Pattern Recognition",
        difficulty: Difficulty::Easy,
        text: "Complete the series: A, C, F, J, O, ?",
        options: ["T", "U", "S", "V"],
        correct_option: 1,
        explanation: "The gaps grow by one: +2, +3, +4, +5, +6, so O + 6 = U.",
    },
];

impl BankEntry {
    fn to_question(&self, id: String, source: QuestionSource) -> Question {
        Question {
            id,
            topic: self.topic.to_string(),
            difficulty: self.difficulty,
            text: self.text.to_string(),
            options: self.options.iter().map(|o| o.to_string()).collect(),
            correct_option: self.correct_option,
            explanation: self.explanation.to_string(),
            source,
        }
    }
}

/// The full static bank, in bank order.
pub fn all_questions() -> Vec<Question> {
    BANK.iter()
        .map(|e| e.to_question(e.id.to_string(), QuestionSource::StaticBank))
        .collect()
}

/// Distinct topics covered by the bank.
pub fn topics() -> Vec<&'static str> {
    let mut topics: Vec<&'static str> = Vec::new();
    for entry in BANK {
        if !topics.contains(&entry.topic) {
            topics.push(entry.topic);
        }
    }
    topics
}

/// Static stand-in for generated questions, in the same shape.
///
/// Bank questions on `topic` (case-insensitive) are used, entries of the requested
/// difficulty first; when the bank has nothing on the topic, the whole bank is used.
pub fn static_questions(topic: &str, difficulty: Difficulty, count: usize) -> Vec<Question> {
    let mut pool: Vec<&BankEntry> = BANK
        .iter()
        .filter(|e| e.topic.eq_ignore_ascii_case(topic.trim()))
        .collect();
    if pool.is_empty() {
        pool = BANK.iter().collect();
    }
    pool.sort_by_key(|e| e.difficulty != difficulty);

    pool.into_iter()
        .take(count)
        .enumerate()
        .map(|(i, e)| e.to_question(format!("fallback_{}_{}", topic, i + 1), QuestionSource::StaticFallback))
        .collect()
}
