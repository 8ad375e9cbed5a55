// src/questions/mod.rs

pub mod bank;
pub mod generator;
pub mod parse;
pub mod supplier;

pub use supplier::{FallbackReason, QuestionSupplier, SupplyOutcome};
