// src/models/mod.rs

pub mod analytics;
pub mod attempt;
pub mod question;
pub mod quiz;
pub mod session;
pub mod user;
