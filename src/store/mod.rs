// src/store/mod.rs

//! SQLite persistence: quiz runs, the append-only attempt log, quiz session
//! summaries and users.

pub mod attempts;
pub mod runs;
pub mod sessions;
pub mod users;
