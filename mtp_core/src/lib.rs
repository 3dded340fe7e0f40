#![forbid(unsafe_code)]

//! Core domain model and business logic for Matrix Training Plus.
//!
//! This crate provides:
//! - Domain types (categories, sets, sessions, machines, plan)
//! - Rule table and default catalog
//! - Key-value persistence and per-machine session history
//! - Per-machine working weights
//! - Progression suggestions and the rolling weekly summary

pub mod types;
pub mod error;
pub mod rules;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod history;
pub mod progression;
pub mod summary;
pub mod weights;
pub mod tracker;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use rules::{Rule, RuleTable};
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use store::{JsonFileStore, KvStore, MemoryStore};
pub use history::{history_key, HistoryStore};
pub use progression::{build_sets, has_earned_progression, suggest_next_weight};
pub use summary::{summarize, CategoryTotals, WeeklySummary};
pub use weights::{working_weight_key, WeightChange};
pub use tracker::{ExerciseStatus, Tracker};
