#![forbid(unsafe_code)]

//! Core domain model and business logic for the HeavyDuty training tracker.
//!
//! This crate provides:
//! - Domain types (muscle groups, exercises, levels, schedules)
//! - Exercise catalog and training plan configuration
//! - Progression engine (date to week, level and day schedule)
//! - Progress store (completions, streaks, monthly summaries)
//! - Nutrition calculator and meal log
//! - Persistence (atomic JSON documents, CSV export) behind a `Session`

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod video;
pub mod plan;
pub mod schedule;
pub mod progression;
pub mod progress;
pub mod stats;
pub mod nutrition;
pub mod store;
pub mod export;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{default_catalog, ExerciseCatalog, ExerciseFilter};
pub use config::Config;
pub use plan::{PlanDocument, TrainingPlan};
pub use schedule::ScheduleStrategy;
pub use progression::{week_of, ProgressionEngine};
pub use progress::{CompletionRecord, DayStatus, DaySummary, ProgressStore};
pub use nutrition::{MealEntry, NutritionLog, NutritionProfile};
pub use session::Session;
