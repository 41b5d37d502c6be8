#![forbid(unsafe_code)]

//! Core domain model and business logic for the LevelUp progression engine.
//!
//! This crate provides:
//! - Domain types (stats, activity records, quests, save state)
//! - Progression math and the leveling engine
//! - Activity and quest ledgers
//! - Snapshot encoding and file persistence
//! - Weight-trend series

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod progression;
pub mod leveling;
pub mod ledger;
pub mod quests;
pub mod snapshot;
pub mod state;
pub mod trend;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::Engine;
pub use leveling::{apply_exp, LevelUp};
pub use progression::{diet_yield, level_threshold, workout_yield};
pub use state::{FileStore, SnapshotStore};
