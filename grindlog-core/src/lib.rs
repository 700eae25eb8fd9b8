//! # grindlog-core
//!
//! Core library for grindlog - a coding-practice tracker.
//!
//! This library provides:
//! - Domain types for problems and solve events
//! - Database storage layer with SQLite
//! - Analytics: contribution calendar, streaks, summary, time-of-day
//!   distribution, topic breakdown
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Problems are the only stored records. Analytics never touch the database
//! directly: they take a slice of [`SolveEvent`]s, which the
//! [`Database`] hands out through the [`analytics::EventSource`] trait.
//! Every analytic is recomputed on read, so nothing derived is ever stale.
//!
//! ## Example
//!
//! ```rust,no_run
//! use grindlog_core::analytics::Dashboard;
//! use grindlog_core::{Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let dashboard = Dashboard::build(&db, config.user.id, &chrono::Local::now())
//!     .expect("failed to compute dashboard");
//! println!("current streak: {}", dashboard.summary.current_streak);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, ProblemFilter};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod types;
