//! Database layer for grindlog
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for problem CRUD
//! - The event read path used by analytics

pub mod repo;
pub mod schema;

pub use repo::{Database, ProblemFilter};
