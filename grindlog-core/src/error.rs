//! Error types for grindlog-core

use thiserror::Error;

/// Main error type for the grindlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A stored solve record could not be turned into an event
    #[error("invalid event for problem {problem_id}: {reason}")]
    InvalidEvent { problem_id: i64, reason: String },

    /// Difficulty label outside Easy/Medium/Hard
    #[error("invalid difficulty {0:?} (expected Easy, Medium or Hard)")]
    InvalidDifficulty(String),

    /// Rejected input on create/update
    #[error("validation error: {0}")]
    Validation(String),

    /// Problem not found (or not owned by the requesting user)
    #[error("problem not found: {0}")]
    ProblemNotFound(i64),
}

/// Result type alias for grindlog-core
pub type Result<T> = std::result::Result<T, Error>;
