//! Core domain types for grindlog
//!
//! | Term | Definition |
//! |------|------------|
//! | **Problem** | One logged practice problem, owned by exactly one user |
//! | **Solve event** | The read-only fact "this user solved something at this instant" |
//! | **Topic** | Free-form tag on a problem (e.g. `graphs`, `dp`) |
//! | **Difficulty** | One of `Easy`, `Medium`, `Hard`, matched case-sensitively |
//!
//! Problems are the stored records; analytics only ever see [`SolveEvent`]s
//! derived from them.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================
// Difficulty
// ============================================

/// Difficulty class of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = Error;

    /// Exact match only: `"easy"` is not `Easy`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(Error::InvalidDifficulty(other.to_string())),
        }
    }
}

// ============================================
// Problems (stored records)
// ============================================

/// A logged practice problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub topic: String,
    /// Stored label. Kept as text so legacy rows with odd labels still load.
    pub difficulty: String,
    pub notes: Option<String>,
    /// Flagged for a second pass
    pub needs_revision: bool,
    /// When the problem was solved; the timestamp every analytic keys on
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Problem {
    /// Parsed difficulty, or `None` for labels outside the three classes.
    pub fn difficulty_class(&self) -> Option<Difficulty> {
        self.difficulty.parse().ok()
    }

    /// The analytics view of this record.
    pub fn to_event(&self) -> SolveEvent {
        SolveEvent {
            problem_id: self.id,
            occurred_at: self.created_at,
            difficulty: Some(self.difficulty.clone()),
            topic: Some(self.topic.clone()),
        }
    }
}

/// Payload for logging a new problem.
#[derive(Debug, Clone)]
pub struct NewProblem {
    pub title: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub notes: Option<String>,
    pub needs_revision: bool,
    /// Backdate the solve; defaults to now when `None`.
    pub solved_at: Option<DateTime<Utc>>,
}

impl NewProblem {
    pub fn new(title: impl Into<String>, topic: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            title: title.into(),
            topic: topic.into(),
            difficulty,
            notes: None,
            needs_revision: false,
            solved_at: None,
        }
    }

    /// Trimmed title and topic must be non-empty.
    pub fn validate(&self) -> Result<()> {
        validate_text("title", &self.title)?;
        validate_text("topic", &self.topic)
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProblemUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    pub needs_revision: Option<bool>,
}

impl ProblemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.topic.is_none()
            && self.difficulty.is_none()
            && self.notes.is_none()
            && self.needs_revision.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_text("title", title)?;
        }
        if let Some(topic) = &self.topic {
            validate_text("topic", topic)?;
        }
        Ok(())
    }
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

// ============================================
// Analytics input
// ============================================

/// One problem-solve action. Immutable; already scoped to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveEvent {
    /// Source record, used to name the culprit in errors
    pub problem_id: i64,
    pub occurred_at: DateTime<Utc>,
    /// Raw label as stored; only `Easy`/`Medium`/`Hard` land in a bucket
    pub difficulty: Option<String>,
    pub topic: Option<String>,
}

impl SolveEvent {
    /// Event with only a timestamp.
    pub fn at(occurred_at: DateTime<Utc>) -> Self {
        Self {
            problem_id: 0,
            occurred_at,
            difficulty: None,
            topic: None,
        }
    }

    /// Build an event from a raw RFC 3339 timestamp, failing with the record id.
    pub fn parse(problem_id: i64, raw_ts: &str) -> Result<Self> {
        Ok(Self {
            problem_id,
            ..Self::at(parse_timestamp(problem_id, raw_ts)?)
        })
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn difficulty_class(&self) -> Option<Difficulty> {
        self.difficulty.as_deref().and_then(|d| d.parse().ok())
    }
}

/// Parse a stored RFC 3339 timestamp belonging to `problem_id`.
pub fn parse_timestamp(problem_id: i64, raw_ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw_ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidEvent {
            problem_id,
            reason: format!("unparseable timestamp {:?}: {}", raw_ts, e),
        })
}

/// Width of every value written by [`format_timestamp`].
pub const STORED_TIMESTAMP_LEN: usize = 27;

/// Storage form of a timestamp: UTC, microseconds, `Z` suffix.
///
/// Every value has the same width, so comparing the text compares the instants.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Inclusive calendar-day range used to narrow event fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range, both ends counted.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
