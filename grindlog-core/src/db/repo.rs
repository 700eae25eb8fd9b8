//! Database repository layer
//!
//! Problem CRUD, plus the [`EventSource`] read path the analytics run on.
//! Every query is scoped to a user id; another user's rows are invisible.

use crate::analytics::{EventSource, TimeWindow};
use crate::error::{Error, Result};
use crate::types::*;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const PROBLEM_COLUMNS: &str =
    "id, user_id, title, topic, difficulty, notes, needs_revision, created_at, updated_at";

/// Filter options for listing problems
#[derive(Debug, Clone, Default)]
pub struct ProblemFilter {
    /// Exact topic match
    pub topic: Option<String>,
    /// Only problems with (or without) the revision flag
    pub needs_revision: Option<bool>,
    /// Maximum number of problems to return
    pub limit: Option<usize>,
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        super::schema::run_migrations(&self.connection())
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Problem operations
    // ============================================

    /// Log a solved problem. `solved_at` defaults to now.
    pub fn create_problem(&self, user_id: i64, new: &NewProblem) -> Result<Problem> {
        new.validate()?;
        let now = Utc::now();
        let created_at = new.solved_at.unwrap_or(now);

        let conn = self.connection();
        conn.execute(
            r#"
            INSERT INTO problems
                (user_id, title, topic, difficulty, notes, needs_revision, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                new.title.trim(),
                new.topic.trim(),
                new.difficulty.as_str(),
                new.notes,
                new.needs_revision,
                format_timestamp(&created_at),
                format_timestamp(&now),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, problem_id = id, "Created problem");

        Ok(Problem {
            id,
            user_id,
            title: new.title.trim().to_string(),
            topic: new.topic.trim().to_string(),
            difficulty: new.difficulty.as_str().to_string(),
            notes: new.notes.clone(),
            needs_revision: new.needs_revision,
            created_at: parse_timestamp(id, &format_timestamp(&created_at))?,
            updated_at: parse_timestamp(id, &format_timestamp(&now))?,
        })
    }

    /// Get one of `user_id`'s problems
    pub fn get_problem(&self, user_id: i64, id: i64) -> Result<Option<Problem>> {
        let conn = self.connection();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM problems WHERE id = ?1 AND user_id = ?2",
                    PROBLEM_COLUMNS
                ),
                params![id, user_id],
                ProblemRow::from_row,
            )
            .optional()?;
        row.map(ProblemRow::into_problem).transpose()
    }

    /// List problems, most recently solved first
    pub fn list_problems(&self, user_id: i64, filter: &ProblemFilter) -> Result<Vec<Problem>> {
        let conn = self.connection();

        let mut sql = format!("SELECT {} FROM problems WHERE user_id = ?", PROBLEM_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(topic) = &filter.topic {
            sql.push_str(" AND topic = ?");
            params.push(Box::new(topic.clone()));
        }

        if let Some(needs_revision) = filter.needs_revision {
            sql.push_str(" AND needs_revision = ?");
            params.push(Box::new(needs_revision));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), ProblemRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(ProblemRow::into_problem).collect()
    }

    /// Apply a partial update and return the stored result
    pub fn update_problem(&self, user_id: i64, id: i64, update: &ProblemUpdate) -> Result<Problem> {
        update.validate()?;
        let mut problem = self
            .get_problem(user_id, id)?
            .ok_or(Error::ProblemNotFound(id))?;

        if update.is_empty() {
            return Ok(problem);
        }

        if let Some(title) = &update.title {
            problem.title = title.trim().to_string();
        }
        if let Some(topic) = &update.topic {
            problem.topic = topic.trim().to_string();
        }
        if let Some(difficulty) = update.difficulty {
            problem.difficulty = difficulty.as_str().to_string();
        }
        if let Some(notes) = &update.notes {
            problem.notes = notes.clone();
        }
        if let Some(needs_revision) = update.needs_revision {
            problem.needs_revision = needs_revision;
        }
        let updated_at = format_timestamp(&Utc::now());

        let conn = self.connection();
        let changed = conn.execute(
            r#"
            UPDATE problems
            SET title = ?1, topic = ?2, difficulty = ?3, notes = ?4,
                needs_revision = ?5, updated_at = ?6
            WHERE id = ?7 AND user_id = ?8
            "#,
            params![
                problem.title,
                problem.topic,
                problem.difficulty,
                problem.notes,
                problem.needs_revision,
                updated_at,
                id,
                user_id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::ProblemNotFound(id));
        }
        problem.updated_at = parse_timestamp(id, &updated_at)?;

        tracing::debug!(user_id, problem_id = id, "Updated problem");
        Ok(problem)
    }

    /// Delete one of `user_id`'s problems
    pub fn delete_problem(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.connection();
        let deleted = conn.execute(
            "DELETE FROM problems WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::ProblemNotFound(id));
        }
        tracing::debug!(user_id, problem_id = id, "Deleted problem");
        Ok(())
    }

    /// Count `user_id`'s problems
    pub fn count_problems(&self, user_id: i64) -> Result<i64> {
        let conn = self.connection();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM problems WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl EventSource for Database {
    fn fetch_events(&self, user_id: i64, window: Option<TimeWindow>) -> Result<Vec<SolveEvent>> {
        let conn = self.connection();

        let mut sql =
            String::from("SELECT id, created_at, difficulty, topic FROM problems WHERE user_id = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        // Text comparison is only valid for the canonical storage form; any
        // other value is fetched so it is parsed (and rejected or windowed) below
        if let Some(window) = &window {
            sql.push_str(
                " AND ((created_at >= ? AND created_at < ?)
                   OR length(created_at) != ? OR substr(created_at, -1) != 'Z')",
            );
            params.push(Box::new(format_timestamp(&window.start)));
            params.push(Box::new(format_timestamp(&window.end)));
            params.push(Box::new(STORED_TIMESTAMP_LEN as i64));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let events = rows
            .into_iter()
            .map(|(id, created_at, difficulty, topic)| {
                SolveEvent::parse(id, &created_at)
                    .map(|event| event.with_difficulty(difficulty).with_topic(topic))
            })
            .collect::<Result<Vec<_>>>()?;
        let events: Vec<SolveEvent> = match &window {
            Some(window) => events
                .into_iter()
                .filter(|e| window.contains(&e.occurred_at))
                .collect(),
            None => events,
        };

        tracing::trace!(
            user_id,
            count = events.len(),
            windowed = window.is_some(),
            "Fetched events"
        );
        Ok(events)
    }
}

/// Raw problem row; timestamps are parsed after the statement finishes so a
/// bad value surfaces as [`Error::InvalidEvent`] rather than a SQLite error.
struct ProblemRow {
    id: i64,
    user_id: i64,
    title: String,
    topic: String,
    difficulty: String,
    notes: Option<String>,
    needs_revision: bool,
    created_at: String,
    updated_at: String,
}

impl ProblemRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            topic: row.get("topic")?,
            difficulty: row.get("difficulty")?,
            notes: row.get("notes")?,
            needs_revision: row.get("needs_revision")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_problem(self) -> Result<Problem> {
        Ok(Problem {
            created_at: parse_timestamp(self.id, &self.created_at)?,
            updated_at: parse_timestamp(self.id, &self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            topic: self.topic,
            difficulty: self.difficulty,
            notes: self.notes,
            needs_revision: self.needs_revision,
        })
    }
}
