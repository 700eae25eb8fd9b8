//! Analytics module for grindlog
//!
//! Pure computations over a user's solve events:
//! - Contribution calendar (dense daily counts over a trailing year)
//! - Current/best streaks derived from that calendar
//! - Summary rollups (difficulty, today/week/month, active days)
//! - Time-of-day distribution (hourly buckets and activity periods)
//! - Topic breakdown
//!
//! None of these functions do I/O. Events come in through an [`EventSource`],
//! which the binary backs with the SQLite [`Database`](crate::Database) and
//! tests back with an in-memory fake.

pub mod activity;
pub mod calendar;
pub mod dashboard;
pub mod streak;
pub mod summary;
pub mod topics;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::SolveEvent;

/// Half-open instant range `[start, end)` for narrowing fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }
}

/// Read side of the problem store, as seen by analytics.
///
/// Implementations return one user's events only. Order is not significant.
/// A record whose timestamp cannot be read must fail the whole fetch with
/// [`Error::InvalidEvent`](crate::Error::InvalidEvent).
pub trait EventSource {
    fn fetch_events(&self, user_id: i64, window: Option<TimeWindow>) -> Result<Vec<SolveEvent>>;
}

pub use activity::{
    compute_activity_distribution, hour_label, ActivityDistribution, ActivitySummary,
    HourlyBucket, Period, PeriodSummary,
};
pub use calendar::{
    build_contributions, compute_contributions, contribution_level, contribution_window,
    daily_stats, utc_window, DailyCount, CONTRIBUTION_LOOKBACK_DAYS,
};
pub use dashboard::{Dashboard, UserAnalytics};
pub use streak::{compute_streak, streak_for_events, StreakResult};
pub use summary::{compute_summary, summarize, Summary};
pub use topics::{topic_breakdown, TopicCount, UNTAGGED_TOPIC};
