//! Current and best streaks, recomputed from the contribution calendar.
//!
//! Nothing is persisted: the streak is a pure function of the daily series,
//! so backdated or deleted problems are reflected on the next read.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use super::calendar::{compute_contributions, DailyCount};
use crate::types::SolveEvent;

/// Consecutive-active-day counters. `best_streak >= current_streak`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Compute streaks from an ascending, gap-free daily series.
///
/// The current streak counts back from the most recent day. A zero on that
/// most recent day (nothing solved *yet* today) is skipped; a zero anywhere
/// else ends the run.
pub fn compute_streak(days: &[DailyCount]) -> StreakResult {
    let mut best_streak = 0u32;
    let mut run = 0u32;
    for day in days {
        if day.is_active() {
            run += 1;
            best_streak = best_streak.max(run);
        } else {
            run = 0;
        }
    }

    let last = days.len().saturating_sub(1);
    let mut current_streak = 0u32;
    for (i, day) in days.iter().enumerate().rev() {
        if day.is_active() {
            current_streak += 1;
        } else if i == last {
            continue;
        } else {
            break;
        }
    }

    StreakResult {
        current_streak,
        best_streak,
    }
}

/// Build the calendar ending at `now` and compute its streaks.
///
/// Runs older than the calendar window are not seen.
pub fn streak_for_events<Tz: TimeZone>(events: &[SolveEvent], now: &DateTime<Tz>) -> StreakResult {
    compute_streak(&compute_contributions(events, now))
}
