//! Count-based rollups for the dashboard header.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::Serialize;

use super::calendar::local_date;
use super::streak::{streak_for_events, StreakResult};
use crate::types::{Difficulty, SolveEvent};

/// Activity summary for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub today: u32,
    pub yesterday: u32,
    /// Monday through today
    pub this_week: u32,
    /// First of the month through today
    pub this_month: u32,
    /// `this_week / days elapsed this week (Monday = 1)`, never rounded
    pub avg_per_day_this_week: f64,
    /// Distinct days with at least one solve, all time
    pub active_days: u32,
    pub active_days_this_month: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Calendar anchors for "today" in the caller's zone.
#[derive(Debug, Clone, Copy)]
struct Anchors {
    today: NaiveDate,
    yesterday: NaiveDate,
    week_start: NaiveDate,
    month_start: NaiveDate,
    days_so_far_this_week: u32,
}

impl Anchors {
    fn new(today: NaiveDate) -> Self {
        let from_monday = today.weekday().num_days_from_monday();
        Self {
            today,
            yesterday: today - Duration::days(1),
            week_start: today - Duration::days(from_monday as i64),
            month_start: today - Duration::days(today.day0() as i64),
            days_so_far_this_week: from_monday + 1,
        }
    }
}

/// Aggregate `events` as of `now`, taking streaks from `streak`.
///
/// Events dated after today still count toward `total`, the difficulty
/// buckets and `active_days`, but toward no period counter.
pub fn compute_summary<Tz: TimeZone>(
    events: &[SolveEvent],
    streak: StreakResult,
    now: &DateTime<Tz>,
) -> Summary {
    let tz = now.timezone();
    let at = Anchors::new(now.date_naive());

    let mut summary = Summary {
        total: 0,
        easy: 0,
        medium: 0,
        hard: 0,
        today: 0,
        yesterday: 0,
        this_week: 0,
        this_month: 0,
        avg_per_day_this_week: 0.0,
        active_days: 0,
        active_days_this_month: 0,
        current_streak: streak.current_streak,
        best_streak: streak.best_streak,
    };

    let mut days: HashSet<NaiveDate> = HashSet::new();
    let mut month_days: HashSet<NaiveDate> = HashSet::new();

    for event in events {
        summary.total += 1;
        match event.difficulty_class() {
            Some(Difficulty::Easy) => summary.easy += 1,
            Some(Difficulty::Medium) => summary.medium += 1,
            Some(Difficulty::Hard) => summary.hard += 1,
            None => {}
        }

        let date = local_date(&event.occurred_at, &tz);
        days.insert(date);

        if date > at.today {
            continue;
        }
        if date == at.today {
            summary.today += 1;
        }
        if date == at.yesterday {
            summary.yesterday += 1;
        }
        if date >= at.week_start {
            summary.this_week += 1;
        }
        if date >= at.month_start {
            summary.this_month += 1;
            month_days.insert(date);
        }
    }

    summary.active_days = days.len() as u32;
    summary.active_days_this_month = month_days.len() as u32;
    summary.avg_per_day_this_week = summary.this_week as f64 / at.days_so_far_this_week as f64;

    summary
}

/// Summary with streaks recomputed from the same events.
pub fn summarize<Tz: TimeZone>(events: &[SolveEvent], now: &DateTime<Tz>) -> Summary {
    compute_summary(events, streak_for_events(events, now), now)
}
