//! Contribution calendar: dense per-day solve counts over a trailing year.
//!
//! Events are bucketed by the calendar date of their timestamp in the
//! caller's time zone. Time of day is dropped here on purpose; the hourly
//! view lives in [`super::activity`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use super::TimeWindow;
use crate::types::{DateRange, SolveEvent};

/// Days looked back from today. The window also includes today itself,
/// so a calendar always has `CONTRIBUTION_LOOKBACK_DAYS + 1` entries.
pub const CONTRIBUTION_LOOKBACK_DAYS: i64 = 365;

/// Solve count for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
    /// Heat-map intensity (0-4), see [`contribution_level`]
    pub level: u8,
}

impl DailyCount {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self {
            date,
            count,
            level: contribution_level(count),
        }
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Heat-map bucket for a day's count: 0, 1-2, 3-4, 5-6, 7+.
pub fn contribution_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

/// Calendar date of `ts` as seen in `tz`.
pub fn local_date<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// The closed window `[today - 365 days, today]`.
pub fn contribution_window(today: NaiveDate) -> DateRange {
    DateRange::new(today - Duration::days(CONTRIBUTION_LOOKBACK_DAYS), today)
}

/// Instants covering the local days of `range`: local midnight of the first
/// day up to local midnight after the last.
pub fn utc_window<Tz: TimeZone>(range: &DateRange, tz: &Tz) -> TimeWindow {
    TimeWindow {
        start: local_midnight(range.start, tz),
        end: local_midnight(range.end + Duration::days(1), tz),
    }
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    first_existing_instant(date.and_time(NaiveTime::MIN), |local| {
        tz.from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Resolve local `naive`, or one hour later when a DST jump skips it.
/// A zone that has neither falls back to reading `naive` as UTC.
fn first_existing_instant(
    naive: NaiveDateTime,
    resolve: impl Fn(NaiveDateTime) -> Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    resolve(naive)
        .or_else(|| resolve(naive + Duration::hours(1)))
        .unwrap_or_else(|| naive.and_utc())
}

/// Build the gap-free calendar ending at `today`.
///
/// Events outside the window, including any dated after `today`, are ignored.
pub fn build_contributions<Tz: TimeZone>(
    events: &[SolveEvent],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyCount> {
    let window = contribution_window(today);

    let mut by_day: HashMap<NaiveDate, u32> = HashMap::new();
    for event in events {
        let date = local_date(&event.occurred_at, tz);
        if window.contains(date) {
            *by_day.entry(date).or_insert(0) += 1;
        }
    }

    window
        .start
        .iter_days()
        .take(window.len_days() as usize)
        .map(|date| DailyCount::new(date, by_day.get(&date).copied().unwrap_or(0)))
        .collect()
}

/// Calendar ending on the local date of `now`.
pub fn compute_contributions<Tz: TimeZone>(
    events: &[SolveEvent],
    now: &DateTime<Tz>,
) -> Vec<DailyCount> {
    build_contributions(events, now.date_naive(), &now.timezone())
}

/// Sparse per-day counts over the whole history, ascending.
///
/// Only days with at least one solve appear.
pub fn daily_stats<Tz: TimeZone>(events: &[SolveEvent], tz: &Tz) -> Vec<DailyCount> {
    let mut by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for event in events {
        *by_day.entry(local_date(&event.occurred_at, tz)).or_insert(0) += 1;
    }
    by_day
        .into_iter()
        .map(|(date, count)| DailyCount::new(date, count))
        .collect()
}
