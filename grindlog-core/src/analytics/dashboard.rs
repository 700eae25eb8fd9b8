//! Per-user analytics over an [`EventSource`].
//!
//! [`UserAnalytics`] runs one computation per call, fetching only what that
//! computation needs. [`Dashboard`] fetches once and derives everything from
//! the same event list, so its parts always agree with each other.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use super::activity::{compute_activity_distribution, ActivityDistribution};
use super::calendar::{
    build_contributions, contribution_window, daily_stats, utc_window, DailyCount,
};
use super::streak::{compute_streak, StreakResult};
use super::summary::{compute_summary, Summary};
use super::topics::{topic_breakdown, TopicCount};
use super::EventSource;
use crate::error::Result;

/// Analytics for one user, backed by any event source.
pub struct UserAnalytics<'a, S: EventSource + ?Sized> {
    source: &'a S,
    user_id: i64,
}

impl<'a, S: EventSource + ?Sized> UserAnalytics<'a, S> {
    pub fn new(source: &'a S, user_id: i64) -> Self {
        Self { source, user_id }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Dense calendar ending on the local date of `now`.
    ///
    /// Only the calendar window is fetched.
    pub fn contributions<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Vec<DailyCount>> {
        let tz = now.timezone();
        let today = now.date_naive();
        let window = utc_window(&contribution_window(today), &tz);
        let events = self.source.fetch_events(self.user_id, Some(window))?;
        Ok(build_contributions(&events, today, &tz))
    }

    pub fn streak<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<StreakResult> {
        Ok(compute_streak(&self.contributions(now)?))
    }

    pub fn summary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Summary> {
        let events = self.source.fetch_events(self.user_id, None)?;
        let tz = now.timezone();
        let calendar = build_contributions(&events, now.date_naive(), &tz);
        Ok(compute_summary(&events, compute_streak(&calendar), now))
    }

    pub fn activity<Tz: TimeZone>(&self, tz: &Tz) -> Result<ActivityDistribution> {
        let events = self.source.fetch_events(self.user_id, None)?;
        Ok(compute_activity_distribution(&events, tz))
    }

    pub fn topics(&self) -> Result<Vec<TopicCount>> {
        let events = self.source.fetch_events(self.user_id, None)?;
        Ok(topic_breakdown(&events))
    }

    /// Sparse per-day counts over the whole history.
    pub fn daily<Tz: TimeZone>(&self, tz: &Tz) -> Result<Vec<DailyCount>> {
        let events = self.source.fetch_events(self.user_id, None)?;
        Ok(daily_stats(&events, tz))
    }

    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Dashboard> {
        Dashboard::build(self.source, self.user_id, now)
    }
}

/// Everything the dashboard page shows, computed from a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user_id: i64,
    pub summary: Summary,
    pub contributions: Vec<DailyCount>,
    pub activity: ActivityDistribution,
    pub topics: Vec<TopicCount>,
}

impl Dashboard {
    pub fn build<S, Tz>(source: &S, user_id: i64, now: &DateTime<Tz>) -> Result<Self>
    where
        S: EventSource + ?Sized,
        Tz: TimeZone,
    {
        let events = source.fetch_events(user_id, None)?;
        tracing::debug!(user_id, events = events.len(), "Building dashboard");

        let tz = now.timezone();
        let contributions = build_contributions(&events, now.date_naive(), &tz);
        let streak = compute_streak(&contributions);

        Ok(Self {
            user_id,
            summary: compute_summary(&events, streak, now),
            activity: compute_activity_distribution(&events, &tz),
            topics: topic_breakdown(&events),
            contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::TimeWindow;
    use crate::error::Error;
    use crate::types::SolveEvent;
    use chrono::{Duration, FixedOffset, Utc};
    use std::cell::RefCell;

    /// In-memory source that records the windows it was asked for.
    #[derive(Default)]
    struct FakeSource {
        events: Vec<(i64, SolveEvent)>,
        windows: RefCell<Vec<Option<TimeWindow>>>,
        fail_with: Option<i64>,
    }

    impl FakeSource {
        fn with(events: Vec<(i64, SolveEvent)>) -> Self {
            Self {
                events,
                ..Default::default()
            }
        }
    }

    impl EventSource for FakeSource {
        fn fetch_events(&self, user_id: i64, window: Option<TimeWindow>) -> Result<Vec<SolveEvent>> {
            self.windows.borrow_mut().push(window);
            if let Some(problem_id) = self.fail_with {
                return Err(Error::InvalidEvent {
                    problem_id,
                    reason: "bad timestamp".to_string(),
                });
            }
            Ok(self
                .events
                .iter()
                .filter(|(owner, e)| {
                    *owner == user_id && window.map_or(true, |w| w.contains(&e.occurred_at))
                })
                .map(|(_, e)| e.clone())
                .collect())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> SolveEvent {
        SolveEvent::at(now() - Duration::days(days))
            .with_difficulty("Medium")
            .with_topic("graphs")
    }

    #[test]
    fn test_dashboard_single_fetch_consistent() {
        let source = FakeSource::with(vec![
            (1, days_ago(0)),
            (1, days_ago(1)),
            (1, days_ago(2)),
            (1, days_ago(500)),
            (2, days_ago(0)),
        ]);
        let dashboard = Dashboard::build(&source, 1, &now()).unwrap();

        assert_eq!(source.windows.borrow().len(), 1);
        assert_eq!(dashboard.user_id, 1);
        assert_eq!(dashboard.summary.total, 4);
        assert_eq!(dashboard.summary.medium, 4);
        assert_eq!(dashboard.summary.current_streak, 3);
        assert_eq!(dashboard.contributions.len(), 366);
        // The 500-day-old event is outside the calendar but not the activity view
        assert_eq!(dashboard.contributions.iter().map(|d| d.count).sum::<u32>(), 3);
        assert_eq!(dashboard.activity.summary.total, 4);
        assert_eq!(dashboard.topics[0].count, 4);
    }

    #[test]
    fn test_contributions_fetch_only_the_window() {
        let source = FakeSource::with(vec![(1, days_ago(0)), (1, days_ago(400))]);
        let analytics = UserAnalytics::new(&source, 1);
        let calendar = analytics.contributions(&now()).unwrap();

        assert_eq!(calendar.iter().map(|d| d.count).sum::<u32>(), 1);
        let windows = source.windows.borrow();
        let window = windows[0].expect("contributions should narrow the fetch");
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 6, 13, 0, 0, 0).unwrap());
        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 6, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_follows_caller_zone() {
        let source = FakeSource::default();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let local_now = now().with_timezone(&tokyo);
        UserAnalytics::new(&source, 1).contributions(&local_now).unwrap();

        let window = source.windows.borrow()[0].unwrap();
        // Local midnight after 2024-06-13 (already the 13th in Tokyo)
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 6, 13, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_facade_matches_dashboard() {
        let source = FakeSource::with(vec![(1, days_ago(0)), (1, days_ago(3)), (1, days_ago(4))]);
        let analytics = UserAnalytics::new(&source, 1);
        let dashboard = analytics.dashboard(&now()).unwrap();

        assert_eq!(analytics.summary(&now()).unwrap(), dashboard.summary);
        assert_eq!(analytics.contributions(&now()).unwrap(), dashboard.contributions);
        assert_eq!(analytics.activity(&Utc).unwrap(), dashboard.activity);
        assert_eq!(analytics.topics().unwrap(), dashboard.topics);

        let streak = analytics.streak(&now()).unwrap();
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.best_streak, 2);
        assert_eq!(analytics.daily(&Utc).unwrap().len(), 3);
    }

    #[test]
    fn test_source_error_propagates() {
        let source = FakeSource {
            fail_with: Some(42),
            ..Default::default()
        };
        let err = Dashboard::build(&source, 1, &now()).unwrap_err();
        assert!(matches!(err, Error::InvalidEvent { problem_id: 42, .. }));
        assert!(UserAnalytics::new(&source, 1).streak(&now()).is_err());
    }

    #[test]
    fn test_unknown_user_is_empty_not_error() {
        let source = FakeSource::with(vec![(1, days_ago(0))]);
        let dashboard = Dashboard::build(&source, 99, &now()).unwrap();
        assert_eq!(dashboard.summary.total, 0);
        assert_eq!(dashboard.summary.current_streak, 0);
        assert!(dashboard.topics.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let source = FakeSource::with(vec![(1, days_ago(0))]);
        let json = serde_json::to_value(Dashboard::build(&source, 1, &now()).unwrap()).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["summary"]["currentStreak"], 1);
        assert_eq!(json["activity"]["summary"]["peakHour"], 15);
        assert_eq!(json["contributions"].as_array().unwrap().len(), 366);
    }
}
