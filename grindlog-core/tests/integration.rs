//! Integration tests for the problem store and the analytics built on it
//!
//! These run against a real SQLite file in a temp directory, going through
//! the same `EventSource` path the CLI uses.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use grindlog_core::analytics::{Dashboard, EventSource, Period, UserAnalytics};
use grindlog_core::{Database, Difficulty, Error, NewProblem, ProblemFilter, ProblemUpdate};
use tempfile::TempDir;

fn open_db(dir: &TempDir) -> Database {
    grindlog_core::logging::init_test();
    let db = Database::open(&dir.path().join("nested/data.db")).expect("open should succeed");
    db.migrate().expect("migrations should succeed");
    db
}

fn log(db: &Database, user_id: i64, at: DateTime<Utc>, topic: &str, difficulty: Difficulty) {
    db.create_problem(
        user_id,
        &NewProblem {
            solved_at: Some(at),
            ..NewProblem::new(format!("{topic} problem"), topic, difficulty)
        },
    )
    .expect("create should succeed");
}

/// Wednesday afternoon, UTC
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
}

// ============================================
// Store + analytics end to end
// ============================================

#[test]
fn test_dashboard_from_sqlite() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    log(&db, 1, now() - Duration::hours(6), "graphs", Difficulty::Hard);
    log(&db, 1, now() - Duration::hours(5), "graphs", Difficulty::Medium);
    log(&db, 1, now() - Duration::days(1), "dp", Difficulty::Easy);
    log(&db, 1, now() - Duration::days(2), "arrays", Difficulty::Easy);
    log(&db, 1, now() - Duration::days(30), "dp", Difficulty::Medium);
    log(&db, 2, now(), "graphs", Difficulty::Hard);

    let dashboard = Dashboard::build(&db, 1, &now()).unwrap();
    let summary = &dashboard.summary;

    assert_eq!(summary.total, 5);
    assert_eq!((summary.easy, summary.medium, summary.hard), (2, 2, 1));
    assert_eq!(summary.today, 2);
    assert_eq!(summary.yesterday, 1);
    assert_eq!(summary.this_week, 4);
    assert_eq!(summary.active_days, 4);
    assert_eq!(summary.current_streak, 3);
    assert_eq!(summary.best_streak, 3);

    assert_eq!(dashboard.contributions.len(), 366);
    assert_eq!(dashboard.contributions.last().unwrap().count, 2);

    // 09:00 and 10:00 are morning; the other three all land at 15:00
    assert_eq!(dashboard.activity.summary.peak_hour, 15);
    assert_eq!(dashboard.activity.summary.most_active_period, Period::Afternoon);

    let topics: Vec<(&str, u32)> = dashboard
        .topics
        .iter()
        .map(|t| (t.topic.as_str(), t.count))
        .collect();
    assert_eq!(topics, vec![("dp", 2), ("graphs", 2), ("arrays", 1)]);
}

#[test]
fn test_reopened_database_keeps_problems() {
    let dir = TempDir::new().unwrap();
    {
        let db = open_db(&dir);
        log(&db, 1, now(), "trees", Difficulty::Medium);
    }

    let db = open_db(&dir);
    assert_eq!(db.count_problems(1).unwrap(), 1);
    assert_eq!(db.fetch_events(1, None).unwrap().len(), 1);
}

#[test]
fn test_backdated_and_deleted_problems_change_streak() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let analytics = UserAnalytics::new(&db, 1);

    log(&db, 1, now(), "arrays", Difficulty::Easy);
    log(&db, 1, now() - Duration::days(2), "arrays", Difficulty::Easy);
    assert_eq!(analytics.streak(&now()).unwrap().current_streak, 1);

    // Filling the gap joins the two runs
    log(&db, 1, now() - Duration::days(1), "arrays", Difficulty::Easy);
    assert_eq!(analytics.streak(&now()).unwrap().current_streak, 3);

    let gap = db
        .list_problems(1, &ProblemFilter::default())
        .unwrap()
        .into_iter()
        .find(|p| p.created_at == now() - Duration::days(1))
        .unwrap();
    db.delete_problem(1, gap.id).unwrap();

    let streak = analytics.streak(&now()).unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.best_streak, 1);
}

#[test]
fn test_calendar_follows_local_zone() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    // 23:30 UTC is already the next day in UTC+2
    log(&db, 1, Utc.with_ymd_and_hms(2024, 6, 11, 23, 30, 0).unwrap(), "dp", Difficulty::Hard);

    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let local_now = now().with_timezone(&plus_two);
    let calendar = UserAnalytics::new(&db, 1).contributions(&local_now).unwrap();

    assert_eq!(calendar.last().unwrap().count, 1);
    assert_eq!(calendar[calendar.len() - 2].count, 0);
}

#[test]
fn test_update_then_summary_reflects_difficulty() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    log(&db, 1, now(), "heaps", Difficulty::Easy);
    let problem = &db.list_problems(1, &ProblemFilter::default()).unwrap()[0];

    db.update_problem(
        1,
        problem.id,
        &ProblemUpdate {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        },
    )
    .unwrap();

    let summary = UserAnalytics::new(&db, 1).summary(&now()).unwrap();
    assert_eq!((summary.easy, summary.hard), (0, 1));
}

// ============================================
// Error handling
// ============================================

#[test]
fn test_corrupt_timestamp_fails_dashboard() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    log(&db, 1, now(), "arrays", Difficulty::Easy);

    db.connection()
        .execute(
            "UPDATE problems SET created_at = 'not a date' WHERE user_id = 1",
            [],
        )
        .unwrap();

    let err = Dashboard::build(&db, 1, &now()).unwrap_err();
    assert!(matches!(err, Error::InvalidEvent { problem_id: 1, .. }));
    assert!(err.to_string().contains("not a date"));
}

#[test]
fn test_corrupt_timestamp_fails_windowed_views() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    log(&db, 1, now(), "arrays", Difficulty::Easy);
    log(&db, 1, now() - Duration::days(1), "arrays", Difficulty::Easy);

    db.connection()
        .execute(
            "INSERT INTO problems (user_id, title, topic, difficulty, created_at, updated_at)
             VALUES (1, 'Broken', 'arrays', 'Easy', 'garbage', 'garbage')",
            [],
        )
        .unwrap();

    let analytics = UserAnalytics::new(&db, 1);
    assert!(matches!(
        analytics.streak(&now()),
        Err(Error::InvalidEvent { problem_id: 3, .. })
    ));
    assert!(matches!(
        analytics.contributions(&now()),
        Err(Error::InvalidEvent { problem_id: 3, .. })
    ));
}

#[test]
fn test_empty_user_gets_zeroed_dashboard() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let dashboard = Dashboard::build(&db, 7, &now()).unwrap();
    assert_eq!(dashboard.summary.total, 0);
    assert_eq!(dashboard.summary.avg_per_day_this_week, 0.0);
    assert_eq!(dashboard.activity.summary.avg_per_active_hour, 0.0);
    assert_eq!(dashboard.activity.summary.most_active_period, Period::Morning);
    assert!(dashboard.contributions.iter().all(|d| d.count == 0));
}
