//! Terminal and JSON rendering for CLI results.

use anyhow::Result;
use grindlog_core::analytics::{
    hour_label, ActivityDistribution, DailyCount, Dashboard, StreakResult, Summary, TopicCount,
};
use grindlog_core::Problem;
use serde::Serialize;

use crate::OutputFormat;

/// Heat-map glyphs indexed by contribution level
const LEVEL_GLYPHS: [char; 5] = ['.', '░', '▒', '▓', '█'];

const BAR_WIDTH: usize = 30;

pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// JSON goes out as-is; text is rendered by `text`.
    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(value),
        }
        Ok(())
    }

    pub fn problem(&self, problem: &Problem) -> Result<()> {
        self.emit(problem, |p| {
            println!("#{} {}", p.id, p.title);
            println!("  topic:      {}", p.topic);
            println!("  difficulty: {}", p.difficulty);
            println!(
                "  solved:     {}",
                p.created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            );
            if p.needs_revision {
                println!("  revision:   yes");
            }
            if let Some(notes) = &p.notes {
                println!("  notes:      {}", notes);
            }
        })
    }

    pub fn problems(&self, problems: &[Problem]) -> Result<()> {
        self.emit(problems, |problems| {
            if problems.is_empty() {
                println!("No problems logged yet.");
                return;
            }
            for p in problems {
                println!(
                    "{:>5}  {}  {:<6}  {:<14}  {}{}",
                    p.id,
                    p.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d"),
                    p.difficulty,
                    p.topic,
                    p.title,
                    if p.needs_revision { "  [revise]" } else { "" }
                );
            }
        })
    }

    pub fn deleted(&self, id: i64) -> Result<()> {
        self.emit(&serde_json::json!({ "deleted": id }), |_| {
            println!("Deleted problem #{}", id);
        })
    }

    pub fn summary(&self, summary: &Summary) -> Result<()> {
        self.emit(summary, print_summary)
    }

    pub fn streak(&self, streak: &StreakResult) -> Result<()> {
        self.emit(streak, |s| {
            println!("Current streak: {} {}", s.current_streak, days(s.current_streak));
            println!("Best streak:    {} {}", s.best_streak, days(s.best_streak));
        })
    }

    pub fn contributions(&self, calendar: &[DailyCount], include_empty: bool) -> Result<()> {
        self.emit(calendar, |calendar| {
            print_heat_strip(calendar);
            println!();
            let shown: Vec<&DailyCount> = calendar
                .iter()
                .filter(|d| include_empty || d.is_active())
                .collect();
            if shown.is_empty() {
                println!("No solves in the last year.");
            }
            for day in shown {
                println!("{}  {:>3}  {}", day.date, day.count, LEVEL_GLYPHS[day.level as usize]);
            }
        })
    }

    pub fn daily(&self, daily: &[DailyCount]) -> Result<()> {
        self.emit(daily, |daily| {
            if daily.is_empty() {
                println!("No solves yet.");
            }
            for day in daily {
                println!("{}  {:>3}", day.date, day.count);
            }
        })
    }

    pub fn topics(&self, topics: &[TopicCount]) -> Result<()> {
        self.emit(topics, print_topics)
    }

    pub fn activity(&self, activity: &ActivityDistribution) -> Result<()> {
        self.emit(activity, print_activity)
    }

    pub fn dashboard(&self, dashboard: &Dashboard) -> Result<()> {
        self.emit(dashboard, |d| {
            print_summary(&d.summary);
            println!();
            print_heat_strip(&d.contributions);
            println!();
            print_activity(&d.activity);
            println!();
            print_topics(&d.topics);
        })
    }
}

fn days(n: u32) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

fn print_summary(s: &Summary) {
    println!("SUMMARY");
    println!(
        "   Solved:    {:<8} Easy {} / Medium {} / Hard {}",
        s.total, s.easy, s.medium, s.hard
    );
    println!("   Today:     {:<8} Yesterday: {}", s.today, s.yesterday);
    println!(
        "   This week: {:<8} Avg/day:   {:.1}",
        s.this_week, s.avg_per_day_this_week
    );
    println!(
        "   This month: {:<7} Active days: {} ({} this month)",
        s.this_month, s.active_days, s.active_days_this_month
    );
    println!(
        "   Streak:    {:<8} Best:      {}",
        format!("{} {}", s.current_streak, days(s.current_streak)),
        s.best_streak
    );
}

/// One glyph per day, a row per week (the last row may be short).
fn print_heat_strip(calendar: &[DailyCount]) {
    let total: u32 = calendar.iter().map(|d| d.count).sum();
    println!("CONTRIBUTIONS ({} in the last year)", total);
    for week in calendar.chunks(7) {
        let row: String = week
            .iter()
            .map(|d| LEVEL_GLYPHS[d.level as usize])
            .collect();
        println!("   {}  {}", week[0].date.format("%Y-%m-%d"), row);
    }
}

fn print_activity(activity: &ActivityDistribution) {
    let s = &activity.summary;
    println!("ACTIVITY BY HOUR");
    if s.total == 0 {
        println!("   No solves yet.");
        return;
    }

    let max = activity.hourly.iter().map(|h| h.count).max().unwrap_or(0).max(1);
    for bucket in &activity.hourly {
        let width = (bucket.count as usize * BAR_WIDTH) / max as usize;
        println!(
            "   {:>5}  {:<width$} {}",
            hour_label(bucket.hour),
            "█".repeat(width),
            bucket.count,
            width = BAR_WIDTH
        );
    }
    println!();
    for period in s.periods() {
        println!(
            "   {:<10} {:>4}  {:>3}%",
            period.period.as_str(),
            period.count,
            period.percent
        );
    }
    println!(
        "   Peak hour: {}   Most active: {}   Active hours: {}   Avg/active hour: {:.1}",
        hour_label(s.peak_hour),
        s.most_active_period,
        s.active_hours,
        s.avg_per_active_hour
    );
}

fn print_topics(topics: &[TopicCount]) {
    println!("TOPICS");
    if topics.is_empty() {
        println!("   No solves yet.");
    }
    for t in topics {
        println!("   {:<20} {}", t.topic, t.count);
    }
}
