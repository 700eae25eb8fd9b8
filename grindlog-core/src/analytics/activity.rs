//! Time-of-day distribution: 24 hourly buckets and four activity periods.

use chrono::{TimeZone, Timelike};
use serde::Serialize;

use crate::types::SolveEvent;

/// Fixed clock-hour ranges, listed in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// 06-11
    Morning,
    /// 12-17
    Afternoon,
    /// 18-21
    Evening,
    /// 22-23 and 00-05
    Night,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Morning,
        Period::Afternoon,
        Period::Evening,
        Period::Night,
    ];

    pub fn of_hour(hour: u8) -> Self {
        match hour {
            6..=11 => Period::Morning,
            12..=17 => Period::Afternoon,
            18..=21 => Period::Evening,
            _ => Period::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
            Period::Night => "night",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    pub hour: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub count: u32,
    /// Rounded independently, so the four need not add up to 100
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub morning: PeriodSummary,
    pub afternoon: PeriodSummary,
    pub evening: PeriodSummary,
    pub night: PeriodSummary,
    pub total: u32,
    /// Busiest hour; the earliest wins a tie, 0 when there is no data
    pub peak_hour: u8,
    pub most_active_period: Period,
    /// Hours with at least one solve
    pub active_hours: u32,
    /// One decimal place
    pub avg_per_active_hour: f64,
}

impl ActivitySummary {
    pub fn periods(&self) -> [PeriodSummary; 4] {
        [self.morning, self.afternoon, self.evening, self.night]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityDistribution {
    pub hourly: Vec<HourlyBucket>,
    pub summary: ActivitySummary,
}

/// Bucket `events` by local hour in `tz` and derive the period summary.
pub fn compute_activity_distribution<Tz: TimeZone>(
    events: &[SolveEvent],
    tz: &Tz,
) -> ActivityDistribution {
    let mut counts = [0u32; 24];
    for event in events {
        let hour = event.occurred_at.with_timezone(tz).hour() as usize;
        counts[hour] += 1;
    }

    let hourly: Vec<HourlyBucket> = counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyBucket {
            hour: hour as u8,
            count,
        })
        .collect();

    ActivityDistribution {
        summary: summarize_hours(&counts),
        hourly,
    }
}

fn summarize_hours(counts: &[u32; 24]) -> ActivitySummary {
    let total: u32 = counts.iter().sum();

    let mut peak_hour = 0u8;
    for (hour, &count) in counts.iter().enumerate() {
        if count > counts[peak_hour as usize] {
            peak_hour = hour as u8;
        }
    }

    let active_hours = counts.iter().filter(|&&c| c > 0).count() as u32;
    let avg_per_active_hour = if total == 0 {
        0.0
    } else {
        round1(total as f64 / active_hours.max(1) as f64)
    };

    let mut period_counts = [0u32; 4];
    for (hour, &count) in counts.iter().enumerate() {
        period_counts[Period::of_hour(hour as u8) as usize] += count;
    }

    let period_summary = |idx: usize| PeriodSummary {
        period: Period::ALL[idx],
        count: period_counts[idx],
        percent: percent_of(period_counts[idx], total),
    };

    let mut most_active = 0usize;
    for idx in 1..4 {
        if period_counts[idx] > period_counts[most_active] {
            most_active = idx;
        }
    }

    ActivitySummary {
        morning: period_summary(0),
        afternoon: period_summary(1),
        evening: period_summary(2),
        night: period_summary(3),
        total,
        peak_hour,
        most_active_period: Period::ALL[most_active],
        active_hours,
        avg_per_active_hour,
    }
}

fn percent_of(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clock label for an hour, e.g. `"12 AM"`, `"3 PM"`.
pub fn hour_label(hour: u8) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at_hour(hour: u32) -> SolveEvent {
        SolveEvent::at(Utc.with_ymd_and_hms(2024, 3, 4, hour, 15, 0).unwrap())
    }

    fn at_hours(hours: &[(u32, usize)]) -> Vec<SolveEvent> {
        hours
            .iter()
            .flat_map(|&(h, n)| std::iter::repeat_with(move || at_hour(h)).take(n))
            .collect()
    }

    #[test]
    fn test_empty_has_no_nan() {
        let dist = compute_activity_distribution(&[], &Utc);
        let s = &dist.summary;

        assert_eq!(dist.hourly.len(), 24);
        assert_eq!(s.total, 0);
        assert_eq!(s.active_hours, 0);
        assert_eq!(s.avg_per_active_hour, 0.0);
        assert_eq!(s.peak_hour, 0);
        assert_eq!(s.most_active_period, Period::Morning);
        assert!(s.periods().iter().all(|p| p.percent == 0 && p.count == 0));
    }

    #[test]
    fn test_peak_hour_tie_takes_earliest() {
        let dist = compute_activity_distribution(&at_hours(&[(7, 5), (3, 5)]), &Utc);
        assert_eq!(dist.summary.peak_hour, 3);
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(Period::of_hour(5), Period::Night);
        assert_eq!(Period::of_hour(6), Period::Morning);
        assert_eq!(Period::of_hour(11), Period::Morning);
        assert_eq!(Period::of_hour(12), Period::Afternoon);
        assert_eq!(Period::of_hour(17), Period::Afternoon);
        assert_eq!(Period::of_hour(18), Period::Evening);
        assert_eq!(Period::of_hour(21), Period::Evening);
        assert_eq!(Period::of_hour(22), Period::Night);
        assert_eq!(Period::of_hour(0), Period::Night);
    }

    #[test]
    fn test_period_counts_sum_to_total() {
        let events = at_hours(&[(0, 1), (6, 2), (13, 3), (19, 1), (23, 4), (5, 2)]);
        let s = compute_activity_distribution(&events, &Utc).summary;
        assert_eq!(s.total, 13);
        assert_eq!(s.periods().iter().map(|p| p.count).sum::<u32>(), s.total);
        assert_eq!(s.night.count, 7);
        assert_eq!(s.most_active_period, Period::Night);
    }

    #[test]
    fn test_percentages_round_independently() {
        // Three equal periods: 33 + 33 + 33 = 99
        let events = at_hours(&[(8, 1), (14, 1), (20, 1)]);
        let s = compute_activity_distribution(&events, &Utc).summary;
        assert_eq!(s.morning.percent, 33);
        assert_eq!(s.afternoon.percent, 33);
        assert_eq!(s.evening.percent, 33);
        assert_eq!(s.night.percent, 0);
        assert_eq!(s.most_active_period, Period::Morning);
    }

    #[test]
    fn test_most_active_period_tie_priority() {
        let events = at_hours(&[(19, 2), (23, 2)]);
        let s = compute_activity_distribution(&events, &Utc).summary;
        assert_eq!(s.most_active_period, Period::Evening);
    }

    #[test]
    fn test_avg_per_active_hour_one_decimal() {
        // 7 events over 3 hours = 2.333..
        let events = at_hours(&[(1, 3), (9, 2), (15, 2)]);
        let s = compute_activity_distribution(&events, &Utc).summary;
        assert_eq!(s.active_hours, 3);
        assert_eq!(s.avg_per_active_hour, 2.3);
    }

    #[test]
    fn test_uses_local_hour() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let dist = compute_activity_distribution(&[at_hour(14)], &minus_five);
        assert_eq!(dist.hourly[9].count, 1);
        assert_eq!(dist.summary.morning.count, 1);
        assert_eq!(dist.summary.morning.percent, 100);
    }

    #[test]
    fn test_idempotent() {
        let events = at_hours(&[(2, 1), (10, 3)]);
        assert_eq!(
            compute_activity_distribution(&events, &Utc),
            compute_activity_distribution(&events, &Utc)
        );
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(23), "11 PM");
    }
}
