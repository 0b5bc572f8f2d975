//! Progress statistics derived from session history.
//!
//! All functions are pure over a slice of [`SessionRecord`]s and a reference
//! time, and only count sessions flagged `completed`. Day boundaries are UTC.

use crate::SessionRecord;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use std::collections::HashMap;

/// Number of days in the activity series
pub const ACTIVITY_DAYS: i64 = 30;

/// How many personal records to report
pub const MAX_PERSONAL_RECORDS: usize = 5;

/// Workouts on one calendar day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub workouts: usize,
}

/// Summary shown on the progress screen
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressStats {
    pub total_workouts: usize,
    pub total_minutes: u64,
    pub total_hours: u32,
    pub this_week: usize,
    pub weekly_goal: u32,
    /// This week's workouts over the goal, capped at 1
    pub weekly_progress: f64,
    pub current_streak: u32,
    /// Workouts in the last month minus workouts in the month before
    pub monthly_change: i64,
    pub activity: Vec<DailyActivity>,
}

/// A milestone and whether it has been reached
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Best estimated one-rep max for an exercise
#[derive(Clone, Debug, PartialEq)]
pub struct PersonalRecord {
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub date: DateTime<Utc>,
    pub estimated_max: f64,
}

fn completed(sessions: &[SessionRecord]) -> impl Iterator<Item = &SessionRecord> {
    sessions.iter().filter(|s| s.completed)
}

/// Compute the progress summary at `now`
pub fn compute_stats(sessions: &[SessionRecord], now: DateTime<Utc>, weekly_goal: u32) -> ProgressStats {
    let total_workouts = completed(sessions).count();
    let total_minutes: u64 = completed(sessions)
        .map(|s| u64::from(s.duration_minutes))
        .sum();
    let total_hours = (total_minutes as f64 / 60.0).round() as u32;

    let week_ago = now - Duration::days(7);
    let this_week = completed(sessions).filter(|s| s.date >= week_ago).count();
    let weekly_progress = if weekly_goal == 0 {
        1.0
    } else {
        (this_week as f64 / f64::from(weekly_goal)).min(1.0)
    };

    ProgressStats {
        total_workouts,
        total_minutes,
        total_hours,
        this_week,
        weekly_goal,
        weekly_progress,
        current_streak: current_streak(sessions, now),
        monthly_change: monthly_change(sessions, now),
        activity: daily_activity(sessions, now),
    }
}

/// Consecutive days with a workout, counting back from today.
///
/// A day without a workout today means no streak, even if yesterday had one.
pub fn current_streak(sessions: &[SessionRecord], now: DateTime<Utc>) -> u32 {
    let today = now.date_naive();
    let mut days: Vec<NaiveDate> = completed(sessions).map(|s| s.date.date_naive()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak: u32 = 0;
    for day in days {
        let diff = (today - day).num_days();
        if diff == i64::from(streak) {
            streak += 1;
        } else if diff > i64::from(streak) {
            break;
        }
    }
    streak
}

/// Workouts in the last month minus those in the month before it
pub fn monthly_change(sessions: &[SessionRecord], now: DateTime<Utc>) -> i64 {
    let one_month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    let two_months_ago = now.checked_sub_months(Months::new(2)).unwrap_or(one_month_ago);

    let this_month = completed(sessions)
        .filter(|s| s.date >= one_month_ago)
        .count() as i64;
    let last_month = completed(sessions)
        .filter(|s| s.date >= two_months_ago && s.date < one_month_ago)
        .count() as i64;

    this_month - last_month
}

/// Workout counts for each of the last [`ACTIVITY_DAYS`] days, oldest first
pub fn daily_activity(sessions: &[SessionRecord], now: DateTime<Utc>) -> Vec<DailyActivity> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for session in completed(sessions) {
        *per_day.entry(session.date.date_naive()).or_default() += 1;
    }

    let today = now.date_naive();
    (0..ACTIVITY_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DailyActivity {
                date,
                workouts: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Milestones unlocked by the given stats
pub fn achievements(stats: &ProgressStats) -> Vec<Achievement> {
    vec![
        Achievement {
            title: "First Workout",
            description: "Complete your first session",
            unlocked: stats.total_workouts >= 1,
        },
        Achievement {
            title: "Week Warrior",
            description: "7-day workout streak",
            unlocked: stats.current_streak >= 7,
        },
        Achievement {
            title: "Month Master",
            description: "30-day streak",
            unlocked: stats.current_streak >= 30,
        },
        Achievement {
            title: "Century Club",
            description: "100 total workouts",
            unlocked: stats.total_workouts >= 100,
        },
    ]
}

/// Estimated one-rep max: `weight × (1 + reps / 30)`
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// Best estimated one-rep max per exercise name, highest first
pub fn personal_records(sessions: &[SessionRecord]) -> Vec<PersonalRecord> {
    let mut best: HashMap<&str, PersonalRecord> = HashMap::new();

    for session in completed(sessions) {
        for entry in &session.exercises {
            if entry.weight <= 0.0 || entry.reps == 0 {
                continue;
            }

            let estimated_max = estimated_one_rep_max(entry.weight, entry.reps);
            let is_better = best
                .get(entry.name.as_str())
                .map_or(true, |current| estimated_max > current.estimated_max);

            if is_better {
                best.insert(
                    entry.name.as_str(),
                    PersonalRecord {
                        exercise: entry.name.clone(),
                        weight: entry.weight,
                        reps: entry.reps,
                        date: session.date,
                        estimated_max,
                    },
                );
            }
        }
    }

    let mut records: Vec<PersonalRecord> = best.into_values().collect();
    records.sort_by(|a, b| {
        b.estimated_max
            .total_cmp(&a.estimated_max)
            .then_with(|| a.exercise.cmp(&b.exercise))
    });
    records.truncate(MAX_PERSONAL_RECORDS);
    records
}
