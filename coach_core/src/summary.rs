//! Builds the persisted record of a finished session.

use crate::session::WorkoutSession;
use crate::{Error, Result, SessionExerciseEntry, SessionRecord};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Convert a session's progress into a [`SessionRecord`] completed at `now`.
///
/// Every exercise is included in sequence order, completed or not. Elapsed
/// time is floored to whole minutes and never negative.
pub fn build_session_record(session: &WorkoutSession, now: DateTime<Utc>) -> Result<SessionRecord> {
    let started_at = session.started_at().ok_or(Error::MissingStartTime)?;

    let elapsed = (now - started_at).num_seconds().max(0);
    let duration_minutes = u32::try_from(elapsed / 60).unwrap_or(u32::MAX);

    let exercises = session
        .exercises()
        .iter()
        .map(|exercise| {
            let progress = session.progress_for(exercise.id).cloned().unwrap_or_default();
            SessionExerciseEntry {
                id: exercise.id,
                name: exercise.name.clone(),
                sets: progress.sets,
                reps: progress.reps,
                weight: progress.weight,
                completed: progress.completed,
                rest_time_seconds: progress.rest_time_seconds,
            }
        })
        .collect();

    Ok(SessionRecord {
        id: Uuid::new_v4(),
        plan_id: session.plan_id(),
        date: now,
        exercises,
        duration_minutes,
        completed: true,
    })
}
