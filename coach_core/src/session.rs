//! Workout session progression.
//!
//! [`WorkoutSession`] walks a user through a fixed, ordered list of exercises:
//! - a cursor (`current_index`) that moves forward on completion or by
//!   manual navigation, always clamped to the sequence
//! - per-exercise progress entries that can only go from incomplete to
//!   complete
//! - on the last completion, a finished [`SessionRecord`]

use crate::progress::ProgressStore;
use crate::summary::build_session_record;
use crate::{
    Direction, Error, Exercise, ExerciseId, ExerciseProgress, PlanId, Result, SessionRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the caller should do after a completion attempt
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionSignal {
    /// An exercise was completed and the cursor moved on; start a rest
    /// countdown of `rest_seconds` (taken from the completed exercise)
    ContinueToNext {
        completed: ExerciseId,
        rest_seconds: u32,
    },
    /// The final exercise was completed; the record is ready to persist
    SessionComplete(Box<SessionRecord>),
    /// The current exercise was already complete; nothing changed
    AlreadyCompleted,
}

/// Run-time state of an active workout
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SessionSnapshot")]
pub struct WorkoutSession {
    plan_id: PlanId,
    exercises: Vec<Exercise>,
    progress: ProgressStore,
    current_index: usize,
    started_at: Option<DateTime<Utc>>,
}

/// Serialized form of a session, validated before it becomes a
/// [`WorkoutSession`]
#[derive(Deserialize)]
struct SessionSnapshot {
    plan_id: PlanId,
    exercises: Vec<Exercise>,
    progress: ProgressStore,
    current_index: usize,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionSnapshot> for WorkoutSession {
    type Error = Error;

    fn try_from(snapshot: SessionSnapshot) -> Result<Self> {
        if snapshot.exercises.is_empty() {
            return Err(Error::EmptySession);
        }
        if snapshot.current_index >= snapshot.exercises.len() {
            return Err(Error::Other(format!(
                "Session cursor {} out of range for {} exercises",
                snapshot.current_index,
                snapshot.exercises.len()
            )));
        }
        if let Some(missing) = snapshot
            .exercises
            .iter()
            .find(|e| snapshot.progress.get(e.id).is_none())
        {
            return Err(Error::UnknownExercise(missing.id));
        }

        Ok(Self {
            plan_id: snapshot.plan_id,
            exercises: snapshot.exercises,
            progress: snapshot.progress,
            current_index: snapshot.current_index,
            started_at: snapshot.started_at,
        })
    }
}

impl WorkoutSession {
    /// Start a session with default progress entries
    pub fn initialize(plan_id: PlanId, exercises: Vec<Exercise>, now: DateTime<Utc>) -> Result<Self> {
        Self::initialize_with(plan_id, exercises, &ExerciseProgress::default(), now)
    }

    /// Start a session with progress entries copied from `template`.
    ///
    /// Repeated exercises are dropped after their first occurrence since
    /// progress is keyed by exercise.
    pub fn initialize_with(
        plan_id: PlanId,
        exercises: Vec<Exercise>,
        template: &ExerciseProgress,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if exercises.is_empty() {
            return Err(Error::EmptySession);
        }

        let mut seen = HashSet::new();
        let total = exercises.len();
        let exercises: Vec<Exercise> = exercises
            .into_iter()
            .filter(|e| seen.insert(e.id))
            .collect();
        if exercises.len() != total {
            tracing::warn!(
                "Plan {} lists {} repeated exercises; keeping first occurrences",
                plan_id,
                total - exercises.len()
            );
        }

        let progress = ProgressStore::initialize(&exercises, template);
        tracing::info!(
            "Started session for plan {} with {} exercises",
            plan_id,
            exercises.len()
        );

        Ok(Self {
            plan_id,
            exercises,
            progress,
            current_index: 0,
            started_at: Some(now),
        })
    }

    /// Update a progress field of one exercise from raw user text
    pub fn update_field(&mut self, exercise_id: ExerciseId, field: &str, value: &str) -> Result<()> {
        self.progress.update_field(exercise_id, field, value)
    }

    /// Complete the exercise under the cursor
    pub fn complete_current_exercise(&mut self, now: DateTime<Utc>) -> Result<CompletionSignal> {
        // Checked up front so the final entry is never marked without a record
        if self.is_last() && self.started_at.is_none() {
            return Err(Error::MissingStartTime);
        }

        let current = &self.exercises[self.current_index];
        let id = current.id;

        if !self.progress.mark_completed(id)? {
            tracing::debug!("Exercise {} already completed", id);
            return Ok(CompletionSignal::AlreadyCompleted);
        }

        tracing::info!("Completed exercise {} ({})", id, current.name);

        if self.current_index + 1 < self.exercises.len() {
            let rest_seconds = self
                .progress
                .get(id)
                .map(|p| p.rest_time_seconds)
                .unwrap_or_default();
            self.current_index += 1;
            Ok(CompletionSignal::ContinueToNext {
                completed: id,
                rest_seconds,
            })
        } else {
            let record = build_session_record(self, now)?;
            Ok(CompletionSignal::SessionComplete(Box::new(record)))
        }
    }

    /// Move the cursor one step, clamped to the sequence
    pub fn navigate(&mut self, direction: Direction) {
        let last = self.exercises.len() - 1;
        self.current_index = match direction {
            Direction::Previous => self.current_index.saturating_sub(1),
            Direction::Next => (self.current_index + 1).min(last),
        };
    }

    /// Completed entries over total, in [0, 1]
    pub fn progress_fraction(&self) -> f64 {
        self.completed_count() as f64 / self.exercises.len() as f64
    }

    pub fn completed_count(&self) -> usize {
        self.exercises
            .iter()
            .filter(|e| self.progress.is_completed(e.id))
            .count()
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_for(&self, id: ExerciseId) -> Option<&ExerciseProgress> {
        self.progress.get(id)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.current_index]
    }

    pub fn current_progress(&self) -> Option<&ExerciseProgress> {
        self.progress.get(self.current_exercise().id)
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.exercises.len()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
}
