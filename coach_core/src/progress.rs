//! Per-exercise progress store.
//!
//! Holds one [`ExerciseProgress`] entry per exercise in the active session.
//! Numeric input is tolerant: text that does not parse becomes 0 and every
//! value is then clamped to the field's minimum, so the store never holds a
//! zero set or rep count.

use crate::{Error, Exercise, ExerciseId, ExerciseProgress, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Minimum number of sets
pub const MIN_SETS: u32 = 1;

/// Minimum number of reps per set
pub const MIN_REPS: u32 = 1;

/// Weight input increment offered by front ends
pub const WEIGHT_STEP: f64 = 2.5;

/// Editable fields of an exercise progress entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressField {
    Sets,
    Reps,
    Weight,
    RestTime,
}

impl ProgressField {
    /// Smallest value the field may hold
    pub fn minimum(self) -> f64 {
        match self {
            ProgressField::Sets => f64::from(MIN_SETS),
            ProgressField::Reps => f64::from(MIN_REPS),
            ProgressField::Weight | ProgressField::RestTime => 0.0,
        }
    }

    /// Coerce a raw numeric value into the field's valid range
    fn clamp(self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { 0.0 };
        match self {
            ProgressField::Weight => value.max(0.0),
            _ => value.trunc().clamp(self.minimum(), f64::from(u32::MAX)),
        }
    }
}

impl FromStr for ProgressField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "sets" => Ok(ProgressField::Sets),
            "reps" => Ok(ProgressField::Reps),
            "weight" => Ok(ProgressField::Weight),
            "restTime" | "rest_time" | "rest" => Ok(ProgressField::RestTime),
            other => Err(Error::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for ProgressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressField::Sets => "sets",
            ProgressField::Reps => "reps",
            ProgressField::Weight => "weight",
            ProgressField::RestTime => "restTime",
        };
        f.write_str(name)
    }
}

/// Parse user text as a number, treating anything unparseable as 0
pub fn coerce_input(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Mutable progress entries keyed by exercise
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgressStore {
    entries: HashMap<ExerciseId, ExerciseProgress>,
}

impl ProgressStore {
    /// Build one entry per exercise, copied from `template`
    pub fn initialize(exercises: &[Exercise], template: &ExerciseProgress) -> Self {
        let entries = exercises
            .iter()
            .map(|exercise| {
                let entry = ExerciseProgress {
                    completed: false,
                    ..template.clone()
                };
                (exercise.id, entry)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: ExerciseId) -> Option<&ExerciseProgress> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Update a field from raw user text
    pub fn update_field(&mut self, id: ExerciseId, field: &str, raw: &str) -> Result<()> {
        let field: ProgressField = field.parse()?;
        self.set_field(id, field, coerce_input(raw))
    }

    /// Update a field from a numeric value, clamped to the field's range
    pub fn set_field(&mut self, id: ExerciseId, field: ProgressField, value: f64) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(Error::UnknownExercise(id))?;

        let value = field.clamp(value);
        match field {
            ProgressField::Sets => entry.sets = value as u32,
            ProgressField::Reps => entry.reps = value as u32,
            ProgressField::Weight => entry.weight = value,
            ProgressField::RestTime => entry.rest_time_seconds = value as u32,
        }

        tracing::debug!("Exercise {}: {} set to {}", id, field, value);
        Ok(())
    }

    /// Mark an entry completed. Returns false if it already was.
    pub fn mark_completed(&mut self, id: ExerciseId) -> Result<bool> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(Error::UnknownExercise(id))?;

        if entry.completed {
            return Ok(false);
        }
        entry.completed = true;
        Ok(true)
    }

    pub fn is_completed(&self, id: ExerciseId) -> bool {
        self.entries.get(&id).map(|e| e.completed).unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|e| e.completed).count()
    }
}
