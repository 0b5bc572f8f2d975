//! Core domain types for the workout coach.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and workout plans (read-only library data)
//! - Per-exercise progress entries tracked during a session
//! - Finished session records handed to persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an exercise in the library
pub type ExerciseId = u32;

/// Identifier of a workout plan
pub type PlanId = u32;

// ============================================================================
// Library Types
// ============================================================================

/// An exercise from the library (e.g., "Barbell Squat")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub instructions: String,
}

impl Exercise {
    /// Case-insensitive match against a muscle group
    pub fn targets(&self, muscle: &str) -> bool {
        self.muscle_groups
            .iter()
            .any(|m| m.eq_ignore_ascii_case(muscle))
    }

    /// Case-insensitive substring search over name, muscle groups and equipment
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&query)
            || self
                .muscle_groups
                .iter()
                .any(|m| m.to_lowercase().contains(&query))
            || self
                .equipment
                .iter()
                .any(|e| e.to_lowercase().contains(&query))
    }
}

/// Plan difficulty label
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A workout plan: an ordered list of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: PlanId,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub exercises: Vec<ExerciseId>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Per-exercise entry tracked while a session is running
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseProgress {
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub rest_time_seconds: u32,
    pub completed: bool,
}

impl Default for ExerciseProgress {
    fn default() -> Self {
        Self {
            sets: 3,
            reps: 10,
            weight: 0.0,
            rest_time_seconds: 60,
            completed: false,
        }
    }
}

/// Manual navigation through the exercise sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// One exercise line of a finished session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionExerciseEntry {
    pub id: ExerciseId,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub completed: bool,
    pub rest_time_seconds: u32,
}

/// A finished workout session, as handed to the session writer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub plan_id: PlanId,
    pub date: DateTime<Utc>,
    pub exercises: Vec<SessionExerciseEntry>,
    pub duration_minutes: u32,
    pub completed: bool,
}
