//! Error types for the coach_core library.

use crate::types::ExerciseId;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session was started with no resolvable exercises
    #[error("Cannot start a workout session with no exercises")]
    EmptySession,

    /// A progress field name outside {sets, reps, weight, restTime}
    #[error("Invalid progress field: {0}")]
    InvalidField(String),

    /// Progress update for an exercise that is not part of the session
    #[error("Exercise {0} is not part of this session")]
    UnknownExercise(ExerciseId),

    /// Summary requested for a session whose start time was never recorded
    #[error("Session has no start time; it was never initialized")]
    MissingStartTime,

    /// A plan or exercise could not be found by a reader
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u32 },

    /// The session writer rejected a finished session
    #[error("Failed to save workout session: {0}")]
    SessionWrite(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Plan lookup miss
    pub fn plan_not_found(id: u32) -> Self {
        Error::NotFound { kind: "Workout plan", id }
    }

    /// Exercise lookup miss
    pub fn exercise_not_found(id: u32) -> Self {
        Error::NotFound { kind: "Exercise", id }
    }
}
