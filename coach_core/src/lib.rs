#![forbid(unsafe_code)]

//! Core domain model and session logic for the repcoach workout coach.
//!
//! This crate provides:
//! - Domain types (exercises, plans, progress entries, session records)
//! - The rest countdown timer
//! - The session progression engine and summary builder
//! - Plan/exercise/session collaborators (in-memory and file-backed)
//! - Session log, CSV archive and progress statistics
//! - The user profile

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod timer;
pub mod progress;
pub mod session;
pub mod summary;
pub mod coach;
pub mod library;
pub mod backend;
pub mod wal;
pub mod archive;
pub mod stats;
pub mod profile;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use timer::{format_clock, CountdownTimer, TimerState};
pub use progress::{ProgressField, ProgressStore};
pub use session::{CompletionSignal, WorkoutSession};
pub use summary::build_session_record;
pub use coach::{Notice, SessionCoach, StepOutcome};
pub use library::{default_library, Library};
pub use backend::{
    open_backend, Backend, Enhancement, Enhancer, ExerciseReader, LocalBackend, MemoryBackend,
    NoEnhancer, PlanReader, ProfileReader, ProfileWriter, SessionReader, SessionWriter,
};
pub use wal::{LogContents, SessionLog};
pub use stats::{compute_stats, personal_records, ProgressStats};
pub use profile::{parse_goals, Profile, ProfileUpdate};
