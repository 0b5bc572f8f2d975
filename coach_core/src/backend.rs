//! Collaborators that serve plans and exercises and persist sessions.
//!
//! The coach only sees the reader/writer traits. Two implementations are
//! provided and chosen through [`BackendKind`]:
//! - [`MemoryBackend`]: in-process fake seeded from the built-in library
//! - [`LocalBackend`]: library file plus an on-disk session log and archive

use crate::config::{BackendKind, Config};
use crate::library::{default_library, Library};
use crate::profile::{Profile, ProfileUpdate};
use crate::wal::SessionLog;
use crate::{Error, Exercise, ExerciseId, PlanId, Result, SessionRecord, WorkoutPlan};
use std::path::{Path, PathBuf};

/// Looks up workout plans
pub trait PlanReader {
    fn get_plan(&self, id: PlanId) -> Result<WorkoutPlan>;
    fn list_plans(&self) -> Result<Vec<WorkoutPlan>>;
}

/// Looks up exercises
pub trait ExerciseReader {
    fn get_exercise(&self, id: ExerciseId) -> Result<Exercise>;
    fn list_exercises(&self) -> Result<Vec<Exercise>>;
}

/// Persists finished sessions
pub trait SessionWriter {
    fn create_session(&mut self, record: &SessionRecord) -> Result<()>;
}

/// Reads back finished sessions
pub trait SessionReader {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>>;
}

/// Reads the user profile
pub trait ProfileReader {
    fn get_profile(&self) -> Result<Profile>;
}

/// Merges changes into the user profile and returns the result
pub trait ProfileWriter {
    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<Profile>;
}

/// Every collaborator the CLI needs, behind one object
pub trait Backend:
    PlanReader + ExerciseReader + SessionWriter + SessionReader + ProfileReader + ProfileWriter
{
}

impl<T> Backend for T where
    T: PlanReader + ExerciseReader + SessionWriter + SessionReader + ProfileReader + ProfileWriter
{
}

/// Open the backend selected in the configuration
pub fn open_backend(config: &Config) -> Result<Box<dyn Backend>> {
    match config.backend.kind {
        BackendKind::Memory => {
            tracing::info!("Using in-memory backend");
            Ok(Box::new(MemoryBackend::with_default_library()))
        }
        BackendKind::Local => {
            let backend = LocalBackend::open(&config.data.data_dir)?;
            Ok(Box::new(backend))
        }
    }
}

// ============================================================================
// Enhancement
// ============================================================================

/// Outcome of asking for enhanced exercise instructions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Enhancement {
    Text(String),
    Unavailable,
}

/// Optional best-effort instruction enhancement
pub trait Enhancer {
    fn enhance(&self, exercise: &Exercise) -> Enhancement;

    /// Free-form form advice, split into tips by [`parse_form_tips`]
    fn form_tips(&self, _exercise: &Exercise) -> Enhancement {
        Enhancement::Unavailable
    }
}

/// Enhancer used when no enhancement service is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEnhancer;

impl Enhancer for NoEnhancer {
    fn enhance(&self, _exercise: &Exercise) -> Enhancement {
        Enhancement::Unavailable
    }
}

/// Enhanced instructions when available, otherwise the static text
pub fn instructions_for(enhancer: &dyn Enhancer, exercise: &Exercise) -> String {
    match enhancer.enhance(exercise) {
        Enhancement::Text(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::debug!("Enhancement unavailable for {}, using static text", exercise.name);
            exercise.instructions.clone()
        }
    }
}

/// Form tips shown when no enhancement service answers
pub const FALLBACK_FORM_TIPS: [&str; 5] = [
    "Keep your core engaged throughout the movement",
    "Maintain controlled breathing - exhale on exertion",
    "Focus on proper form over speed or weight",
    "Keep your shoulders relaxed and away from your ears",
    "Maintain neutral spine alignment",
];

/// Form tips for an exercise, falling back to [`FALLBACK_FORM_TIPS`] when
/// the enhancer has nothing usable
pub fn form_tips_for(enhancer: &dyn Enhancer, exercise: &Exercise) -> Vec<String> {
    let tips = match enhancer.form_tips(exercise) {
        Enhancement::Text(text) => parse_form_tips(&text),
        Enhancement::Unavailable => Vec::new(),
    };

    if tips.is_empty() {
        tracing::debug!("Using fallback form tips for {}", exercise.name);
        FALLBACK_FORM_TIPS.iter().map(|tip| tip.to_string()).collect()
    } else {
        tips
    }
}

/// Split free-form enhancement text into at most five tips.
///
/// Lines, bullets (`•`, `-`) and `1.`-style numbering all separate tips;
/// fragments of ten characters or fewer and heading lines are dropped.
pub fn parse_form_tips(content: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        let is_numbering = c.is_ascii_digit() && chars.peek() == Some(&'.');
        if c == '\n' || c == '•' || c == '-' || is_numbering {
            if is_numbering {
                chars.next();
            }
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    pieces.push(current);

    pieces
        .into_iter()
        .map(|tip| tip.trim().to_string())
        .filter(|tip| tip.chars().count() > 10 && !tip.contains("Tips:") && !tip.contains("Form:"))
        .take(5)
        .collect()
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-process backend for tests and demos
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    library: Library,
    sessions: Vec<SessionRecord>,
    profile: Profile,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            sessions: Vec::new(),
            profile: Profile::default(),
            fail_writes: false,
        }
    }

    pub fn with_default_library() -> Self {
        Self::new(default_library().clone())
    }

    /// Make every subsequent `create_session` fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }
}

impl PlanReader for MemoryBackend {
    fn get_plan(&self, id: PlanId) -> Result<WorkoutPlan> {
        self.library
            .plan(id)
            .cloned()
            .ok_or_else(|| Error::plan_not_found(id))
    }

    fn list_plans(&self) -> Result<Vec<WorkoutPlan>> {
        Ok(self.library.plans.clone())
    }
}

impl ExerciseReader for MemoryBackend {
    fn get_exercise(&self, id: ExerciseId) -> Result<Exercise> {
        self.library
            .exercise(id)
            .cloned()
            .ok_or_else(|| Error::exercise_not_found(id))
    }

    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.library.exercises.clone())
    }
}

impl SessionWriter for MemoryBackend {
    fn create_session(&mut self, record: &SessionRecord) -> Result<()> {
        if self.fail_writes {
            return Err(Error::SessionWrite("in-memory backend is rejecting writes".into()));
        }
        self.sessions.push(record.clone());
        Ok(())
    }
}

impl SessionReader for MemoryBackend {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }
}

impl ProfileReader for MemoryBackend {
    fn get_profile(&self) -> Result<Profile> {
        Ok(self.profile.clone())
    }
}

impl ProfileWriter for MemoryBackend {
    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<Profile> {
        self.profile.apply(update);
        Ok(self.profile.clone())
    }
}

// ============================================================================
// Local file backend
// ============================================================================

/// File-backed collaborator rooted at a data directory:
/// - `library.json`: optional exercise library (built-in used if absent)
/// - `sessions.wal`: append-only session log
/// - `sessions.csv`: rolled-up archive
/// - `profile.json`: user profile
#[derive(Clone, Debug)]
pub struct LocalBackend {
    library: Library,
    log: SessionLog,
    csv_path: PathBuf,
    profile_path: PathBuf,
}

impl LocalBackend {
    pub const LIBRARY_FILE: &'static str = "library.json";
    pub const LOG_FILE: &'static str = "sessions.wal";
    pub const ARCHIVE_FILE: &'static str = "sessions.csv";
    pub const PROFILE_FILE: &'static str = "profile.json";

    /// Open the backend, loading `library.json` if present
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let library_path = data_dir.join(Self::LIBRARY_FILE);
        let library = if library_path.exists() {
            Library::load(&library_path)?
        } else {
            tracing::debug!("No library file at {:?}, using built-in library", library_path);
            default_library().clone()
        };

        for problem in library.validate() {
            tracing::warn!("Library: {}", problem);
        }

        Ok(Self {
            library,
            log: SessionLog::new(data_dir.join(Self::LOG_FILE)),
            csv_path: data_dir.join(Self::ARCHIVE_FILE),
            profile_path: data_dir.join(Self::PROFILE_FILE),
        })
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn archive_path(&self) -> &Path {
        &self.csv_path
    }
}

impl PlanReader for LocalBackend {
    fn get_plan(&self, id: PlanId) -> Result<WorkoutPlan> {
        self.library
            .plan(id)
            .cloned()
            .ok_or_else(|| Error::plan_not_found(id))
    }

    fn list_plans(&self) -> Result<Vec<WorkoutPlan>> {
        Ok(self.library.plans.clone())
    }
}

impl ExerciseReader for LocalBackend {
    fn get_exercise(&self, id: ExerciseId) -> Result<Exercise> {
        self.library
            .exercise(id)
            .cloned()
            .ok_or_else(|| Error::exercise_not_found(id))
    }

    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.library.exercises.clone())
    }
}

impl SessionWriter for LocalBackend {
    fn create_session(&mut self, record: &SessionRecord) -> Result<()> {
        self.log.create_session(record)?;
        tracing::info!("Saved session {} for plan {}", record.id, record.plan_id);
        Ok(())
    }
}

impl SessionReader for LocalBackend {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        crate::archive::load_history(&self.log, &self.csv_path)
    }
}

impl ProfileReader for LocalBackend {
    fn get_profile(&self) -> Result<Profile> {
        Profile::load(&self.profile_path)
    }
}

impl ProfileWriter for LocalBackend {
    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<Profile> {
        let mut profile = Profile::load(&self.profile_path)?;
        profile.apply(update);
        profile.save(&self.profile_path)?;
        tracing::info!("Updated profile at {:?}", self.profile_path);
        Ok(profile)
    }
}
