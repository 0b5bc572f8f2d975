//! Session coach: runs a workout against injected collaborators.
//!
//! [`SessionCoach`] loads a plan through the readers, drives a
//! [`WorkoutSession`], owns the single rest countdown and hands the finished
//! record to the writer. User-facing messages are queued as [`Notice`]s.

use crate::backend::{form_tips_for, instructions_for, Enhancer, ExerciseReader, NoEnhancer, PlanReader, SessionWriter};
use crate::session::{CompletionSignal, WorkoutSession};
use crate::timer::{format_clock, CountdownTimer, TimerState};
use crate::{
    Direction, Exercise, ExerciseId, ExerciseProgress, PlanId, Result, SessionRecord, WorkoutPlan,
};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Messages for the user, in the order they occurred
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    /// Plan entries whose exercise could not be loaded
    ExercisesUnavailable { count: usize },
    /// Repeated plan entries merged into their first occurrence
    RepeatsMerged { count: usize },
    ExerciseCompleted { name: String },
    RestStarted { seconds: u32 },
    RestOver,
    WorkoutSaved { duration_minutes: u32 },
    SaveFailed { reason: String },
}

/// Result of one completion attempt, as seen by the front end
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Moved on to the next exercise; a rest countdown is running
    Continue,
    /// Nothing changed; the current exercise was already done
    AlreadyCompleted,
    /// Workout finished and persisted
    Finished(Box<SessionRecord>),
    /// Workout finished but the writer failed; the record is returned so
    /// the caller can decide what to do with it
    FinishedUnsaved(Box<SessionRecord>),
}

type NoticeQueue = Rc<RefCell<VecDeque<Notice>>>;

/// Drives one workout session
pub struct SessionCoach<'a, B: ?Sized> {
    backend: &'a mut B,
    enhancer: Box<dyn Enhancer>,
    plan: WorkoutPlan,
    session: WorkoutSession,
    rest: CountdownTimer,
    notices: NoticeQueue,
}

impl<'a, B> SessionCoach<'a, B>
where
    B: PlanReader + ExerciseReader + SessionWriter + ?Sized,
{
    /// Load `plan_id` and start a session.
    ///
    /// A missing plan is fatal. Exercises that fail to resolve are dropped;
    /// if none resolve the session cannot start.
    pub fn start(
        backend: &'a mut B,
        plan_id: PlanId,
        template: &ExerciseProgress,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let plan = backend.get_plan(plan_id)?;

        let exercises: Vec<Exercise> = plan
            .exercises
            .iter()
            .filter_map(|&id| match backend.get_exercise(id) {
                Ok(exercise) => Some(exercise),
                Err(e) => {
                    tracing::warn!("Skipping exercise {} in plan {}: {}", id, plan_id, e);
                    None
                }
            })
            .collect();

        let unavailable = plan.exercises.len() - exercises.len();
        let resolved = exercises.len();
        let session = WorkoutSession::initialize_with(plan_id, exercises, template, now)?;
        let merged = resolved - session.len();

        let coach = Self {
            backend,
            enhancer: Box::new(NoEnhancer),
            plan,
            session,
            rest: CountdownTimer::new(),
            notices: Rc::new(RefCell::new(VecDeque::new())),
        };
        if unavailable > 0 {
            coach.push(Notice::ExercisesUnavailable { count: unavailable });
        }
        if merged > 0 {
            coach.push(Notice::RepeatsMerged { count: merged });
        }
        Ok(coach)
    }

    /// Replace the instruction enhancer
    pub fn with_enhancer(mut self, enhancer: Box<dyn Enhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    /// Complete the current exercise and react to the signal
    pub fn complete_current_exercise(&mut self, now: DateTime<Utc>) -> Result<StepOutcome> {
        let name = self.session.current_exercise().name.clone();

        match self.session.complete_current_exercise(now)? {
            CompletionSignal::AlreadyCompleted => Ok(StepOutcome::AlreadyCompleted),
            CompletionSignal::ContinueToNext { rest_seconds, .. } => {
                self.push(Notice::ExerciseCompleted { name });
                self.start_rest(rest_seconds);
                Ok(StepOutcome::Continue)
            }
            CompletionSignal::SessionComplete(record) => {
                // No rest after the final exercise
                self.rest.reset();
                Ok(self.persist(record))
            }
        }
    }

    fn persist(&mut self, record: Box<SessionRecord>) -> StepOutcome {
        match self.backend.create_session(&record) {
            Ok(()) => {
                self.push(Notice::WorkoutSaved {
                    duration_minutes: record.duration_minutes,
                });
                StepOutcome::Finished(record)
            }
            Err(e) => {
                tracing::error!("Failed to save session {}: {}", record.id, e);
                self.push(Notice::SaveFailed {
                    reason: e.to_string(),
                });
                StepOutcome::FinishedUnsaved(record)
            }
        }
    }

    fn start_rest(&mut self, seconds: u32) {
        let notices = Rc::clone(&self.notices);
        self.push(Notice::RestStarted { seconds });
        self.rest.start(seconds, move || {
            notices.borrow_mut().push_back(Notice::RestOver);
        });
    }

    fn push(&self, notice: Notice) {
        self.notices.borrow_mut().push_back(notice);
    }

    /// Update a progress field of an exercise in this session
    pub fn update_field(&mut self, exercise_id: ExerciseId, field: &str, value: &str) -> Result<()> {
        self.session.update_field(exercise_id, field, value)
    }

    /// Update a progress field of the current exercise
    pub fn update_current(&mut self, field: &str, value: &str) -> Result<()> {
        let id = self.session.current_exercise().id;
        self.session.update_field(id, field, value)
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.session.navigate(direction);
    }

    pub fn progress_fraction(&self) -> f64 {
        self.session.progress_fraction()
    }

    /// Let `seconds` of rest elapse. Returns true if rest just ended.
    pub fn tick_rest(&mut self, seconds: u32) -> bool {
        self.rest.advance(seconds)
    }

    pub fn pause_rest(&mut self) {
        self.rest.pause();
    }

    pub fn resume_rest(&mut self) {
        self.rest.resume();
    }

    pub fn reset_rest(&mut self) {
        self.rest.reset();
    }

    pub fn rest_timer(&self) -> &CountdownTimer {
        &self.rest
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.rest.state(), TimerState::Running | TimerState::Paused)
    }

    /// Instructions for the current exercise, enhanced when possible
    pub fn instructions_for_current(&self) -> String {
        instructions_for(self.enhancer.as_ref(), self.session.current_exercise())
    }

    /// Form tips for the current exercise
    pub fn form_tips_for_current(&self) -> Vec<String> {
        form_tips_for(self.enhancer.as_ref(), self.session.current_exercise())
    }

    /// Take every queued notice
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    pub fn session(&self) -> &WorkoutSession {
        &self.session
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    /// Abandon the workout. Nothing is saved.
    pub fn exit(self) {
        tracing::info!(
            "Exited plan {} after {} of {} exercises; nothing saved",
            self.plan.id,
            self.session.completed_count(),
            self.session.len()
        );
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExercisesUnavailable { count } => {
                write!(f, "{} exercises in this plan could not be loaded and were skipped", count)
            }
            Notice::RepeatsMerged { count } => {
                write!(f, "{} repeated exercises in this plan were merged", count)
            }
            Notice::ExerciseCompleted { name } => write!(f, "{} completed! Great job!", name),
            Notice::RestStarted { seconds } => write!(f, "Rest for {}", format_clock(*seconds)),
            Notice::RestOver => f.write_str("Rest time over! Ready for next exercise?"),
            Notice::WorkoutSaved { duration_minutes } => {
                write!(f, "Workout completed in {} min! Amazing work!", duration_minutes)
            }
            Notice::SaveFailed { reason } => write!(f, "Failed to save workout session: {}", reason),
        }
    }
}
