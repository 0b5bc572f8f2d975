//! Exercise library and workout plans.
//!
//! A [`Library`] is the read-only data the plan and exercise readers serve.
//! The built-in library is used when no `library.json` has been provided.

use crate::{Difficulty, Exercise, ExerciseId, PlanId, Result, WorkoutPlan};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Cached built-in library
static DEFAULT_LIBRARY: Lazy<Library> = Lazy::new(build_default_library);

/// Get a reference to the cached built-in library
pub fn default_library() -> &'static Library {
    &DEFAULT_LIBRARY
}

/// Exercises plus the plans that reference them
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub plans: Vec<WorkoutPlan>,
}

impl Library {
    /// Load a library from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let library: Library = serde_json::from_str(&contents)?;
        tracing::info!(
            "Loaded library from {:?}: {} exercises, {} plans",
            path,
            library.exercises.len(),
            library.plans.len()
        );
        Ok(library)
    }

    pub fn exercise(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn plan(&self, id: PlanId) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Exercises filtered by muscle group and free-text search
    pub fn filter_exercises(&self, muscle: Option<&str>, search: Option<&str>) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| muscle.map_or(true, |m| m.eq_ignore_ascii_case("all") || e.targets(m)))
            .filter(|e| search.map_or(true, |q| e.matches_search(q)))
            .collect()
    }

    /// Distinct muscle groups, sorted
    pub fn muscle_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .exercises
            .iter()
            .flat_map(|e| e.muscle_groups.iter().map(|m| m.to_lowercase()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        groups.sort();
        groups
    }

    /// Validate library integrity. Returns one message per problem.
    ///
    /// Plans referencing unknown exercises are reported but still usable:
    /// sessions proceed with the resolvable subset.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut exercise_ids = HashSet::new();
        for exercise in &self.exercises {
            if !exercise_ids.insert(exercise.id) {
                errors.push(format!("Duplicate exercise id {}", exercise.id));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise {} has empty name", exercise.id));
            }
        }

        let mut plan_ids = HashSet::new();
        for plan in &self.plans {
            if !plan_ids.insert(plan.id) {
                errors.push(format!("Duplicate plan id {}", plan.id));
            }
            if plan.name.trim().is_empty() {
                errors.push(format!("Plan {} has empty name", plan.id));
            }
            if plan.exercises.is_empty() {
                errors.push(format!("Plan {} has no exercises", plan.id));
            }
            for id in &plan.exercises {
                if !exercise_ids.contains(id) {
                    errors.push(format!(
                        "Plan {} references unknown exercise {}",
                        plan.id, id
                    ));
                }
            }
        }

        errors
    }
}

fn exercise(
    id: ExerciseId,
    name: &str,
    muscles: &[&str],
    equipment: &[&str],
    instructions: &str,
) -> Exercise {
    Exercise {
        id,
        name: name.into(),
        muscle_groups: muscles.iter().map(|m| m.to_string()).collect(),
        equipment: equipment.iter().map(|e| e.to_string()).collect(),
        instructions: instructions.into(),
    }
}

fn build_default_library() -> Library {
    let exercises = vec![
        exercise(
            1,
            "Push-up",
            &["chest", "triceps", "shoulders"],
            &["bodyweight"],
            "Start in a high plank with hands under shoulders. Lower your chest to just above the floor, then press back up keeping your body in a straight line.",
        ),
        exercise(
            2,
            "Barbell Squat",
            &["quadriceps", "glutes", "hamstrings"],
            &["barbell", "squat rack"],
            "Rest the bar on your upper back, feet shoulder-width apart. Sit back and down until thighs are parallel, then drive up through your heels.",
        ),
        exercise(
            3,
            "Deadlift",
            &["hamstrings", "glutes", "back"],
            &["barbell"],
            "Stand with the bar over mid-foot. Hinge at the hips, grip the bar, brace and stand up by driving the hips forward. Lower with control.",
        ),
        exercise(
            4,
            "Pull-up",
            &["back", "biceps"],
            &["pull-up bar"],
            "Hang from the bar with an overhand grip. Pull until your chin clears the bar, then lower to a full hang.",
        ),
        exercise(
            5,
            "Dumbbell Shoulder Press",
            &["shoulders", "triceps"],
            &["dumbbells", "bench"],
            "Sit upright holding dumbbells at shoulder height. Press overhead until arms are extended, then lower slowly.",
        ),
        exercise(
            6,
            "Plank",
            &["core"],
            &["bodyweight"],
            "Hold a forearm plank with elbows under shoulders, glutes squeezed and a neutral spine.",
        ),
        exercise(
            7,
            "Walking Lunge",
            &["quadriceps", "glutes"],
            &["bodyweight", "dumbbells"],
            "Step forward and lower until both knees are bent to 90 degrees. Push off the front foot into the next step.",
        ),
        exercise(
            8,
            "Bent-over Row",
            &["back", "biceps"],
            &["barbell"],
            "Hinge forward with a flat back, bar hanging at arm's length. Row the bar to your lower ribs and lower under control.",
        ),
    ];

    let plans = vec![
        WorkoutPlan {
            id: 1,
            name: "Full Body Starter".into(),
            description: "Three fundamental movements to build a base.".into(),
            difficulty: Difficulty::Beginner,
            duration_minutes: 30,
            exercises: vec![1, 2, 6],
        },
        WorkoutPlan {
            id: 2,
            name: "Upper Body Strength".into(),
            description: "Push and pull work for chest, back and shoulders.".into(),
            difficulty: Difficulty::Intermediate,
            duration_minutes: 45,
            exercises: vec![1, 4, 5, 8],
        },
        WorkoutPlan {
            id: 3,
            name: "Lower Body Power".into(),
            description: "Heavy hinge and squat patterns with unilateral finishers.".into(),
            difficulty: Difficulty::Advanced,
            duration_minutes: 50,
            exercises: vec![2, 3, 7, 6],
        },
    ];

    Library { exercises, plans }
}
