use chrono::Utc;
use clap::{Parser, Subcommand};
use coach_core::config::BackendKind;
use coach_core::stats::achievements;
use coach_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "repcoach")]
#[command(about = "Workout plans, guided sessions and progress tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use the in-memory backend (nothing is written to disk)
    #[arg(long, global = true)]
    memory: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List workout plans
    Plans,

    /// Browse the exercise library
    Exercises {
        /// Only exercises targeting this muscle group
        #[arg(long)]
        muscle: Option<String>,

        /// Search name, muscle groups and equipment
        #[arg(long)]
        search: Option<String>,
    },

    /// Run a workout session for a plan
    Start {
        /// Plan to run
        plan_id: PlanId,

        /// Auto-complete (for testing) - complete every exercise without rest
        #[arg(long)]
        auto_complete: bool,
    },

    /// Show progress statistics
    Progress,

    /// Show or edit your profile
    Profile {
        /// Set your display name
        #[arg(long)]
        name: Option<String>,

        /// Set fitness goals (comma separated)
        #[arg(long)]
        goals: Option<String>,
    },

    /// Roll the session log up into the CSV archive
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    coach_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    if cli.memory {
        config.backend.kind = BackendKind::Memory;
    }

    match cli.command {
        Commands::Plans => cmd_plans(&config),
        Commands::Exercises { muscle, search } => {
            cmd_exercises(&config, muscle.as_deref(), search.as_deref())
        }
        Commands::Start {
            plan_id,
            auto_complete,
        } => cmd_start(&config, plan_id, auto_complete),
        Commands::Progress => cmd_progress(&config),
        Commands::Profile { name, goals } => cmd_profile(&config, name, goals),
        Commands::Rollup { cleanup } => cmd_rollup(&config.data.data_dir, cleanup),
    }
}

fn cmd_plans(config: &Config) -> Result<()> {
    let backend = open_backend(config)?;
    let plans = backend.list_plans()?;

    let stats = compute_stats(&backend.list_sessions()?, Utc::now(), config.goals.weekly_workouts);
    println!(
        "This week: {} workouts | Total: {} min | Streak: {} days\n",
        stats.this_week, stats.total_minutes, stats.current_streak
    );

    if plans.is_empty() {
        println!("No workout plans available.");
        return Ok(());
    }

    for plan in plans {
        println!(
            "[{}] {} ({:?}, ~{} min, {} exercises)",
            plan.id,
            plan.name,
            plan.difficulty,
            plan.duration_minutes,
            plan.exercises.len()
        );
        if !plan.description.is_empty() {
            println!("    {}", plan.description);
        }
    }
    Ok(())
}

fn cmd_exercises(config: &Config, muscle: Option<&str>, search: Option<&str>) -> Result<()> {
    let backend = open_backend(config)?;
    let library = Library {
        exercises: backend.list_exercises()?,
        plans: Vec::new(),
    };

    let found = library.filter_exercises(muscle, search);
    println!("{} exercises found", found.len());

    if found.is_empty() {
        println!("Try adjusting your search or filter criteria.");
        println!("Muscle groups: {}", library.muscle_groups().join(", "));
        return Ok(());
    }

    for exercise in found {
        println!("[{}] {}", exercise.id, exercise.name);
        println!("    Muscles:   {}", exercise.muscle_groups.join(", "));
        println!("    Equipment: {}", exercise.equipment.join(", "));
    }
    Ok(())
}

fn cmd_start(config: &Config, plan_id: PlanId, auto_complete: bool) -> Result<()> {
    let mut backend = open_backend(config)?;
    let template = config.session.progress_template();

    let mut coach = match SessionCoach::start(backend.as_mut(), plan_id, &template, Utc::now()) {
        Ok(coach) => coach,
        Err(e @ Error::NotFound { .. }) | Err(e @ Error::EmptySession) => {
            eprintln!("Cannot start workout: {}", e);
            eprintln!("Run `repcoach plans` to see available plans.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    println!("\n{}", coach.plan().name);
    println!("{} exercises\n", coach.session().len());
    print_notices(&mut coach);

    let outcome = if auto_complete {
        run_auto(coach)?
    } else {
        let stdin = io::stdin();
        run_interactive(coach, stdin.lock())?
    };

    match outcome {
        Some(StepOutcome::Finished(record)) => {
            print_record(&record);
            Ok(())
        }
        Some(StepOutcome::FinishedUnsaved(record)) => {
            print_record(&record);
            Err(Error::SessionWrite(
                "workout finished but could not be saved".into(),
            ))
        }
        _ => Ok(()),
    }
}

type Coach<'a> = SessionCoach<'a, dyn Backend>;

fn run_auto(mut coach: Coach<'_>) -> Result<Option<StepOutcome>> {
    loop {
        let outcome = coach.complete_current_exercise(Utc::now())?;
        coach.reset_rest();
        print_notices(&mut coach);

        match outcome {
            StepOutcome::Continue | StepOutcome::AlreadyCompleted => continue,
            finished => return Ok(Some(finished)),
        }
    }
}

fn run_interactive(mut coach: Coach<'_>, input: impl BufRead) -> Result<Option<StepOutcome>> {
    let mut lines = input.lines();
    let mut last_prompt = Instant::now();
    let mut carry = Duration::ZERO;

    loop {
        show_current(&coach);
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!("\nInput closed; workout discarded.");
                coach.exit();
                return Ok(None);
            }
        };

        // Let the rest countdown catch up with the time spent at the prompt
        carry += last_prompt.elapsed();
        last_prompt = Instant::now();
        let whole = carry.as_secs();
        carry -= Duration::from_secs(whole);
        coach.tick_rest(u32::try_from(whole).unwrap_or(u32::MAX));

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] | ["d"] | ["done"] => {
                let outcome = coach.complete_current_exercise(Utc::now())?;
                print_notices(&mut coach);
                match outcome {
                    StepOutcome::AlreadyCompleted => {
                        println!("Already completed. Use 'n' to move on.");
                    }
                    StepOutcome::Continue => {}
                    finished => return Ok(Some(finished)),
                }
            }
            ["n"] | ["next"] => coach.navigate(Direction::Next),
            ["p"] | ["prev"] | ["previous"] => coach.navigate(Direction::Previous),
            ["set", field, value] => {
                if let Err(e) = coach.update_current(field, value) {
                    println!("{}", e);
                }
            }
            ["info"] => {
                println!("\n{}\n", coach.instructions_for_current());
                println!("Form tips:");
                for tip in coach.form_tips_for_current() {
                    println!("  • {}", tip);
                }
                println!();
            }
            ["rest"] => {}
            ["pause"] => coach.pause_rest(),
            ["resume"] | ["start"] => coach.resume_rest(),
            ["reset"] => coach.reset_rest(),
            ["q"] | ["quit"] | ["exit"] => {
                print!("Are you sure you want to exit this workout? Progress will be lost. [y/N] ");
                io::stdout().flush()?;
                let answer = lines.next().transpose()?.unwrap_or_default();
                if answer.trim().eq_ignore_ascii_case("y") {
                    println!("Workout discarded.");
                    coach.exit();
                    return Ok(None);
                }
            }
            _ => print_help(),
        }

        print_notices(&mut coach);
    }
}

fn show_current(coach: &Coach<'_>) {
    let session = coach.session();
    let exercise = session.current_exercise();

    println!("─────────────────────────────────────────");
    println!(
        "Exercise {} of {}: {}   ({}/{} completed, {:.0}%)",
        session.current_index() + 1,
        session.len(),
        exercise.name,
        session.completed_count(),
        session.len(),
        session.progress_fraction() * 100.0
    );
    println!("  Muscles: {}", exercise.muscle_groups.join(", "));

    if let Some(progress) = session.current_progress() {
        let status = if progress.completed { "  ✓ Completed" } else { "" };
        println!(
            "  {} sets × {} reps @ {} | rest {}{}",
            progress.sets,
            progress.reps,
            progress.weight,
            format_clock(progress.rest_time_seconds),
            status
        );
    }

    println!("  Workout overview:");
    for (index, entry) in session.exercises().iter().enumerate() {
        let done = session.progress_for(entry.id).is_some_and(|p| p.completed);
        let marker = if index == session.current_index() {
            "▶"
        } else if done {
            "✓"
        } else {
            " "
        };
        println!("    {} {}. {}", marker, index + 1, entry.name);
    }

    let rest = coach.rest_timer();
    if coach.is_resting() {
        let state = if rest.is_running() { "Active" } else { "Paused" };
        println!("  Rest: {} ({})", rest.display(), state);
    }

    if session.is_last() {
        println!("  Enter to finish workout, 'help' for commands");
    } else {
        println!("  Enter to complete exercise, 'help' for commands");
    }
}

fn print_help() {
    println!("Commands:");
    println!("  Enter / d            complete current exercise");
    println!("  n / p                next / previous exercise");
    println!("  set <field> <value>  fields: sets, reps, weight, restTime");
    println!("  info                 exercise instructions");
    println!("  rest                 show rest timer");
    println!("  pause/resume/reset   control rest timer");
    println!("  q                    exit without saving");
}

fn print_notices(coach: &mut Coach<'_>) {
    for notice in coach.drain_notices() {
        match notice {
            Notice::SaveFailed { .. } => eprintln!("✗ {}", notice),
            Notice::ExercisesUnavailable { .. } | Notice::RepeatsMerged { .. } => {
                println!("! {}", notice)
            }
            _ => println!("✓ {}", notice),
        }
    }
}

fn print_record(record: &SessionRecord) {
    println!();
    println!("Session {}", record.id);
    println!("  Duration: {} min", record.duration_minutes);
    for entry in &record.exercises {
        let mark = if entry.completed { "✓" } else { " " };
        println!(
            "  {} {}: {} × {} @ {}",
            mark, entry.name, entry.sets, entry.reps, entry.weight
        );
    }
}

fn cmd_progress(config: &Config) -> Result<()> {
    let backend = open_backend(config)?;
    let sessions = backend.list_sessions()?;

    if sessions.is_empty() {
        println!("No workout data yet. Start your first workout to begin tracking your progress!");
        return Ok(());
    }

    let stats = compute_stats(&sessions, Utc::now(), config.goals.weekly_workouts);

    println!("Your Progress");
    println!(
        "  Weekly goal:     {}/{} ({:.0}%)",
        stats.this_week,
        stats.weekly_goal,
        stats.weekly_progress * 100.0
    );
    println!("  Total workouts:  {}", stats.total_workouts);
    println!("  Hours trained:   {}", stats.total_hours);
    println!("  Current streak:  {} days", stats.current_streak);
    if stats.monthly_change > 0 {
        println!("  This month:      +{}", stats.monthly_change);
    }

    let active_days = stats.activity.iter().filter(|d| d.workouts > 0).count();
    println!("  Active days (30): {}", active_days);

    println!("\nAchievements");
    for achievement in achievements(&stats) {
        let mark = if achievement.unlocked { "★" } else { "·" };
        println!("  {} {} - {}", mark, achievement.title, achievement.description);
    }

    let records = personal_records(&sessions);
    if !records.is_empty() {
        println!("\nPersonal records (est. 1RM)");
        for record in records {
            println!(
                "  {}: {} × {} → {:.0} ({})",
                record.exercise,
                record.weight,
                record.reps,
                record.estimated_max,
                record.date.format("%Y-%m-%d")
            );
        }
    }

    Ok(())
}

fn cmd_profile(config: &Config, name: Option<String>, goals: Option<String>) -> Result<()> {
    let mut backend = open_backend(config)?;
    let update = ProfileUpdate {
        name,
        fitness_goals: goals.as_deref().map(parse_goals),
    };

    let profile = if update.is_empty() {
        backend.get_profile()?
    } else {
        let profile = backend.update_profile(&update)?;
        println!("✓ Profile updated successfully!");
        profile
    };

    if profile.name.is_empty() {
        println!("Name: (not set)");
    } else {
        println!("Name: {}", profile.name);
    }

    println!("Fitness goals:");
    if profile.fitness_goals.is_empty() {
        println!("  No goals set yet. Set your goals to stay motivated!");
    }
    for goal in &profile.fitness_goals {
        println!("  • {}", goal);
    }
    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let log = SessionLog::new(data_dir.join(LocalBackend::LOG_FILE));
    let csv_path = data_dir.join(LocalBackend::ARCHIVE_FILE);

    if !log.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let report = coach_core::archive::roll_up(&log, &csv_path)?;
    tracing::debug!("Rollup of {:?}: {:?}", log.path(), report);

    println!("✓ Rolled up {} sessions to CSV", report.archived);
    if report.already_archived > 0 {
        println!("  {} sessions were already archived", report.already_archived);
    }
    if report.unreadable > 0 {
        println!("  {} unreadable log lines skipped", report.unreadable);
    }
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = coach_core::archive::cleanup_processed(data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}
