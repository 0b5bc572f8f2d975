//! CSV archive of finished sessions.
//!
//! The session log is rolled up into a CSV file with one row per exercise
//! entry (session columns repeated on each row). History is read back from
//! both the log and the archive, de-duplicated by session id.

use crate::wal::SessionLog;
use crate::{Error, Result, SessionExerciseEntry, SessionRecord};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    session_id: String,
    plan_id: u32,
    date: String,
    duration_minutes: u32,
    session_completed: bool,
    exercise_id: u32,
    exercise_name: String,
    sets: u32,
    reps: u32,
    weight: f64,
    rest_time_seconds: u32,
    exercise_completed: bool,
}

fn rows_for(record: &SessionRecord) -> impl Iterator<Item = CsvRow> + '_ {
    record.exercises.iter().map(move |entry| CsvRow {
        session_id: record.id.to_string(),
        plan_id: record.plan_id,
        date: record.date.to_rfc3339(),
        duration_minutes: record.duration_minutes,
        session_completed: record.completed,
        exercise_id: entry.id,
        exercise_name: entry.name.clone(),
        sets: entry.sets,
        reps: entry.reps,
        weight: entry.weight,
        rest_time_seconds: entry.rest_time_seconds,
        exercise_completed: entry.completed,
    })
}

/// Outcome of one rollup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollupReport {
    /// Sessions newly written to the archive
    pub archived: usize,
    /// Sessions in the log that the archive already held
    pub already_archived: usize,
    /// Log lines that could not be parsed
    pub unreadable: usize,
}

/// Roll the session log into the CSV archive and retire the log.
///
/// The CSV is fsynced before the log is retired. Sessions whose id is
/// already in the archive are not written again, so re-running after a
/// crash between the two steps is safe.
pub fn roll_up(log: &SessionLog, csv_path: &Path) -> Result<RollupReport> {
    let contents = log.read()?;
    let mut report = RollupReport {
        unreadable: contents.unreadable,
        ..RollupReport::default()
    };

    if contents.records.is_empty() {
        tracing::info!("No sessions in log to roll up");
        return Ok(report);
    }

    let archived_ids: HashSet<Uuid> = read_archive(csv_path)?.iter().map(|r| r.id).collect();
    let (fresh, repeated): (Vec<_>, Vec<_>) = contents
        .records
        .iter()
        .partition(|record| !archived_ids.contains(&record.id));
    report.already_archived = repeated.len();

    if !fresh.is_empty() {
        append_rows(csv_path, &fresh)?;
        tracing::info!("Archived {} sessions to {:?}", fresh.len(), csv_path);
    }
    report.archived = fresh.len();

    if report.already_archived > 0 {
        tracing::warn!(
            "{} sessions in {:?} were already archived",
            report.already_archived,
            log.path()
        );
    }

    log.retire()?;
    Ok(report)
}

fn append_rows(csv_path: &Path, records: &[&SessionRecord]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in records {
        for row in rows_for(record) {
            writer.serialize(row)?;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
    file.sync_all()?;
    Ok(())
}

/// Remove `.processed` log files in `dir`
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }
    Ok(count)
}

/// Read every archived session from a CSV file, rebuilding records from
/// their per-exercise rows in file order
pub fn read_archive(path: &Path) -> Result<Vec<SessionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut records: Vec<SessionRecord> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut rows_seen: HashSet<(Uuid, u32)> = HashSet::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Failed to deserialize archive row: {}", e);
                continue;
            }
        };

        let (id, date) = match parse_session_keys(&row) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Skipping archive row: {}", e);
                continue;
            }
        };

        let entry = SessionExerciseEntry {
            id: row.exercise_id,
            name: row.exercise_name,
            sets: row.sets,
            reps: row.reps,
            weight: row.weight,
            completed: row.exercise_completed,
            rest_time_seconds: row.rest_time_seconds,
        };

        // A session block written twice keeps its first copy
        if !rows_seen.insert((id, entry.id)) {
            tracing::debug!("Skipping repeated archive row for session {}", id);
            continue;
        }

        match index.get(&id) {
            Some(&pos) => records[pos].exercises.push(entry),
            None => {
                index.insert(id, records.len());
                records.push(SessionRecord {
                    id,
                    plan_id: row.plan_id,
                    date,
                    exercises: vec![entry],
                    duration_minutes: row.duration_minutes,
                    completed: row.session_completed,
                });
            }
        }
    }

    tracing::debug!("Read {} sessions from archive", records.len());
    Ok(records)
}

fn parse_session_keys(row: &CsvRow) -> Result<(Uuid, DateTime<Utc>)> {
    let id = Uuid::parse_str(&row.session_id)
        .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;
    let date = DateTime::parse_from_rfc3339(&row.date)
        .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
        .with_timezone(&Utc);
    Ok((id, date))
}

/// Load all sessions from the log and the archive.
///
/// Returns sessions sorted newest first, each session id at most once.
pub fn load_history(log: &SessionLog, csv_path: &Path) -> Result<Vec<SessionRecord>> {
    let mut seen = HashSet::new();
    let mut sessions = Vec::new();

    for record in log
        .read()?
        .records
        .into_iter()
        .chain(read_archive(csv_path)?)
    {
        if seen.insert(record.id) {
            sessions.push(record);
        }
    }

    sessions.sort_by(|a, b| b.date.cmp(&a.date));
    tracing::debug!("Loaded {} sessions of history", sessions.len());
    Ok(sessions)
}
