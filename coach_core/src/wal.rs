//! Append-only session log.
//!
//! Each finished session is one JSON line. Appends hold an exclusive `fs2`
//! lock and are flushed to disk before returning; reads hold a shared lock.
//! Once a log has been archived it is retired by renaming it to
//! `<name>.wal.processed`, and a fresh log starts on the next append.

use crate::backend::{SessionReader, SessionWriter};
use crate::{Error, Result, SessionRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Records read back from a log, plus how many lines could not be parsed
#[derive(Clone, Debug, Default)]
pub struct LogContents {
    pub records: Vec<SessionRecord>,
    pub unreadable: usize,
}

/// JSON Lines log of finished sessions
#[derive(Clone, Debug)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the log goes once it has been archived
    pub fn processed_path(&self) -> PathBuf {
        self.path.with_extension("wal.processed")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append one record as a single line
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let written = file.write_all(&line).and_then(|()| file.sync_data());
        file.unlock()?;
        written?;

        tracing::debug!("Appended session {} to {:?}", record.id, self.path);
        Ok(())
    }

    /// Read every parseable record, in append order
    pub fn read(&self) -> Result<LogContents> {
        let mut text = String::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.lock_shared()?;
                let read = file.read_to_string(&mut text);
                file.unlock()?;
                read?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LogContents::default());
            }
            Err(e) => return Err(e.into()),
        }

        let mut contents = LogContents::default();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionRecord>(line) {
                Ok(record) => contents.records.push(record),
                Err(e) => {
                    tracing::warn!("{:?} line {}: unreadable session: {}", self.path, number + 1, e);
                    contents.unreadable += 1;
                }
            }
        }

        tracing::debug!(
            "Read {} sessions from {:?} ({} unreadable lines)",
            contents.records.len(),
            self.path,
            contents.unreadable
        );
        Ok(contents)
    }

    /// Rename the log to its processed path
    pub fn retire(&self) -> Result<PathBuf> {
        let processed = self.processed_path();
        std::fs::rename(&self.path, &processed)?;
        tracing::info!("Retired session log to {:?}", processed);
        Ok(processed)
    }
}

impl SessionWriter for SessionLog {
    fn create_session(&mut self, record: &SessionRecord) -> Result<()> {
        self.append(record)
            .map_err(|e| Error::SessionWrite(e.to_string()))
    }
}

impl SessionReader for SessionLog {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.read()?.records)
    }
}
