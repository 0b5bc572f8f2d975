//! User profile: display name and fitness goals.
//!
//! The local backend keeps the profile in `profile.json`, replaced
//! atomically on every save.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fitness_goals: Vec<String>,
}

/// Partial update; `None` leaves the field as it is
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub fitness_goals: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.fitness_goals.is_none()
    }
}

/// Split comma-separated goals, dropping blanks
pub fn parse_goals(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|goal| !goal.is_empty())
        .map(String::from)
        .collect()
}

impl Profile {
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(goals) = &update.fitness_goals {
            self.fitness_goals = goals
                .iter()
                .map(|goal| goal.trim().to_string())
                .filter(|goal| !goal.is_empty())
                .collect();
        }
    }

    /// Load from `path`. A missing or unreadable file yields the default
    /// profile so workouts are never blocked by it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No profile at {:?}, using default", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!("Ignoring unreadable profile {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Write to `path` through a temp file in the same directory
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::Other(format!("Profile path {:?} has no parent", path)))?;
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(temp.as_file_mut(), self)?;
        temp.as_file_mut().write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goals() {
        assert_eq!(
            parse_goals("Lose 5kg,  run a 10k , ,Bench bodyweight"),
            vec!["Lose 5kg", "run a 10k", "Bench bodyweight"]
        );
        assert!(parse_goals("  ").is_empty());
    }

    #[test]
    fn test_apply_merges_fields() {
        let mut profile = Profile {
            name: "Sam".into(),
            fitness_goals: vec!["Consistency".into()],
        };

        profile.apply(&ProfileUpdate {
            name: None,
            fitness_goals: Some(vec!["Squat 100kg".into(), " ".into()]),
        });
        assert_eq!(profile.name, "Sam");
        assert_eq!(profile.fitness_goals, vec!["Squat 100kg"]);

        profile.apply(&ProfileUpdate {
            name: Some(" Alex ".into()),
            fitness_goals: None,
        });
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.fitness_goals, vec!["Squat 100kg"]);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/profile.json");

        assert_eq!(Profile::load(&path).unwrap(), Profile::default());

        let profile = Profile {
            name: "Alex".into(),
            fitness_goals: vec!["Run 5k".into()],
        };
        profile.save(&path).unwrap();
        assert_eq!(Profile::load(&path).unwrap(), profile);
    }

    #[test]
    fn test_unreadable_profile_falls_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert_eq!(Profile::load(&path).unwrap(), Profile::default());
    }
}
