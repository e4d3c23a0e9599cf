//! Local persistence of the current game.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::Game;

/// File name of the save below the data directory.
pub const DEFAULT_SAVE_FILE: &str = "transit-memory/progress.json";

/// Everything needed to resume a game on the same device.
///
/// Completed guesses are stored as plain names and must be filtered through
/// [`Game::set_completed_guesses`] when restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    /// Whether a game is in progress (as opposed to the setup screen).
    #[serde(default)]
    pub started: bool,
    /// Catalog keys chosen for the game.
    #[serde(default)]
    pub selected_lines: Vec<String>,
    /// Station names found so far.
    #[serde(default)]
    pub completed_guesses: Vec<String>,
    /// Whether the introduction has been shown once.
    #[serde(default)]
    pub has_seen_intro: bool,
    /// Timestamp of the last write.
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl Default for SavedGame {
    fn default() -> Self {
        Self {
            started: false,
            selected_lines: Vec::new(),
            completed_guesses: Vec::new(),
            has_seen_intro: false,
            saved_at: Utc::now(),
        }
    }
}

impl SavedGame {
    /// Snapshot of a running game for the given selection.
    pub fn from_game(game: &Game, selected_lines: &[String], has_seen_intro: bool) -> Self {
        Self {
            started: true,
            selected_lines: selected_lines.to_vec(),
            completed_guesses: game.completed_guesses(),
            has_seen_intro,
            saved_at: Utc::now(),
        }
    }
}

/// Reads and writes the save file.
#[derive(Debug, Clone)]
pub struct SaveManager {
    path: PathBuf,
}

impl SaveManager {
    /// Create a manager for the given save file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SAVE_FILE)
    }

    /// Read the save, returning `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<SavedGame>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let saved = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(saved))
    }

    /// Write the save, creating parent directories as needed.
    pub fn store(&self, saved: &SavedGame) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialised = serde_json::to_vec_pretty(saved)?;
        fs::write(&self.path, serialised)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            guesses = saved.completed_guesses.len(),
            "Game saved"
        );
        Ok(())
    }

    /// Remove the save file. Succeeds if there is none.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        line::Line,
        models::{City, LineKind, LineSpec},
    };
    use tempfile::tempdir;

    fn sample_game() -> Game {
        let line = Line::builder(LineSpec::new(
            "Gröna linjen",
            "green",
            City::Stockholm,
            "#148541",
            LineKind::Metro,
        ))
        .stations(["Alvik", "Odenplan", "T-Centralen"])
        .build();
        let mut game = Game::new();
        game.set_lines(vec![line]);
        game
    }

    #[test]
    fn missing_save_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join("progress.json"));
        assert!(manager.load()?.is_none());
        manager.clear()?;
        Ok(())
    }

    #[test]
    fn save_round_trip_restores_game() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join("nested/progress.json"));
        let mut game = sample_game();
        game.make_guess("odenplan");
        game.make_guess("Alvik");

        let selection = vec!["tunnelbanan".to_string()];
        manager.store(&SavedGame::from_game(&game, &selection, true))?;

        let saved = manager.load()?.expect("save exists");
        assert!(saved.started);
        assert!(saved.has_seen_intro);
        assert_eq!(saved.selected_lines, selection);
        assert_eq!(saved.completed_guesses, vec!["Odenplan", "Alvik"]);

        let mut restored = sample_game();
        restored.set_completed_guesses(&saved.completed_guesses);
        assert_eq!(restored.completed_guesses(), saved.completed_guesses);

        manager.clear()?;
        assert!(manager.load()?.is_none());
        Ok(())
    }

    #[test]
    fn partial_save_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("progress.json");
        fs::write(
            &path,
            r#"{ "completed_guesses": ["Alvik", "Ropsten"], "saved_at": "2024-05-01T10:00:00Z" }"#,
        )?;

        let saved = SaveManager::new(&path).load()?.expect("save exists");
        assert!(!saved.started);
        assert!(saved.selected_lines.is_empty());

        let mut game = sample_game();
        game.set_completed_guesses(&saved.completed_guesses);
        assert_eq!(game.completed_guesses(), vec!["Alvik"]);
        Ok(())
    }

    #[test]
    fn save_without_timestamp_still_loads() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("progress.json");
        fs::write(
            &path,
            r#"{ "started": true, "selected_lines": ["tvarbanan"], "completed_guesses": ["Alvik"] }"#,
        )?;

        let before = Utc::now();
        let saved = SaveManager::new(&path).load()?.expect("save exists");
        assert!(saved.started);
        assert_eq!(saved.selected_lines, vec!["tvarbanan"]);
        assert!(saved.saved_at >= before);
        Ok(())
    }

    #[test]
    fn corrupt_save_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("progress.json");
        fs::write(&path, "{ not json")?;
        let err = SaveManager::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        Ok(())
    }
}
