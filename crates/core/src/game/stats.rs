use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of submitting a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessResult {
    /// The guess named a station that had not been found yet.
    Success,
    /// The guess named a station that was already found.
    Duplicate,
    /// The guess did not name any station on the active lines.
    Invalid,
}

impl GuessResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Duplicate => "duplicate",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for GuessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Found/total counts for a line or for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineStats {
    pub completed_guesses: usize,
    pub total_stations: usize,
}

impl LineStats {
    pub fn is_complete(&self) -> bool {
        self.completed_guesses >= self.total_stations
    }

    /// Share of stations found, in `0.0..=1.0`. An empty line counts as done.
    pub fn ratio(&self) -> f64 {
        if self.total_stations == 0 {
            1.0
        } else {
            self.completed_guesses as f64 / self.total_stations as f64
        }
    }
}

/// Stats paired with the line they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProgress {
    pub line_name: String,
    pub stats: LineStats,
}
