#![warn(clippy::all, missing_docs)]

//! Core logic for the transit memory game.
//!
//! The player names stations of the selected transit lines from memory. This
//! crate resolves free-text guesses to canonical station names, tracks which
//! stations have been found, and hosts the line data loading, configuration
//! and save handling used by the terminal frontend.

pub mod catalog;
pub mod config;
pub mod corrections;
pub mod game;
pub mod line;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod save;

pub use crate::config::AppConfig;
pub use game::{Game, GuessResult, LineProgress, LineStats};
pub use line::{Line, LineBuilder};
pub use loader::{LineLoader, LoadError};
pub use models::{City, Coordinates, LineKind, LineSpec};
pub use save::{SaveManager, SavedGame};
