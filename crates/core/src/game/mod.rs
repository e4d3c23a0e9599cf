#![allow(missing_docs)]

//! Guess resolution and progress tracking.

mod engine;
mod stats;

pub use engine::Game;
pub use stats::{GuessResult, LineProgress, LineStats};
