use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::{
    line::Line,
    models::Coordinates,
    normalize::{names_match, normalize_key},
};

use super::stats::{GuessResult, LineProgress, LineStats};

/// Guess resolution and progress tracking for one play session.
///
/// A freshly created game has no lines and accepts no guesses. Installing
/// lines with [`Game::set_lines`] makes it ready; every later mutation only
/// touches the set of completed guesses.
///
/// Station identity is the normalised name, so the same station spelled with
/// different casing on two lines is one station.
#[derive(Debug, Clone, Default)]
pub struct Game {
    lines: Vec<Line>,
    // Normalised keys of found stations.
    completed: HashSet<String>,
    completed_order: Vec<String>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the active lines, discarding every previous guess.
    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = lines;
        self.clear_guesses();
        info!(
            lines = self.lines.len(),
            stations = self.stations().len(),
            "Active lines installed"
        );
    }

    /// Drop lines and guesses alike.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.clear_guesses();
    }

    /// Forget all guesses while keeping the active lines.
    pub fn reset(&mut self) {
        self.clear_guesses();
        debug!("Guesses reset");
    }

    /// Replace the completed guesses with previously persisted names.
    ///
    /// Names must match a station of an active line exactly; anything else is
    /// dropped. Kept names are recorded under their first-seen spelling.
    pub fn set_completed_guesses<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = self.canonical_names();
        self.clear_guesses();

        let mut dropped = 0usize;
        for name in names {
            match known.get(name.as_ref()) {
                Some(canonical) => self.record(canonical.clone()),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "Ignored restored guesses for inactive stations");
        }
        info!(restored = self.completed_order.len(), "Completed guesses restored");
    }

    /// Alias of [`Game::set_completed_guesses`].
    pub fn set_initial_guesses<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_completed_guesses(names);
    }

    /// Resolve `raw` to a station and record it if it is new.
    pub fn make_guess(&mut self, raw: &str) -> GuessResult {
        let result = match self.station(raw) {
            None => GuessResult::Invalid,
            Some(station) if self.completed.contains(&normalize_key(station)) => {
                GuessResult::Duplicate
            }
            Some(station) => {
                let station = station.to_string();
                self.record(station);
                GuessResult::Success
            }
        };
        debug!(guess = %raw.trim(), %result, "Guess resolved");
        result
    }

    /// Canonical station name that `raw` refers to, without recording anything.
    pub fn station(&self, raw: &str) -> Option<&str> {
        let candidate = self.apply_corrections(raw);
        self.lines.iter().find_map(|line| {
            line.stations()
                .iter()
                .find(|station| names_match(station, &candidate))
                .map(String::as_str)
        })
    }

    /// Every station across the active lines, deduplicated ignoring case, in
    /// first-seen order and spelling.
    pub fn stations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.lines
            .iter()
            .flat_map(|line| line.stations().iter())
            .filter(|station| seen.insert(normalize_key(station)))
            .map(String::as_str)
            .collect()
    }

    /// Active line with the given name, ignoring case.
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|line| names_match(line.name(), name))
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Found/total counts for the named line.
    ///
    /// A station shared with other lines counts toward each of them.
    pub fn line_stats(&self, name: &str) -> Option<LineStats> {
        self.line(name).map(|line| self.stats_for(line))
    }

    /// Stats for every active line, in line order.
    pub fn all_line_stats(&self) -> Vec<LineProgress> {
        self.lines
            .iter()
            .map(|line| LineProgress {
                line_name: line.name().to_string(),
                stats: self.stats_for(line),
            })
            .collect()
    }

    /// Found/total counts over the deduplicated station set.
    pub fn progress(&self) -> LineStats {
        let stations = self.stations();
        LineStats {
            completed_guesses: stations
                .iter()
                .filter(|station| self.is_found(station))
                .count(),
            total_stations: stations.len(),
        }
    }

    /// Whether every station has been found. Always false without stations.
    pub fn is_complete(&self) -> bool {
        let progress = self.progress();
        progress.total_stations > 0 && progress.is_complete()
    }

    /// Snapshot of the completed guesses in the order they were made.
    pub fn completed_guesses(&self) -> Vec<String> {
        self.completed_order.clone()
    }

    /// Position of a station on the first active line that has one for it.
    pub fn station_coordinates(&self, station: &str) -> Option<Coordinates> {
        self.lines
            .iter()
            .find_map(|line| line.station_coordinates(station))
    }

    // Every line gets a turn at the candidate, in line order. A line without a
    // matching alias leaves the candidate unchanged.
    fn apply_corrections(&self, raw: &str) -> String {
        self.lines
            .iter()
            .fold(raw.trim().to_string(), |candidate, line| {
                match line.correct_station_name(&candidate) {
                    Some(corrected) => corrected.to_string(),
                    None => candidate,
                }
            })
    }

    fn stats_for(&self, line: &Line) -> LineStats {
        LineStats {
            completed_guesses: line
                .stations()
                .iter()
                .filter(|station| self.is_found(station))
                .count(),
            total_stations: line.stations().len(),
        }
    }

    fn is_found(&self, station: &str) -> bool {
        self.completed.contains(&normalize_key(station))
    }

    // Exact station spelling on any active line -> first-seen spelling.
    fn canonical_names(&self) -> HashMap<String, String> {
        let mut first_seen: HashMap<String, String> = HashMap::new();
        let mut known = HashMap::new();
        for station in self.lines.iter().flat_map(|line| line.stations()) {
            let canonical = first_seen
                .entry(normalize_key(station))
                .or_insert_with(|| station.clone())
                .clone();
            known.insert(station.clone(), canonical);
        }
        known
    }

    fn record(&mut self, station: String) {
        if self.completed.insert(normalize_key(&station)) {
            self.completed_order.push(station);
        }
    }

    fn clear_guesses(&mut self) {
        self.completed.clear();
        self.completed_order.clear();
    }
}
