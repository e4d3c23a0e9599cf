//! A single transit line: its stations and its alias table.

use std::collections::HashMap;

use crate::{
    models::{City, Coordinates, LineKind, LineSpec},
    normalize::{names_match, normalize_key},
};

/// Immutable station data for one line.
///
/// Instances are produced by [`LineBuilder`]; once built, neither the station
/// list nor the corrections table can change.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    spec: LineSpec,
    stations: Vec<String>,
    coordinates: HashMap<String, Coordinates>,
    corrections: HashMap<String, String>,
}

impl Line {
    /// Start building a line from its static description.
    pub fn builder(spec: LineSpec) -> LineBuilder {
        LineBuilder {
            line: Line {
                spec,
                stations: Vec::new(),
                coordinates: HashMap::new(),
                corrections: HashMap::new(),
            },
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// GeoJSON file stem.
    pub fn short_name(&self) -> &str {
        &self.spec.short_name
    }

    /// City the line runs in.
    pub fn city(&self) -> City {
        self.spec.city
    }

    /// Presentation colour, passed through unchanged.
    pub fn color(&self) -> &str {
        &self.spec.color
    }

    /// Mode of transport.
    pub fn kind(&self) -> LineKind {
        self.spec.kind
    }

    /// Static description the line was built from.
    pub fn spec(&self) -> &LineSpec {
        &self.spec
    }

    /// Identifier used for render layers and caches (`red-metro`).
    pub fn base_name(&self) -> String {
        self.spec.base_name()
    }

    /// Station display names in load order.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Whether `name` is one of this line's stations, ignoring case.
    pub fn contains_station(&self, name: &str) -> bool {
        self.stations.iter().any(|station| names_match(station, name))
    }

    /// Canonical name for a known alias of `input`, if any.
    ///
    /// Only exact alias lookups are performed; there is no fuzzy matching.
    pub fn correct_station_name(&self, input: &str) -> Option<&str> {
        self.corrections
            .get(&normalize_key(input))
            .map(String::as_str)
    }

    /// Position of a station given its exact display name.
    pub fn station_coordinates(&self, name: &str) -> Option<Coordinates> {
        self.coordinates.get(name).copied()
    }
}

/// Builder for [`Line`].
#[derive(Debug)]
pub struct LineBuilder {
    line: Line,
}

impl LineBuilder {
    /// Append a station without position data.
    pub fn station(mut self, name: impl Into<String>) -> Self {
        self.line.stations.push(name.into());
        self
    }

    /// Append a station together with its position.
    pub fn station_at(mut self, name: impl Into<String>, coordinates: Coordinates) -> Self {
        let name = name.into();
        self.line.coordinates.entry(name.clone()).or_insert(coordinates);
        self.line.stations.push(name);
        self
    }

    /// Append several stations without position data.
    pub fn stations<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |builder, name| builder.station(name))
    }

    /// Register an alternate spelling for a canonical station name.
    pub fn correction(mut self, alias: &str, canonical: impl Into<String>) -> Self {
        self.line
            .corrections
            .insert(normalize_key(alias), canonical.into());
        self
    }

    /// Register several alternate spellings.
    pub fn corrections<'a, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (alias, canonical)| {
                builder.correction(alias, *canonical)
            })
    }

    /// Finish building.
    pub fn build(self) -> Line {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_line() -> Line {
        Line::builder(LineSpec::new(
            "Röda linjen",
            "red",
            City::Stockholm,
            "#d71d24",
            LineKind::Metro,
        ))
        .station_at(
            "Ropsten",
            Coordinates {
                lon: 18.102216,
                lat: 59.357301,
            },
        )
        .stations(["Universitetet", "Zinkensdamm", "T-Centralen"])
        .correction("Centralen", "T-Centralen")
        .build()
    }

    #[test]
    fn exposes_stations_in_load_order() {
        let line = red_line();
        assert_eq!(
            line.stations(),
            ["Ropsten", "Universitetet", "Zinkensdamm", "T-Centralen"]
        );
        assert_eq!(line.name(), "Röda linjen");
        assert_eq!(line.color(), "#d71d24");
        assert_eq!(line.base_name(), "red-metro");
    }

    #[test]
    fn corrects_known_alias_ignoring_case_and_padding() {
        let line = red_line();
        assert_eq!(line.correct_station_name("  CENTRALEN "), Some("T-Centralen"));
        assert_eq!(line.correct_station_name("centralen"), Some("T-Centralen"));
    }

    #[test]
    fn unknown_alias_is_not_corrected() {
        let line = red_line();
        assert_eq!(line.correct_station_name("Centr"), None);
        assert_eq!(line.correct_station_name("T-Centralen"), None);
    }

    #[test]
    fn duplicate_stations_are_tolerated() {
        let line = Line::builder(LineSpec::new(
            "Loop",
            "loop",
            City::Stockholm,
            "#000000",
            LineKind::Tram,
        ))
        .stations(["A", "B", "A"])
        .build();
        assert_eq!(line.stations().len(), 3);
        assert!(line.contains_station("a"));
    }

    #[test]
    fn coordinates_are_looked_up_by_exact_name() {
        let line = red_line();
        let position = line.station_coordinates("Ropsten").expect("ropsten has coordinates");
        assert_eq!(position.lat, 59.357301);
        assert!(line.station_coordinates("ropsten").is_none());
        assert!(line.station_coordinates("Zinkensdamm").is_none());
    }
}
