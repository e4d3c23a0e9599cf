//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mode of transport, used as the directory name for a line's GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    /// Underground metro.
    Metro,
    /// Commuter trains (pendeltåg).
    CommuterRail,
    /// Light rail (Roslagsbanan, Saltsjöbanan).
    LightRail,
    /// Trams and tram-like light rail.
    Tram,
}

impl LineKind {
    /// Directory/identifier form (`commuter-rail`, `light-rail`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metro => "metro",
            Self::CommuterRail => "commuter-rail",
            Self::LightRail => "light-rail",
            Self::Tram => "tram",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// City a line belongs to. Selects the alias table and data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum City {
    /// Stockholm, Sweden.
    #[default]
    Stockholm,
}

impl City {
    /// Display name of the city.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stockholm => "Stockholm",
        }
    }

    /// Lower-cased form used in data paths.
    pub fn dir_name(&self) -> String {
        self.name().to_lowercase()
    }
}

/// Longitude/latitude pair as stored in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

/// Static description of a line before its station data is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    /// Display name (e.g. `Röda linjen`).
    pub name: String,
    /// File stem of the GeoJSON data (e.g. `red`).
    pub short_name: String,
    /// City the line runs in.
    pub city: City,
    /// Presentation colour as `#rrggbb`.
    pub color: String,
    /// Mode of transport.
    pub kind: LineKind,
}

impl LineSpec {
    /// Construct a spec for a line.
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        city: City,
        color: impl Into<String>,
        kind: LineKind,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            city,
            color: color.into(),
            kind,
        }
    }

    /// Stable identifier combining short name and kind (`red-metro`).
    pub fn base_name(&self) -> String {
        format!("{}-{}", self.short_name, self.kind)
    }
}
