//! Selectable line groups and their expansion into concrete lines.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::warn;
use walkdir::WalkDir;

use crate::{
    loader::line_path,
    models::{City, LineKind, LineSpec},
};

/// Key of the metro entry, which expands differently depending on the selection.
pub const METRO_KEY: &str = "tunnelbanan";

/// One choice offered on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable identifier persisted in saves.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Advertised number of stations.
    pub stations: usize,
    /// Presentation colour.
    pub color: &'static str,
    /// Lines loaded when the entry is chosen.
    lines: &'static [LineDef],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineDef {
    name: &'static str,
    short_name: &'static str,
    color: &'static str,
    kind: LineKind,
}

impl LineDef {
    fn to_spec(self) -> LineSpec {
        LineSpec::new(self.name, self.short_name, City::Stockholm, self.color, self.kind)
    }
}

const METRO_SPLIT: &[LineDef] = &[
    LineDef {
        name: "Röda linjen",
        short_name: "red",
        color: "#d71d24",
        kind: LineKind::Metro,
    },
    LineDef {
        name: "Gröna linjen",
        short_name: "green",
        color: "#148541",
        kind: LineKind::Metro,
    },
    LineDef {
        name: "Blå linjen",
        short_name: "blue",
        color: "#007db8",
        kind: LineKind::Metro,
    },
];

const METRO_FULL: LineDef = LineDef {
    name: "Tunnelbanan",
    short_name: "full",
    color: "#000080",
    kind: LineKind::Metro,
};

macro_rules! single_line {
    ($name:expr, $short:expr, $color:expr, $kind:expr) => {
        &[LineDef {
            name: $name,
            short_name: $short,
            color: $color,
            kind: $kind,
        }]
    };
}

/// Every selectable entry in menu order.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        key: METRO_KEY,
        name: "Tunnelbanan",
        stations: 100,
        color: "#000080",
        lines: METRO_SPLIT,
    },
    CatalogEntry {
        key: "pendeltag",
        name: "Pendeltåg",
        stations: 54,
        color: "#f266a6",
        lines: single_line!("Pendeltåg", "pendeltag", "#f266a6", LineKind::CommuterRail),
    },
    CatalogEntry {
        key: "roslagsbanan",
        name: "Roslagsbanan",
        stations: 39,
        color: "#a25ea6",
        lines: single_line!("Roslagsbanan", "roslagsbanan", "#a25ea6", LineKind::LightRail),
    },
    CatalogEntry {
        key: "tvarbanan",
        name: "Tvärbanan",
        stations: 28,
        color: "#e3861e",
        lines: single_line!("Tvärbanan", "tvarbanan", "#e3861e", LineKind::Tram),
    },
    CatalogEntry {
        key: "saltsjobanan",
        name: "Saltsjöbanan",
        stations: 17,
        color: "#009aa4",
        lines: single_line!("Saltsjöbanan", "saltsjobanan", "#009aa4", LineKind::LightRail),
    },
    CatalogEntry {
        key: "lidingobanan",
        name: "Lidingöbanan",
        stations: 13,
        color: "#b65f1f",
        lines: single_line!("Lidingöbanan", "lidingobanan", "#b65f1f", LineKind::Tram),
    },
    CatalogEntry {
        key: "sparvagcity",
        name: "Spårväg City",
        stations: 11,
        color: "#747770",
        lines: single_line!("Spårväg City", "sparvagcity", "#747770", LineKind::Tram),
    },
    CatalogEntry {
        key: "nockebybanan",
        name: "Nockebybanan",
        stations: 10,
        color: "#627892",
        lines: single_line!("Nockebybanan", "nockebybanan", "#627892", LineKind::Tram),
    },
];

impl CatalogEntry {
    /// Lines for this entry when chosen on its own.
    pub fn specs(&self) -> Vec<LineSpec> {
        self.lines.iter().map(|def| def.to_spec()).collect()
    }
}

/// Look up an entry by key.
pub fn entry(key: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.key == key)
}

/// Expand selected catalog keys into the lines to load.
///
/// The metro is split into its three lines when played alone and treated as
/// a single line when combined with anything else. Unknown keys are skipped.
pub fn resolve<S: AsRef<str>>(selection: &[S]) -> Vec<LineSpec> {
    let mut seen = HashSet::new();
    let entries: Vec<&CatalogEntry> = selection
        .iter()
        .map(|key| key.as_ref())
        .filter(|key| seen.insert(*key))
        .filter_map(|key| {
            let found = entry(key);
            if found.is_none() {
                warn!(key, "Ignoring unknown line selection");
            }
            found
        })
        .collect();

    let combined = entries.len() > 1;
    entries
        .into_iter()
        .flat_map(|entry| {
            if combined && entry.key == METRO_KEY {
                vec![METRO_FULL.to_spec()]
            } else {
                entry.specs()
            }
        })
        .collect()
}

/// Catalog entries whose data files are all present under `data_root`.
pub fn available(data_root: impl AsRef<Path>) -> Vec<&'static CatalogEntry> {
    let root = data_root.as_ref();
    let files: HashSet<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry.path().extension().and_then(|ext| ext.to_str()) == Some("geojson")
        })
        .map(|entry| entry.into_path())
        .collect();

    CATALOG
        .iter()
        .filter(|entry| {
            entry
                .specs()
                .iter()
                .all(|spec| files.contains(&line_path(root, spec)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(specs: &[LineSpec]) -> Vec<&str> {
        specs.iter().map(|spec| spec.name.as_str()).collect()
    }

    #[test]
    fn metro_alone_is_split_into_three_lines() {
        let specs = resolve(&["tunnelbanan"]);
        assert_eq!(names(&specs), vec!["Röda linjen", "Gröna linjen", "Blå linjen"]);
    }

    #[test]
    fn metro_with_other_lines_is_one_line() {
        let specs = resolve(&["pendeltag", "tunnelbanan"]);
        assert_eq!(names(&specs), vec!["Pendeltåg", "Tunnelbanan"]);
        assert_eq!(specs[1].short_name, "full");
    }

    #[test]
    fn unknown_and_repeated_keys_are_ignored() {
        let specs = resolve(&["tvarbanan", "monorail", "tvarbanan"]);
        assert_eq!(names(&specs), vec!["Tvärbanan"]);
        assert!(resolve::<&str>(&[]).is_empty());
    }

    #[test]
    fn unknown_key_does_not_turn_metro_into_combined_line() {
        let specs = resolve(&["tunnelbanan", "monorail"]);
        assert_eq!(specs.len(), 3);
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|entry| entry.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn available_requires_every_data_file() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        for spec in entry("tvarbanan").expect("tvarbanan exists").specs() {
            let path = line_path(root, &spec);
            fs::create_dir_all(path.parent().expect("line path has a parent"))?;
            fs::write(path, "{}")?;
        }
        let metro = entry(METRO_KEY).expect("metro exists").specs();
        let path = line_path(root, &metro[0]);
        fs::create_dir_all(path.parent().expect("line path has a parent"))?;
        fs::write(path, "{}")?;

        let keys: Vec<&str> = available(root).iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec!["tvarbanan"]);
        Ok(())
    }
}
