//! Loading line station data from GeoJSON files on disk.

mod geojson;

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::{corrections, line::Line, models::LineSpec};

use self::geojson::FeatureCollection;

/// Failure to turn a [`LineSpec`] into a [`Line`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// No data file exists for the line.
    #[error("no station data for {line} at {}", .path.display())]
    Missing {
        /// Display name of the line.
        line: String,
        /// Expected location of the GeoJSON file.
        path: PathBuf,
    },
    /// The file exists but could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a GeoJSON feature collection.
    #[error("failed to parse {}", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Location of a line's GeoJSON file beneath `data_root`.
///
/// Files live at `<data_root>/<city>/<kind>/<short_name>.geojson`.
pub fn line_path(data_root: impl AsRef<Path>, spec: &LineSpec) -> PathBuf {
    data_root
        .as_ref()
        .join(spec.city.dir_name())
        .join(spec.kind.as_str())
        .join(format!("{}.geojson", spec.short_name))
}

/// Thread-safe loader that caches parsed lines by their base name.
#[derive(Clone)]
pub struct LineLoader {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    data_root: PathBuf,
    cache: HashMap<String, Line>,
}

impl LineLoader {
    /// Build a loader reading from the given data directory.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                data_root: data_root.into(),
                cache: HashMap::new(),
            })),
        }
    }

    /// Directory the loader reads from.
    pub fn data_root(&self) -> PathBuf {
        self.inner.read().data_root.clone()
    }

    /// Point the loader at a data directory again, dropping cached lines.
    pub fn refresh(&self, data_root: impl Into<PathBuf>) {
        let mut inner = self.inner.write();
        inner.data_root = data_root.into();
        inner.cache.clear();
    }

    /// Load one line, serving it from the cache when possible.
    pub async fn load(&self, spec: &LineSpec) -> Result<Line, LoadError> {
        let key = spec.base_name();
        let cached = self.inner.read().cache.get(&key).cloned();
        if let Some(line) = cached {
            return Ok(line);
        }

        let path = line_path(self.data_root(), spec);
        let line = read_line(spec, &path).await?;
        self.inner.write().cache.insert(key, line.clone());
        Ok(line)
    }

    /// Load every spec in order, returning lines in the same order.
    pub async fn load_all(&self, specs: &[LineSpec]) -> Result<Vec<Line>, LoadError> {
        let mut lines = Vec::with_capacity(specs.len());
        for spec in specs {
            lines.push(self.load(spec).await?);
        }
        Ok(lines)
    }
}

async fn read_line(spec: &LineSpec, path: &Path) -> Result<Line, LoadError> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::Missing {
                line: spec.name.clone(),
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let collection: FeatureCollection =
        serde_json::from_slice(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let stations = collection.stations();
    if stations.is_empty() {
        warn!(line = %spec.name, path = %path.display(), "Line has no stations");
    }

    let builder = stations.into_iter().fold(
        Line::builder(spec.clone()).corrections(corrections::for_city(spec.city)),
        |builder, station| match station.coordinates {
            Some(coordinates) => builder.station_at(station.name, coordinates),
            None => builder.station(station.name),
        },
    );
    let line = builder.build();
    info!(line = %line.name(), stations = line.stations().len(), "Line loaded");
    Ok(line)
}
