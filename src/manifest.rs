//! Dataset manifests: CSV listings of collected images by absolute and
//! working-directory-relative path.

use crate::data::{absolutize, list_regular_files, relative_to};
use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

pub const ABSOLUTE_PATH_COLUMN: &str = "absolute_path";
pub const RELATIVE_PATH_COLUMN: &str = "relative_path";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub absolute_path: String,
    #[serde(default)]
    pub relative_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn absolute_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.entries.iter().map(|e| PathBuf::from(&e.absolute_path))
    }

    /// Write the header and one row per entry, replacing any existing file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let unavailable = |e: csv::Error| HarvestError::unavailable("write manifest", path, io::Error::from(e));

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(unavailable)?;

        writer
            .write_record([ABSOLUTE_PATH_COLUMN, RELATIVE_PATH_COLUMN])
            .map_err(unavailable)?;
        for entry in &self.entries {
            writer
                .write_record([entry.absolute_path.as_str(), entry.relative_path.as_str()])
                .map_err(unavailable)?;
        }
        writer
            .flush()
            .map_err(|e| HarvestError::unavailable("write manifest", path, e))?;

        tracing::info!(path = %path.display(), rows = self.entries.len(), "Manifest written");
        Ok(())
    }
}

/// Enumerate the regular files in `directory`, in listing order.
pub fn build_manifest<P: AsRef<Path>>(directory: P) -> Result<Manifest> {
    let directory = directory.as_ref();
    let files = list_regular_files(directory)
        .map_err(|e| HarvestError::unavailable("read directory", directory, e))?;
    let cwd = std::env::current_dir()
        .map_err(|e| HarvestError::unavailable("resolve working directory", directory, e))?;
    let cwd = absolutize(&cwd).map_err(|e| HarvestError::unavailable("resolve", &cwd, e))?;

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let absolute = absolutize(&file).map_err(|e| HarvestError::unavailable("resolve", &file, e))?;
        let relative = relative_to(&absolute, &cwd);
        entries.push(ManifestEntry {
            absolute_path: absolute.to_string_lossy().into_owned(),
            relative_path: relative.to_string_lossy().into_owned(),
        });
    }

    tracing::debug!(directory = %directory.display(), entries = entries.len(), "Manifest built");
    Ok(Manifest { entries })
}

/// Read a manifest CSV. Only the `absolute_path` column is required.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let unavailable = |e: csv::Error| HarvestError::unavailable("read manifest", path, io::Error::from(e));

    let mut reader = csv::Reader::from_path(path).map_err(unavailable)?;
    let has_column = reader
        .headers()
        .map_err(unavailable)?
        .iter()
        .any(|h| h == ABSOLUTE_PATH_COLUMN);
    if !has_column {
        return Err(HarvestError::invalid_argument(format!(
            "CSV '{}' must contain a '{}' column",
            path.display(),
            ABSOLUTE_PATH_COLUMN
        )));
    }

    let entries = reader
        .deserialize::<ManifestEntry>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Manifest { entries })
}

/// Image paths drawn from a manifest CSV or straight from a directory.
#[derive(Debug, Clone)]
pub struct ImagePaths {
    paths: Vec<PathBuf>,
    index: usize,
}

impl ImagePaths {
    /// `source` must be a `.csv` manifest or an existing directory.
    pub fn from_source<P: AsRef<Path>>(source: P) -> Result<Self> {
        let source = source.as_ref();
        let is_csv = source.extension().map_or(false, |ext| ext == "csv");

        let paths: Vec<PathBuf> = if source.is_file() && is_csv {
            read_manifest(source)?.absolute_paths().collect()
        } else if source.is_dir() {
            list_regular_files(source)
                .and_then(|files| files.iter().map(|f| absolutize(f)).collect::<io::Result<Vec<_>>>())
                .map_err(|e| HarvestError::unavailable("read directory", source, e))?
        } else {
            return Err(HarvestError::invalid_argument(format!(
                "'{}' must be a .csv manifest or an existing directory",
                source.display()
            )));
        };

        Ok(Self { paths, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Iterator for ImagePaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let path = self.paths.get(self.index)?.clone();
        self.index += 1;
        Some(path)
    }
}
