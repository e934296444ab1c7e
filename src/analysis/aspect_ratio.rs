use crate::error::{HarvestError, Result};
use crate::manifest::{read_manifest, ManifestEntry};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

pub const INVALID_RANGE: &str = "invalid";
pub const UNKNOWN_RANGE: &str = "unknown";

/// Width over height. `None` when the image cannot be read, `+inf` for zero height.
pub fn compute_aspect_ratio<P: AsRef<Path>>(path: P) -> Option<f64> {
    let (width, height) = image::image_dimensions(path.as_ref()).ok()?;
    if height == 0 {
        return Some(f64::INFINITY);
    }
    Some(width as f64 / height as f64)
}

/// Ordered bucket edges for aspect ratios. The last edge may be `+inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectBins {
    edges: Vec<f64>,
}

impl Default for AspectBins {
    fn default() -> Self {
        Self {
            edges: vec![0.0, 0.5, 1.0, 1.5, 2.0, 3.0, 5.0, f64::INFINITY],
        }
    }
}

impl AspectBins {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(HarvestError::invalid_argument("at least two bin edges are required"));
        }
        if edges.iter().any(|e| e.is_nan()) {
            return Err(HarvestError::invalid_argument("bin edges must not be NaN"));
        }
        if edges[..edges.len() - 1].iter().any(|e| e.is_infinite()) {
            return Err(HarvestError::invalid_argument("only the last bin edge may be infinite"));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HarvestError::invalid_argument("bin edges must be strictly increasing"));
        }
        Ok(Self { edges })
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"low-high"`, or `"low+"` for the unbounded bucket. Edges keep at least one decimal.
    /// `None` when `index` is not a bucket.
    pub fn label(&self, index: usize) -> Option<String> {
        let low = *self.edges.get(index)?;
        let high = *self.edges.get(index + 1)?;
        if high.is_infinite() {
            Some(format!("{:?}+", low))
        } else {
            Some(format!("{:?}-{:?}", low, high))
        }
    }

    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.label(i)).collect()
    }

    /// Bucket index holding `ratio`, if any. Buckets are half-open `[low, high)`.
    pub fn bucket_of(&self, ratio: f64) -> Option<usize> {
        self.edges
            .windows(2)
            .position(|w| w[0] <= ratio && ratio < w[1])
    }

    pub fn assign(&self, ratio: Option<f64>) -> String {
        match ratio {
            None => INVALID_RANGE.to_string(),
            Some(r) => match self.bucket_of(r) {
                Some(index) => self.label(index).unwrap_or_else(|| UNKNOWN_RANGE.to_string()),
                None => UNKNOWN_RANGE.to_string(),
            },
        }
    }

    /// Ordering key: `invalid` first, buckets in edge order, anything else last.
    pub fn sort_key(&self, label: &str) -> i64 {
        if label == INVALID_RANGE {
            return -1;
        }
        (0..self.len())
            .find(|&i| self.label(i).as_deref() == Some(label))
            .map(|i| i as i64)
            .unwrap_or(i64::MAX)
    }
}

/// One manifest row annotated with its aspect ratio and bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRecord {
    pub absolute_path: String,
    pub relative_path: String,
    pub aspect_ratio: Option<f64>,
    pub aspect_ratio_range: String,
}

pub struct AspectRatioProcessor {
    bins: AspectBins,
}

impl Default for AspectRatioProcessor {
    fn default() -> Self {
        Self::new(AspectBins::default())
    }
}

impl AspectRatioProcessor {
    pub fn new(bins: AspectBins) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &AspectBins {
        &self.bins
    }

    /// Annotate every row of the manifest at `csv_path`.
    pub fn process_manifest<P: AsRef<Path>>(&self, csv_path: P) -> Result<Vec<AspectRecord>> {
        let manifest = read_manifest(csv_path)?;
        Ok(self.process_entries(&manifest.entries))
    }

    /// Images are measured in parallel; output keeps input order.
    pub fn process_entries(&self, entries: &[ManifestEntry]) -> Vec<AspectRecord> {
        let records: Vec<AspectRecord> = entries
            .par_iter()
            .map(|entry| {
                let aspect_ratio = compute_aspect_ratio(&entry.absolute_path);
                AspectRecord {
                    absolute_path: entry.absolute_path.clone(),
                    relative_path: entry.relative_path.clone(),
                    aspect_ratio,
                    aspect_ratio_range: self.bins.assign(aspect_ratio),
                }
            })
            .collect();

        let invalid = records.iter().filter(|r| r.aspect_ratio.is_none()).count();
        tracing::info!(images = records.len(), invalid, "Aspect ratios computed");
        records
    }

    /// Stable sort by bucket order.
    pub fn sort_by_range(&self, records: &[AspectRecord]) -> Vec<AspectRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| self.bins.sort_key(&r.aspect_ratio_range));
        sorted
    }
}

pub fn filter_by_range(records: &[AspectRecord], range: &str) -> Vec<AspectRecord> {
    records
        .iter()
        .filter(|r| r.aspect_ratio_range == range)
        .cloned()
        .collect()
}

pub fn write_records<P: AsRef<Path>>(records: &[AspectRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let unavailable = |e: csv::Error| HarvestError::unavailable("write CSV", path, io::Error::from(e));

    let mut writer = csv::Writer::from_path(path).map_err(unavailable)?;
    if records.is_empty() {
        // serialize() emits the header with the first row only
        writer
            .write_record(["absolute_path", "relative_path", "aspect_ratio", "aspect_ratio_range"])
            .map_err(unavailable)?;
    }
    for record in records {
        writer.serialize(record).map_err(unavailable)?;
    }
    writer
        .flush()
        .map_err(|e| HarvestError::unavailable("write CSV", path, e))?;
    Ok(())
}

pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<AspectRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| HarvestError::unavailable("read CSV", path, io::Error::from(e)))?;
    let records = reader
        .deserialize::<AspectRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}
