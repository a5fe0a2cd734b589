use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod annotations;
pub mod barcodes;
pub mod features;
pub mod meta;
pub mod mtx;
pub mod reader;

use annotations::{GeneAnnotations, load_annotations};
use barcodes::parse_barcodes;
use features::{Feature, parse_features};
use meta::load_cell_labels;
use mtx::{CountMatrix, read_mtx};
use reader::find_first;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Expression matrix plus the per-cell and per-feature annotations the server
/// needs. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub barcodes: Vec<String>,
    pub features: Vec<Feature>,
    pub counts: CountMatrix,
    pub cell_types: Vec<String>,
    pub annotations: Option<GeneAnnotations>,
}

impl Dataset {
    pub fn n_cells(&self) -> usize {
        self.barcodes.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Whether per-gene names and descriptions are available.
    pub fn has_annotations(&self) -> bool {
        self.annotations.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub mtx: PathBuf,
    pub features: PathBuf,
    pub barcodes: PathBuf,
    pub obs: PathBuf,
    pub var: Option<PathBuf>,
}

pub fn discover_paths(dir: &Path) -> Result<DatasetPaths, DatasetError> {
    let mtx = find_first(dir, &["matrix.mtx"]).ok_or_else(|| {
        DatasetError::MissingInput("missing matrix.mtx or matrix.mtx.gz".to_string())
    })?;
    let features = find_first(dir, &["features.tsv", "genes.tsv"]).ok_or_else(|| {
        DatasetError::MissingInput("missing features.tsv(.gz) or genes.tsv(.gz)".to_string())
    })?;
    let barcodes = find_first(dir, &["barcodes.tsv"]).ok_or_else(|| {
        DatasetError::MissingInput("missing barcodes.tsv or barcodes.tsv.gz".to_string())
    })?;
    let obs = find_first(dir, &["obs.tsv"])
        .ok_or_else(|| DatasetError::MissingInput("missing obs.tsv or obs.tsv.gz".to_string()))?;
    let var = find_first(dir, &["var.tsv"]);
    Ok(DatasetPaths {
        mtx,
        features,
        barcodes,
        obs,
        var,
    })
}

pub fn load_dataset(dir: &Path, cell_type_key: &str) -> Result<Dataset, DatasetError> {
    let paths = discover_paths(dir)?;
    tracing::info!(
        mtx = %paths.mtx.display(),
        features = %paths.features.display(),
        barcodes = %paths.barcodes.display(),
        obs = %paths.obs.display(),
        "discovered dataset files"
    );

    let features = parse_features(&paths.features)?;
    let barcodes = parse_barcodes(&paths.barcodes)?;
    let counts = read_mtx(&paths.mtx, features.len(), barcodes.len())?;
    let cell_types = load_cell_labels(&paths.obs, &barcodes, cell_type_key)?;

    let annotations = match &paths.var {
        Some(path) => load_annotations(path, &features)?,
        None => None,
    };
    if annotations.is_none() {
        tracing::warn!(
            "dataset has no {} / {} annotations; gene names and descriptions will use placeholders",
            annotations::NAME_COLUMN,
            annotations::DESCRIPTION_COLUMN
        );
    }

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for feature in &features {
        *by_type
            .entry(feature.feature_type.as_deref().unwrap_or("unspecified"))
            .or_insert(0) += 1;
    }
    tracing::info!(?by_type, "feature types");
    tracing::info!(
        n_cells = barcodes.len(),
        n_features = features.len(),
        annotated = annotations.is_some(),
        "dataset loaded"
    );

    Ok(Dataset {
        barcodes,
        features,
        counts,
        cell_types,
        annotations,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
