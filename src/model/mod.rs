pub mod change;
pub mod config;

use std::path::{Path, PathBuf};

use crate::input::{Dataset, DatasetError, load_dataset};
use crate::pipeline::mask::CellMask;

pub use change::ChangeModel;
pub use config::ModelConfig;

/// One feature's differential expression statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DeRecord {
    /// Index into `Dataset::features`.
    pub feature: usize,
    pub lfc_mean: f64,
    pub lfc_std: f64,
    pub proba_not_de: f64,
    pub proba_de: f64,
}

#[derive(Debug, Clone)]
pub struct DeTable {
    pub records: Vec<DeRecord>,
    pub n_cells1: usize,
    pub n_cells2: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ComputationError {
    #[error("mask length {got} does not match dataset cell count {expected}")]
    MaskLength { expected: usize, got: usize },
    #[error("group {group} selects no cells")]
    EmptyGroup { group: u8 },
    #[error("non-finite statistic for feature {feature}")]
    NonFinite { feature: String },
}

/// A model able to compare two cell groups of the dataset it was trained on.
pub trait DeModel: Send + Sync {
    fn name(&self) -> &str;

    fn differential_expression(
        &self,
        dataset: &Dataset,
        group1: &CellMask,
        group2: &CellMask,
    ) -> Result<DeTable, ComputationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model directory {} does not exist", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

pub struct LoadedModel {
    pub config: ModelConfig,
    pub dataset: Dataset,
    pub model: Box<dyn DeModel>,
}

pub const CONFIG_FILE: &str = "model.json";

/// Loads the model directory once at startup: parameters, then the dataset
/// the model was fitted on.
pub fn load_model(dir: &Path) -> Result<LoadedModel, ModelLoadError> {
    if !dir.is_dir() {
        return Err(ModelLoadError::NotADirectory(dir.to_path_buf()));
    }
    let config = ModelConfig::load_or_default(&dir.join(CONFIG_FILE))?;
    let model = ChangeModel::new(config.change_params())?;
    let dataset = load_dataset(dir, &config.cell_type_key)?;
    tracing::info!(
        model = model.name(),
        delta = config.delta,
        scale = config.scale,
        pseudocount = config.pseudocount,
        "model loaded"
    );
    Ok(LoadedModel {
        config,
        dataset,
        model: Box::new(model),
    })
}
