use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ModelLoadError;
use crate::model::change::ChangeParams;

/// Parameters stored next to the dataset in `model.json`. Every field is
/// optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Half-width of the no-change interval on the log2 fold-change scale.
    pub delta: f64,
    /// Library-size normalization target.
    pub scale: f64,
    pub pseudocount: f64,
    /// obs column holding the cell-type labels.
    pub cell_type_key: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            delta: 0.25,
            scale: 10_000.0,
            pseudocount: 1.0,
            cell_type_key: "cell_type".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn load_or_default(path: &Path) -> Result<Self, ModelLoadError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no model config; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ModelLoadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|source| ModelLoadError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if !(self.delta.is_finite() && self.delta >= 0.0) {
            return Err(ModelLoadError::InvalidParameter(format!(
                "delta must be finite and >= 0, got {}",
                self.delta
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ModelLoadError::InvalidParameter(format!(
                "scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        if !(self.pseudocount.is_finite() && self.pseudocount > 0.0) {
            return Err(ModelLoadError::InvalidParameter(format!(
                "pseudocount must be finite and > 0, got {}",
                self.pseudocount
            )));
        }
        if self.cell_type_key.trim().is_empty() {
            return Err(ModelLoadError::InvalidParameter(
                "cell_type_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn change_params(&self) -> ChangeParams {
        ChangeParams {
            delta: self.delta,
            scale: self.scale,
            pseudocount: self.pseudocount,
        }
    }
}
