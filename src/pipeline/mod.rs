pub mod catalog;
pub mod differential;
pub mod mask;
pub mod selection;

use crate::input::Dataset;
use crate::model::{ComputationError, DeModel, LoadedModel};
use crate::report::{DeReport, build_report};

use catalog::CellTypeCatalog;
use differential::run_differential_expression;
use selection::{SelectionError, SubmitForm, Submission, resolve};

/// Everything loaded at startup. Shared read-only by all requests.
pub struct AppContext {
    pub dataset: Dataset,
    pub catalog: CellTypeCatalog,
    pub model: Box<dyn DeModel>,
}

impl AppContext {
    pub fn new(dataset: Dataset, model: Box<dyn DeModel>) -> Self {
        let catalog = CellTypeCatalog::build(&dataset.cell_types);
        if catalog.is_empty() {
            tracing::warn!("dataset has no cell-type labels; nothing can be selected");
        }
        tracing::info!(
            n_cell_types = catalog.len(),
            annotated = dataset.has_annotations(),
            "cell-type catalog built"
        );
        Self {
            dataset,
            catalog,
            model,
        }
    }

    pub fn from_loaded(loaded: LoadedModel) -> Self {
        Self::new(loaded.dataset, loaded.model)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("differential expression failed: {0}")]
    Computation(#[from] ComputationError),
    #[error("failed to render chart: {0}")]
    Render(#[from] serde_json::Error),
}

/// Submission → masks → differential expression → chart and table.
pub fn run_submission(ctx: &AppContext, form: &SubmitForm) -> Result<DeReport, PipelineError> {
    let submission = Submission::parse(form)?;
    let selection = resolve(&ctx.catalog, submission)?;
    let table = run_differential_expression(ctx.model.as_ref(), &ctx.dataset, &selection)?;
    let report = build_report(&ctx.dataset, &table, &selection)?;
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/run_submission.rs"]
mod tests;
