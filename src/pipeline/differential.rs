use std::time::Instant;

use crate::input::Dataset;
use crate::model::{ComputationError, DeModel, DeTable};
use crate::pipeline::selection::Selection;

/// Single synchronous attempt; failures are returned as-is.
pub fn run_differential_expression(
    model: &dyn DeModel,
    dataset: &Dataset,
    selection: &Selection,
) -> Result<DeTable, ComputationError> {
    let n1 = selection.group1.mask.count_selected();
    let n2 = selection.group2.mask.count_selected();
    tracing::info!(
        model = model.name(),
        group1 = %selection.group1.title(),
        group2 = %selection.group2.title(),
        n_cells1 = n1,
        n_cells2 = n2,
        "running differential expression"
    );
    if selection.group1.mask == selection.group2.mask {
        tracing::warn!("both groups select the same cells; the comparison is degenerate");
    }

    let started = Instant::now();
    let result = model.differential_expression(
        dataset,
        &selection.group1.mask,
        &selection.group2.mask,
    );
    let elapsed_ms = started.elapsed().as_millis();

    match &result {
        Ok(table) => {
            let n_de = table
                .records
                .iter()
                .filter(|r| r.proba_de >= 0.95)
                .count();
            tracing::info!(
                elapsed_ms,
                n_features = table.records.len(),
                n_de,
                "differential expression finished"
            );
        }
        Err(err) => tracing::error!(elapsed_ms, error = %err, "differential expression failed"),
    }
    result
}
